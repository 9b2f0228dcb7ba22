//! Board colors and the visuals applied at startup.

use client_core::SyncStatus;
use eframe::egui;

#[derive(Debug, Clone, Copy)]
pub struct BoardPalette {
    pub board_bg: egui::Color32,
    pub list_bg: egui::Color32,
    pub card_bg: egui::Color32,
    pub drop_target: egui::Color32,
    pub text_muted: egui::Color32,
    pub pending: egui::Color32,
    pub failed: egui::Color32,
    pub banner_error: egui::Color32,
}

impl Default for BoardPalette {
    fn default() -> Self {
        Self {
            board_bg: egui::Color32::from_rgb(0, 82, 148),
            list_bg: egui::Color32::from_rgb(235, 236, 240),
            card_bg: egui::Color32::WHITE,
            drop_target: egui::Color32::from_rgb(0, 121, 191),
            text_muted: egui::Color32::from_rgb(94, 108, 132),
            pending: egui::Color32::from_rgb(255, 171, 0),
            failed: egui::Color32::from_rgb(222, 53, 11),
            banner_error: egui::Color32::from_rgb(111, 53, 53),
        }
    }
}

impl BoardPalette {
    /// Card outline reflecting whether the store has acknowledged it.
    pub fn sync_stroke(&self, sync: &SyncStatus) -> egui::Stroke {
        match sync {
            SyncStatus::Confirmed => egui::Stroke::NONE,
            SyncStatus::Pending => egui::Stroke::new(1.0, self.pending),
            SyncStatus::Failed { .. } => egui::Stroke::new(1.5, self.failed),
        }
    }
}

pub fn apply(ctx: &egui::Context, palette: &BoardPalette) {
    let mut visuals = egui::Visuals::light();
    visuals.panel_fill = palette.board_bg;
    visuals.widgets.noninteractive.corner_radius = egui::CornerRadius::same(6);
    visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(6);
    visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(6);
    visuals.widgets.active.corner_radius = egui::CornerRadius::same(6);
    ctx.set_visuals(visuals);
}
