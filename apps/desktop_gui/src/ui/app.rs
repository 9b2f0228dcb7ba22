use std::time::Duration;

use client_core::ClientSettings;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::EntityKey;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{BoardIntent, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{BoardSession, Effects, ViewState};
use crate::ui::layout::{pointer_pos, BoardLayout, LIST_WIDTH};
use crate::ui::panels::{self, BoardUiState};
use crate::ui::theme::{self, BoardPalette};
use crate::ui::widgets::CardEditor;

/// Settings resolved from `board.toml`, the environment and the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    pub settings: ClientSettings,
}

pub struct TaskBoardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session: BoardSession,
    board_ui: BoardUiState,
    palette: BoardPalette,
    theme_applied: bool,
}

impl TaskBoardApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: &StartupConfig,
    ) -> Self {
        let settings = &startup.settings;
        let mut app = Self {
            cmd_tx,
            ui_rx,
            session: BoardSession::new(settings.board_id, settings.drag_threshold),
            board_ui: BoardUiState::default(),
            palette: BoardPalette::default(),
            theme_applied: false,
        };
        let load = app.session.start_load();
        app.dispatch(load);
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        if let Err(cmd) = dispatch_backend_command(&self.cmd_tx, cmd, &mut self.session.status) {
            let reason = self.session.status.clone();
            let effects = self.session.command_dropped(cmd, &reason);
            self.apply_effects(effects);
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            let effects = self.session.handle_event(event);
            self.apply_effects(effects);
        }
    }

    fn apply_effects(&mut self, effects: Effects) {
        for cmd in effects.commands {
            self.dispatch(cmd);
        }
        if let Some(card_id) = effects.open_editor {
            let card = self
                .session
                .projection
                .as_ref()
                .and_then(|projection| projection.find_card(card_id));
            if let Some(card) = card {
                self.board_ui
                    .editors
                    .insert(EntityKey::Remote(card_id), CardEditor::begin(card));
            }
        }
    }

    fn show_board(&mut self, ctx: &egui::Context, intents: &mut Vec<BoardIntent>) {
        let Some(projection) = self.session.projection.as_ref() else {
            return;
        };
        panels::show_header(
            ctx,
            projection.name(),
            &self.session.status,
            self.session.banner.as_ref(),
            &self.palette,
            intents,
        );

        self.board_ui.layout.clear();
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::show_board(
                ui,
                projection,
                &self.session.drag,
                &mut self.board_ui,
                &self.palette,
                intents,
            );
        });

        let dragged = self
            .session
            .drag
            .active_card()
            .zip(self.session.drag.pointer());
        if let Some((card_id, pointer)) = dragged {
            if let Some(card) = projection.find_card(card_id) {
                let width = self
                    .board_ui
                    .layout
                    .card_rect(card_id)
                    .map(|rect| rect.width())
                    .unwrap_or(LIST_WIDTH - 16.0);
                panels::show_drag_overlay(ctx, card, pointer, width, &self.palette);
            }
        }
    }

    /// Feeds pointer state to the drag engine once the board has been laid
    /// out for this frame.
    fn track_pointer(&self, ctx: &egui::Context, intents: &mut Vec<BoardIntent>) {
        let pressed_now = intents
            .iter()
            .any(|intent| matches!(intent, BoardIntent::PressCard { .. }));
        if self.session.drag.is_idle() && !pressed_now {
            return;
        }

        let frame = ctx.input(|i| PointerFrame {
            latest: i.pointer.latest_pos(),
            released: i.pointer.primary_released(),
            escape: i.key_pressed(egui::Key::Escape),
            has_pointer: i.pointer.has_pointer(),
            focused: i.focused,
        });
        intents.extend(pointer_intents(frame, &self.board_ui.layout));
    }
}

/// Pointer and window state sampled once per frame.
#[derive(Debug, Clone, Copy)]
struct PointerFrame {
    latest: Option<egui::Pos2>,
    released: bool,
    escape: bool,
    has_pointer: bool,
    focused: bool,
}

/// Intents for a gesture in progress. Escape, focus loss or the pointer
/// leaving the window cancel it.
fn pointer_intents(frame: PointerFrame, layout: &BoardLayout) -> Vec<BoardIntent> {
    if frame.escape || !frame.focused || (!frame.has_pointer && !frame.released) {
        return vec![BoardIntent::CancelDrag];
    }

    let over = frame.latest.and_then(|pos| layout.hit_test(pos));
    let mut intents = Vec::new();
    if let Some(pos) = frame.latest {
        intents.push(BoardIntent::PointerMoved {
            pos: pointer_pos(pos),
            over,
        });
    }
    if frame.released {
        intents.push(BoardIntent::PointerReleased { over });
    }
    intents
}

impl eframe::App for TaskBoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        if !self.theme_applied {
            theme::apply(ctx, &self.palette);
            self.theme_applied = true;
        }

        let mut intents = Vec::new();
        match self.session.view.clone() {
            ViewState::Loading => panels::show_loading(ctx),
            ViewState::LoadFailed(message) => panels::show_load_error(ctx, &message, &mut intents),
            ViewState::Ready => {
                self.show_board(ctx, &mut intents);
                self.track_pointer(ctx, &mut intents);
            }
        }

        for intent in intents {
            let effects = self.session.handle_intent(intent);
            self.apply_effects(effects);
        }
        if let Some(projection) = self.session.projection.as_ref() {
            self.board_ui.prune(projection);
        }

        if self.session.drag.is_idle() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
