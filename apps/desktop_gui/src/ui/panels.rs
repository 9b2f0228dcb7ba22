//! Board, list and card views. Rendering never mutates the board; user
//! actions are collected as intents and applied after the frame.

use std::collections::{HashMap, HashSet};

use client_core::{
    BoardCard, BoardList, BoardProjection, DragEngine, DropTarget, PointerPos, SyncStatus,
};
use eframe::egui::{self, RichText};
use shared::domain::{CardKey, EntityKey, ListKey};

use crate::controller::events::BoardIntent;
use crate::controller::reducer::{StatusBanner, StatusBannerSeverity};
use crate::ui::layout::{pointer_pos, BoardLayout, LIST_SPACING, LIST_WIDTH};
use crate::ui::theme::BoardPalette;
use crate::ui::widgets::{CardEditor, EditorAction, InlineTextForm};

const CARD_TEXT: egui::Color32 = egui::Color32::from_rgb(23, 43, 77);

/// View-only state that survives between frames.
#[derive(Debug, Default)]
pub struct BoardUiState {
    pub add_list: InlineTextForm,
    pub add_card: HashMap<ListKey, InlineTextForm>,
    pub rename: HashMap<ListKey, InlineTextForm>,
    pub editors: HashMap<CardKey, CardEditor>,
    pub layout: BoardLayout,
}

impl BoardUiState {
    /// Drops forms and editors whose entity is gone from the board.
    pub fn prune(&mut self, projection: &BoardProjection) {
        let lists: HashSet<ListKey> = projection.lists().iter().map(|list| list.key).collect();
        let cards: HashSet<CardKey> = projection
            .lists()
            .iter()
            .flat_map(|list| list.cards.iter().map(|card| card.key))
            .collect();
        self.add_card.retain(|key, _| lists.contains(key));
        self.rename.retain(|key, _| lists.contains(key));
        self.editors.retain(|key, _| cards.contains(key));
    }
}

pub fn show_loading(ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.spinner();
            ui.add_space(8.0);
            ui.label(RichText::new("Loading your board...").color(egui::Color32::WHITE));
        });
    });
}

pub fn show_load_error(ctx: &egui::Context, message: &str, intents: &mut Vec<BoardIntent>) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.heading(RichText::new("Connection Error").color(egui::Color32::WHITE));
            ui.add_space(6.0);
            ui.label(RichText::new(message).color(egui::Color32::WHITE));
            ui.add_space(12.0);
            if ui.button("Retry").clicked() {
                intents.push(BoardIntent::Reload);
            }
        });
    });
}

pub fn show_header(
    ctx: &egui::Context,
    board_name: &str,
    status: &str,
    banner: Option<&StatusBanner>,
    palette: &BoardPalette,
    intents: &mut Vec<BoardIntent>,
) {
    egui::TopBottomPanel::top("board_header")
        .frame(
            egui::Frame::NONE
                .fill(palette.board_bg)
                .inner_margin(egui::Margin::symmetric(16, 10)),
        )
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(RichText::new(board_name).strong().color(egui::Color32::WHITE));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Reload").clicked() {
                        intents.push(BoardIntent::Reload);
                    }
                    ui.label(RichText::new(status).small().color(egui::Color32::WHITE));
                });
            });
            if let Some(banner) = banner {
                ui.add_space(6.0);
                show_status_banner(ui, banner, palette, intents);
            }
        });
}

fn show_status_banner(
    ui: &mut egui::Ui,
    banner: &StatusBanner,
    palette: &BoardPalette,
    intents: &mut Vec<BoardIntent>,
) {
    let fill = match banner.severity {
        StatusBannerSeverity::Error => palette.banner_error,
    };
    egui::Frame::NONE
        .fill(fill)
        .stroke(egui::Stroke::new(1.0, fill.gamma_multiply(1.6)))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(RichText::new(&banner.message).color(egui::Color32::WHITE));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Dismiss").clicked() {
                        intents.push(BoardIntent::DismissBanner);
                    }
                });
            });
        });
}

pub fn show_board(
    ui: &mut egui::Ui,
    projection: &BoardProjection,
    drag: &DragEngine,
    state: &mut BoardUiState,
    palette: &BoardPalette,
    intents: &mut Vec<BoardIntent>,
) {
    egui::ScrollArea::horizontal()
        .auto_shrink([false, false])
        .scroll_source(board_scroll_source())
        .show(ui, |ui| {
            ui.horizontal_top(|ui| {
                ui.spacing_mut().item_spacing.x = LIST_SPACING;
                for list in projection.lists() {
                    show_list(ui, list, drag, state, palette, intents);
                }
                show_add_list(ui, state, palette, intents);
            });
        });
}

fn show_list(
    ui: &mut egui::Ui,
    list: &BoardList,
    drag: &DragEngine,
    state: &mut BoardUiState,
    palette: &BoardPalette,
    intents: &mut Vec<BoardIntent>,
) {
    let stroke = if drag.hovered().is_some_and(|target| targets_list(list, target)) {
        egui::Stroke::new(2.0, palette.drop_target)
    } else {
        palette.sync_stroke(&list.sync)
    };
    let frame = egui::Frame::NONE
        .fill(palette.list_bg)
        .stroke(stroke)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            ui.set_width(LIST_WIDTH - 16.0);
            ui.set_min_height(80.0);
            ui.spacing_mut().item_spacing.y = 6.0;

            show_list_header(ui, list, state, palette, intents);
            for card in &list.cards {
                let dragged = card.id().is_some() && card.id() == drag.active_card();
                show_card(ui, card, dragged, state, palette, intents);
            }
            show_add_card(ui, list, state, intents);
        });

    if let Some(list_id) = list.id() {
        state
            .layout
            .record_list(list_id, frame.response.rect.intersect(ui.clip_rect()));
    }
}

/// Dragging inside the board moves cards, never the viewport.
fn board_scroll_source() -> egui::scroll_area::ScrollSource {
    egui::scroll_area::ScrollSource {
        drag: false,
        ..egui::scroll_area::ScrollSource::ALL
    }
}

/// Whether a drop over `target` lands in `list`.
fn targets_list(list: &BoardList, target: DropTarget) -> bool {
    match target {
        DropTarget::List(list_id) => list.id() == Some(list_id),
        DropTarget::Card { card_id, .. } => list.card_index(card_id).is_some(),
    }
}

fn show_list_header(
    ui: &mut egui::Ui,
    list: &BoardList,
    state: &mut BoardUiState,
    palette: &BoardPalette,
    intents: &mut Vec<BoardIntent>,
) {
    if let Some(form) = state.rename.get_mut(&list.key).filter(|form| form.is_open()) {
        if let Some(title) = form.show(ui, "List title", "Save") {
            intents.push(BoardIntent::RenameList {
                list: list.key,
                title,
            });
        }
        return;
    }

    ui.horizontal(|ui| {
        let title = ui.add(
            egui::Label::new(RichText::new(&list.title).strong().size(15.0).color(CARD_TEXT))
                .selectable(false)
                .sense(egui::Sense::click()),
        );
        if list.key.is_remote() && title.double_clicked() {
            state
                .rename
                .entry(list.key)
                .or_default()
                .open_with(list.title.clone());
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            match list.key {
                EntityKey::Remote(_) => {
                    if ui.small_button("x").on_hover_text("Delete list").clicked() {
                        intents.push(BoardIntent::DeleteList(list.key));
                    }
                }
                EntityKey::Local(local) => {
                    if list.sync.failure().is_some() && ui.small_button("Discard").clicked() {
                        intents.push(BoardIntent::DiscardLocalList(local));
                    }
                }
            }
        });
    });
    show_sync_note(ui, &list.sync, palette);
}

fn show_card(
    ui: &mut egui::Ui,
    card: &BoardCard,
    dragged: bool,
    state: &mut BoardUiState,
    palette: &BoardPalette,
    intents: &mut Vec<BoardIntent>,
) {
    if let Some(editor) = state.editors.get_mut(&card.key) {
        let action = card_frame(palette.card_bg, egui::Stroke::NONE)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                editor.show(ui)
            })
            .inner;
        match action {
            EditorAction::Save(edit) => {
                intents.push(BoardIntent::UpdateCard {
                    card: card.key,
                    edit,
                });
                state.editors.remove(&card.key);
            }
            EditorAction::Cancel => {
                state.editors.remove(&card.key);
            }
            EditorAction::None => {}
        }
        return;
    }

    let fill = if dragged {
        palette.card_bg.gamma_multiply(0.35)
    } else {
        palette.card_bg
    };
    let mut delete_rect = None;
    let frame = card_frame(fill, palette.sync_stroke(&card.sync)).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.add(egui::Label::new(RichText::new(&card.title).color(CARD_TEXT)).selectable(false));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                match card.key {
                    EntityKey::Remote(_) => {
                        let delete = ui.small_button("x").on_hover_text("Delete card");
                        delete_rect = Some(delete.rect);
                        if delete.clicked() {
                            intents.push(BoardIntent::DeleteCard(card.key));
                        }
                    }
                    EntityKey::Local(local) => {
                        if card.sync.failure().is_some() {
                            let discard = ui.small_button("Discard");
                            delete_rect = Some(discard.rect);
                            if discard.clicked() {
                                intents.push(BoardIntent::DiscardLocalCard(local));
                            }
                        }
                    }
                }
            });
        });
        if let Some(description) = card.description.as_deref().filter(|d| !d.is_empty()) {
            ui.add(
                egui::Label::new(RichText::new(description).small().color(palette.text_muted))
                    .selectable(false),
            );
        }
        show_sync_note(ui, &card.sync, palette);
    });

    let Some(card_id) = card.id() else {
        return;
    };
    let rect = frame.response.rect;
    state.layout.record_card(card_id, rect.intersect(ui.clip_rect()));
    if frame.response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
    }

    let pressed_at = ui.input(|i| {
        if i.pointer.primary_pressed() {
            i.pointer.interact_pos()
        } else {
            None
        }
    });
    if let Some(pos) = pressed_at {
        let on_button = delete_rect.is_some_and(|button: egui::Rect| button.contains(pos));
        if rect.contains(pos) && ui.clip_rect().contains(pos) && !on_button {
            intents.push(BoardIntent::PressCard {
                card_id,
                pos: pointer_pos(pos),
            });
        }
    }
}

fn card_frame(fill: egui::Color32, stroke: egui::Stroke) -> egui::Frame {
    egui::Frame::NONE
        .fill(fill)
        .stroke(stroke)
        .corner_radius(6.0)
        .inner_margin(egui::Margin::same(8))
}

fn show_sync_note(ui: &mut egui::Ui, sync: &SyncStatus, palette: &BoardPalette) {
    match sync {
        SyncStatus::Confirmed => {}
        SyncStatus::Pending => {
            ui.label(RichText::new("Saving...").small().italics().color(palette.text_muted));
        }
        SyncStatus::Failed { reason } => {
            ui.label(RichText::new(format!("Not saved: {reason}")).small().color(palette.failed))
                .on_hover_text(reason.as_str());
        }
    }
}

fn show_add_card(
    ui: &mut egui::Ui,
    list: &BoardList,
    state: &mut BoardUiState,
    intents: &mut Vec<BoardIntent>,
) {
    let form = state.add_card.entry(list.key).or_default();
    if form.is_open() {
        if let Some(title) = form.show(ui, "Enter a title for this card...", "Add Card") {
            intents.push(BoardIntent::AddCard {
                list: list.key,
                title,
            });
        }
        return;
    }

    let add = ui
        .add_enabled(list.key.is_remote(), egui::Button::new("+ Add a card").frame(false))
        .on_disabled_hover_text("This list is still being saved");
    if add.clicked() {
        form.open();
    }
}

fn show_add_list(
    ui: &mut egui::Ui,
    state: &mut BoardUiState,
    palette: &BoardPalette,
    intents: &mut Vec<BoardIntent>,
) {
    egui::Frame::NONE
        .fill(palette.list_bg.gamma_multiply(0.7))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            ui.set_width(LIST_WIDTH - 16.0);
            if state.add_list.is_open() {
                if let Some(title) = state.add_list.show(ui, "Enter list title...", "Add List") {
                    intents.push(BoardIntent::AddList(title));
                }
            } else if ui
                .add(egui::Button::new("+ Add another list").frame(false))
                .clicked()
            {
                state.add_list.open();
            }
        });
}

/// Floating copy of the dragged card that follows the pointer.
pub fn show_drag_overlay(
    ctx: &egui::Context,
    card: &BoardCard,
    pointer: PointerPos,
    width: f32,
    palette: &BoardPalette,
) {
    let pos = egui::pos2(pointer.x - 16.0, pointer.y - 12.0);
    egui::Area::new(egui::Id::new("drag_overlay"))
        .order(egui::Order::Tooltip)
        .fixed_pos(pos)
        .interactable(false)
        .show(ctx, |ui| {
            card_frame(palette.card_bg, egui::Stroke::new(1.0, palette.text_muted))
                .shadow(egui::Shadow {
                    offset: [0, 4],
                    blur: 12,
                    spread: 0,
                    color: egui::Color32::from_black_alpha(60),
                })
                .show(ui, |ui| {
                    ui.set_width(width);
                    ui.label(RichText::new(&card.title).color(CARD_TEXT));
                    if let Some(description) = card.description.as_deref().filter(|d| !d.is_empty())
                    {
                        ui.label(RichText::new(description).small().color(palette.text_muted));
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{
        domain::{BoardId, CardId, ListId},
        protocol::{BoardDto, CardDto, ListDto},
    };

    #[test]
    fn board_scrolls_by_wheel_and_bar_only() {
        let source = board_scroll_source();
        assert!(!source.drag);
        assert!(source.mouse_wheel);
        assert!(source.scroll_bar);
    }

    #[test]
    fn drop_targets_resolve_to_their_list() {
        let projection = BoardProjection::from_board(BoardDto {
            id: BoardId(1),
            name: "Main".to_string(),
            lists: vec![
                ListDto {
                    id: ListId(1),
                    title: "Todo".to_string(),
                    position: 0,
                    cards: vec![CardDto {
                        id: CardId(9),
                        title: "A".to_string(),
                        description: None,
                        position: 0,
                    }],
                },
                ListDto {
                    id: ListId(2),
                    title: "Done".to_string(),
                    position: 1,
                    cards: Vec::new(),
                },
            ],
        });
        let [todo, done] = projection.lists() else {
            panic!("expected two lists");
        };
        let over_card = DropTarget::Card {
            card_id: CardId(9),
            top: 0.0,
            height: 40.0,
        };
        assert!(targets_list(todo, over_card));
        assert!(!targets_list(done, over_card));
        assert!(targets_list(done, DropTarget::List(ListId(2))));
        assert!(!targets_list(todo, DropTarget::List(ListId(2))));
    }

    #[test]
    fn prune_forgets_deleted_entities() {
        let mut projection = BoardProjection::from_board(BoardDto {
            id: BoardId(1),
            name: "Main".to_string(),
            lists: vec![ListDto {
                id: ListId(1),
                title: "Todo".to_string(),
                position: 0,
                cards: vec![CardDto {
                    id: CardId(9),
                    title: "A".to_string(),
                    description: None,
                    position: 0,
                }],
            }],
        });
        let mut state = BoardUiState::default();
        let card = projection.find_card(CardId(9)).cloned().expect("card");
        state
            .editors
            .insert(card.key, CardEditor::begin(&card));
        state.add_card.entry(EntityKey::Remote(ListId(1))).or_default().open();

        state.prune(&projection);
        assert_eq!(state.editors.len(), 1);

        projection
            .delete_list(EntityKey::Remote(ListId(1)))
            .expect("delete");
        state.prune(&projection);
        assert!(state.editors.is_empty());
        assert!(state.add_card.is_empty());
    }
}
