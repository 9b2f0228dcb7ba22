//! Per-frame geometry of the rendered board, used to resolve drop targets.

use client_core::{DropTarget, PointerPos};
use eframe::egui::{Pos2, Rect};
use shared::domain::{CardId, ListId};

pub const LIST_WIDTH: f32 = 272.0;
pub const LIST_SPACING: f32 = 12.0;

/// Rectangles recorded while painting. Only persisted entities are
/// recorded; local placeholders cannot be dropped onto.
#[derive(Debug, Clone, Default)]
pub struct BoardLayout {
    lists: Vec<(ListId, Rect)>,
    cards: Vec<(CardId, Rect)>,
}

impl BoardLayout {
    pub fn clear(&mut self) {
        self.lists.clear();
        self.cards.clear();
    }

    pub fn record_list(&mut self, list_id: ListId, rect: Rect) {
        self.lists.push((list_id, rect));
    }

    pub fn record_card(&mut self, card_id: CardId, rect: Rect) {
        self.cards.push((card_id, rect));
    }

    pub fn card_rect(&self, card_id: CardId) -> Option<Rect> {
        self.cards
            .iter()
            .find(|(id, _)| *id == card_id)
            .map(|(_, rect)| *rect)
    }

    /// Cards win over the list body they sit in.
    pub fn hit_test(&self, pos: Pos2) -> Option<DropTarget> {
        if let Some((card_id, rect)) = self.cards.iter().find(|(_, rect)| rect.contains(pos)) {
            return Some(DropTarget::Card {
                card_id: *card_id,
                top: rect.top(),
                height: rect.height(),
            });
        }
        self.lists
            .iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(list_id, _)| DropTarget::List(*list_id))
    }
}

pub fn pointer_pos(pos: Pos2) -> PointerPos {
    PointerPos::new(pos.x, pos.y)
}
