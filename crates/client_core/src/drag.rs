//! Pointer-driven card reordering.
//!
//! The engine is a small state machine (`Idle -> Pressed -> Dragging -> Idle`)
//! that edits a [`BoardProjection`] live while a card is dragged across lists
//! and produces a single [`CardMove`] when the gesture ends. It knows nothing
//! about the GUI toolkit: callers hit-test the pointer themselves and hand in
//! a typed [`DropTarget`].

use shared::domain::{CardId, ListId};
use tracing::debug;

use crate::{
    config::DEFAULT_DRAG_THRESHOLD,
    projection::{BoardProjection, CardMove, ProjectionSnapshot},
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPos {
    pub x: f32,
    pub y: f32,
}

impl PointerPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Self) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// What the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropTarget {
    /// The body of a list, outside any card.
    List(ListId),
    /// A card, with its vertical extent in the same space as the pointer.
    Card { card_id: CardId, top: f32, height: f32 },
}

impl DropTarget {
    fn container(&self, board: &BoardProjection) -> Option<ListId> {
        match *self {
            Self::List(list_id) => board.list_index(list_id).map(|_| list_id),
            Self::Card { card_id, .. } => board.locate_card(card_id).map(|(list_id, _)| list_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Nothing was pressed.
    Idle,
    /// The press never crossed the drag threshold.
    Click(CardId),
    /// No valid target; the pre-drag arrangement was restored.
    Cancelled(CardId),
    /// Released over a different list than the one holding the card. The
    /// live arrangement is kept and nothing is committed.
    Aborted(CardId),
    /// Report this placement to the store.
    Commit {
        mv: CardMove,
        /// The card ended up in a different list than it started in.
        changed_list: bool,
    },
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    card_id: CardId,
    origin_list: ListId,
    origin_index: usize,
    pointer: PointerPos,
    hovered: Option<DropTarget>,
    snapshot: ProjectionSnapshot,
}

#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    Pressed {
        card_id: CardId,
        origin: PointerPos,
    },
    Dragging(Box<ActiveDrag>),
}

#[derive(Debug, Clone)]
pub struct DragEngine {
    threshold: f32,
    state: DragState,
}

impl Default for DragEngine {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}

impl DragEngine {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
            state: DragState::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// The card being dragged, once the threshold has been crossed.
    pub fn active_card(&self) -> Option<CardId> {
        match &self.state {
            DragState::Dragging(drag) => Some(drag.card_id),
            _ => None,
        }
    }

    pub fn pointer(&self) -> Option<PointerPos> {
        match &self.state {
            DragState::Dragging(drag) => Some(drag.pointer),
            _ => None,
        }
    }

    pub fn hovered(&self) -> Option<DropTarget> {
        match &self.state {
            DragState::Dragging(drag) => drag.hovered,
            _ => None,
        }
    }

    /// Where the active card sat before the drag began.
    pub fn origin(&self) -> Option<(ListId, usize)> {
        match &self.state {
            DragState::Dragging(drag) => Some((drag.origin_list, drag.origin_index)),
            _ => None,
        }
    }

    /// Pointer went down on a card. Ignored while another gesture is running.
    pub fn press(&mut self, card_id: CardId, pos: PointerPos) {
        if self.is_idle() {
            self.state = DragState::Pressed {
                card_id,
                origin: pos,
            };
        }
    }

    /// Feeds a pointer move. Returns `true` when the projection was changed.
    pub fn pointer_moved(
        &mut self,
        board: &mut BoardProjection,
        pos: PointerPos,
        over: Option<DropTarget>,
    ) -> bool {
        if let DragState::Pressed { card_id, origin } = self.state {
            if origin.distance(pos) <= self.threshold {
                return false;
            }
            let Some((origin_list, origin_index)) = board.locate_card(card_id) else {
                debug!(card_id = card_id.0, "pressed card vanished before drag start");
                self.state = DragState::Idle;
                return false;
            };
            debug!(card_id = card_id.0, list_id = origin_list.0, "drag started");
            self.state = DragState::Dragging(Box::new(ActiveDrag {
                card_id,
                origin_list,
                origin_index,
                pointer: pos,
                hovered: None,
                snapshot: board.snapshot(),
            }));
        }

        let DragState::Dragging(drag) = &mut self.state else {
            return false;
        };
        drag.pointer = pos;
        drag.hovered = over;

        let Some(target) = over else {
            return false;
        };
        let Some((active_list, _)) = board.locate_card(drag.card_id) else {
            return false;
        };
        let Some(over_list) = target.container(board) else {
            return false;
        };
        if active_list == over_list {
            return false;
        }

        let index = tentative_index(board, over_list, target, pos);
        match board.relocate_card(drag.card_id, over_list, index) {
            Ok(placed) => {
                debug!(
                    card_id = drag.card_id.0,
                    from = active_list.0,
                    to = over_list.0,
                    index = placed,
                    "card moved across lists"
                );
                true
            }
            Err(err) => {
                debug!(card_id = drag.card_id.0, "live move skipped: {err}");
                false
            }
        }
    }

    /// Pointer released over `over`. Always leaves the engine idle.
    pub fn release(
        &mut self,
        board: &mut BoardProjection,
        over: Option<DropTarget>,
    ) -> DropOutcome {
        let drag = match std::mem::take(&mut self.state) {
            DragState::Idle => return DropOutcome::Idle,
            DragState::Pressed { card_id, .. } => return DropOutcome::Click(card_id),
            DragState::Dragging(drag) => drag,
        };
        let card_id = drag.card_id;

        let resolved = over.and_then(|target| {
            let (active_list, active_index) = board.locate_card(card_id)?;
            let over_list = target.container(board)?;
            Some((target, active_list, active_index, over_list))
        });
        let Some((target, active_list, active_index, over_list)) = resolved else {
            debug!(card_id = card_id.0, "drop without target; restoring");
            board.restore(drag.snapshot);
            return DropOutcome::Cancelled(card_id);
        };

        if active_list != over_list {
            debug!(card_id = card_id.0, "drop over another list; nothing committed");
            return DropOutcome::Aborted(card_id);
        }

        let final_index = match target {
            DropTarget::Card { card_id: over_card, .. } => board
                .locate_card(over_card)
                .map(|(_, index)| index)
                .unwrap_or(active_index),
            DropTarget::List(list_id) => board
                .list_index(list_id)
                .map(|index| board.lists()[index].cards.len().saturating_sub(1))
                .unwrap_or(active_index),
        };

        let position = if final_index != active_index {
            match board.relocate_card(card_id, active_list, final_index) {
                Ok(placed) => placed,
                Err(err) => {
                    debug!(card_id = card_id.0, "reorder failed; restoring: {err}");
                    board.restore(drag.snapshot);
                    return DropOutcome::Cancelled(card_id);
                }
            }
        } else {
            active_index
        };

        DropOutcome::Commit {
            mv: CardMove {
                card_id,
                list_id: active_list,
                position,
            },
            changed_list: active_list != drag.origin_list,
        }
    }

    /// Abandons the gesture (Escape, focus loss) and restores the pre-drag
    /// arrangement.
    pub fn cancel(&mut self, board: &mut BoardProjection) -> Option<CardId> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Pressed { card_id, .. } => Some(card_id),
            DragState::Dragging(drag) => {
                board.restore(drag.snapshot);
                Some(drag.card_id)
            }
        }
    }
}

/// Insert index for a card entering `list_id` while hovering `target`.
fn tentative_index(
    board: &BoardProjection,
    list_id: ListId,
    target: DropTarget,
    pos: PointerPos,
) -> usize {
    let len = board
        .list_index(list_id)
        .map(|index| board.lists()[index].cards.len())
        .unwrap_or(0);
    match target {
        DropTarget::List(_) => len + 1,
        DropTarget::Card {
            card_id,
            top,
            height,
        } => match board.locate_card(card_id) {
            Some((_, index)) => {
                let below_midpoint = pos.y > top + height / 2.0;
                index + usize::from(below_midpoint)
            }
            None => len + 1,
        },
    }
}

#[cfg(test)]
#[path = "tests/drag_tests.rs"]
mod tests;
