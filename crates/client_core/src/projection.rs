//! In-memory mirror of one board, updated optimistically and reconciled with
//! store responses.
//!
//! Every mutation applies to the projection synchronously and hands back the
//! [`RemoteOp`] the caller must issue against the store. Outcomes are fed back
//! through [`BoardProjection::apply_outcome`] or
//! [`BoardProjection::apply_failure`], in whatever order they arrive.

use shared::{
    domain::{BoardId, CardId, CardKey, EntityKey, ListId, ListKey, LocalId},
    protocol::{
        BoardDto, CardDto, CreateCardRequest, CreateListRequest, ListDto, UpdateCardRequest,
        UpdateListRequest,
    },
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Confirmed,
    Pending,
    Failed {
        reason: String,
    },
}

impl SyncStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCard {
    pub key: CardKey,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub sync: SyncStatus,
}

impl BoardCard {
    fn from_dto(dto: CardDto) -> Self {
        Self {
            key: EntityKey::Remote(dto.id),
            title: dto.title,
            description: dto.description,
            position: dto.position,
            sync: SyncStatus::Confirmed,
        }
    }

    pub fn id(&self) -> Option<CardId> {
        self.key.remote()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardList {
    pub key: ListKey,
    pub title: String,
    pub position: i32,
    pub cards: Vec<BoardCard>,
    pub sync: SyncStatus,
}

impl BoardList {
    fn from_dto(dto: ListDto) -> Self {
        Self {
            key: EntityKey::Remote(dto.id),
            title: dto.title,
            position: dto.position,
            cards: dto.cards.into_iter().map(BoardCard::from_dto).collect(),
            sync: SyncStatus::Confirmed,
        }
    }

    pub fn id(&self) -> Option<ListId> {
        self.key.remote()
    }

    pub fn card_index(&self, card_id: CardId) -> Option<usize> {
        self.cards
            .iter()
            .position(|card| card.key == EntityKey::Remote(card_id))
    }
}

/// Editable fields of a card. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardEdit {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Final placement of a dragged card, as reported to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardMove {
    pub card_id: CardId,
    pub list_id: ListId,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    List(ListKey),
    Card(CardKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOp {
    CreateList {
        local: LocalId,
        request: CreateListRequest,
    },
    CreateCard {
        local: LocalId,
        request: CreateCardRequest,
    },
    UpdateList {
        list_id: ListId,
        request: UpdateListRequest,
    },
    UpdateCard {
        card_id: CardId,
        request: UpdateCardRequest,
    },
    MoveCard {
        card_id: CardId,
        list_id: ListId,
        position: i32,
    },
    DeleteList {
        list_id: ListId,
    },
    DeleteCard {
        card_id: CardId,
    },
}

impl RemoteOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateList { .. } => "create_list",
            Self::CreateCard { .. } => "create_card",
            Self::UpdateList { .. } => "update_list",
            Self::UpdateCard { .. } => "update_card",
            Self::MoveCard { .. } => "move_card",
            Self::DeleteList { .. } => "delete_list",
            Self::DeleteCard { .. } => "delete_card",
        }
    }

    pub fn subject(&self) -> EntityRef {
        match self {
            Self::CreateList { local, .. } => EntityRef::List(EntityKey::Local(*local)),
            Self::CreateCard { local, .. } => EntityRef::Card(EntityKey::Local(*local)),
            Self::UpdateList { list_id, .. } | Self::DeleteList { list_id } => {
                EntityRef::List(EntityKey::Remote(*list_id))
            }
            Self::UpdateCard { card_id, .. }
            | Self::MoveCard { card_id, .. }
            | Self::DeleteCard { card_id } => EntityRef::Card(EntityKey::Remote(*card_id)),
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Self::MoveCard { .. })
    }
}

/// Successful store responses, keyed so they can be matched to the entity
/// that issued them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    ListCreated { local: LocalId, list: ListDto },
    CardCreated { local: LocalId, card: CardDto },
    ListUpdated(ListDto),
    CardUpdated(CardDto),
    CardMoved(CardDto),
    ListDeleted(ListId),
    CardDeleted(CardId),
}

/// What the caller has to do after a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureRecovery {
    /// The optimistic change stays; the entity is flagged as failed.
    Flagged,
    /// The projection can no longer be trusted; reload it from the store.
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("list {0} is not on this board")]
    UnknownList(ListKey),
    #[error("card {0} is not on this board")]
    UnknownCard(CardKey),
    #[error("{0} has not been saved yet")]
    NotPersisted(String),
}

pub type ProjectionResult<T> = std::result::Result<T, ProjectionError>;

/// Saved arrangement of lists, restored when a drag is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionSnapshot {
    lists: Vec<BoardList>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardProjection {
    board_id: BoardId,
    name: String,
    lists: Vec<BoardList>,
    next_local: u64,
}

impl BoardProjection {
    pub fn from_board(board: BoardDto) -> Self {
        Self {
            board_id: board.id,
            name: board.name,
            lists: board.lists.into_iter().map(BoardList::from_dto).collect(),
            next_local: 1,
        }
    }

    /// Replaces the whole projection with a freshly loaded board.
    pub fn replace(&mut self, board: BoardDto) {
        let next_local = self.next_local;
        *self = Self::from_board(board);
        self.next_local = next_local;
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lists(&self) -> &[BoardList] {
        &self.lists
    }

    pub fn list(&self, key: ListKey) -> Option<&BoardList> {
        self.lists.iter().find(|list| list.key == key)
    }

    pub fn list_index(&self, list_id: ListId) -> Option<usize> {
        self.lists
            .iter()
            .position(|list| list.key == EntityKey::Remote(list_id))
    }

    pub fn find_card(&self, card_id: CardId) -> Option<&BoardCard> {
        let (list_index, card_index) = self.card_coordinates(card_id)?;
        Some(&self.lists[list_index].cards[card_index])
    }

    /// The list holding `card_id` and its index there.
    pub fn locate_card(&self, card_id: CardId) -> Option<(ListId, usize)> {
        let (list_index, card_index) = self.card_coordinates(card_id)?;
        let list_id = self.lists[list_index].id()?;
        Some((list_id, card_index))
    }

    fn card_coordinates(&self, card_id: CardId) -> Option<(usize, usize)> {
        self.lists.iter().enumerate().find_map(|(list_index, list)| {
            list.card_index(card_id)
                .map(|card_index| (list_index, card_index))
        })
    }

    fn allocate_local(&mut self) -> LocalId {
        let local = LocalId(self.next_local);
        self.next_local += 1;
        local
    }

    fn persisted_list_index(&self, list_id: ListId) -> ProjectionResult<usize> {
        self.list_index(list_id)
            .ok_or(ProjectionError::UnknownList(EntityKey::Remote(list_id)))
    }

    fn persisted_card_coordinates(&self, card_id: CardId) -> ProjectionResult<(usize, usize)> {
        self.card_coordinates(card_id)
            .ok_or(ProjectionError::UnknownCard(EntityKey::Remote(card_id)))
    }

    pub fn add_list(&mut self, title: &str) -> ProjectionResult<RemoteOp> {
        let title = non_empty_title(title)?;
        let local = self.allocate_local();
        let position = self.lists.len() as i32;
        self.lists.push(BoardList {
            key: EntityKey::Local(local),
            title: title.clone(),
            position,
            cards: Vec::new(),
            sync: SyncStatus::Pending,
        });
        debug!(%local, position, "list added locally");

        Ok(RemoteOp::CreateList {
            local,
            request: CreateListRequest {
                title,
                position,
                board_id: self.board_id,
            },
        })
    }

    pub fn add_card(&mut self, list: ListKey, title: &str) -> ProjectionResult<RemoteOp> {
        let title = non_empty_title(title)?;
        let list_id = require_remote(list, "list")?;
        let list_index = self.persisted_list_index(list_id)?;
        let local = self.allocate_local();
        let list = &mut self.lists[list_index];
        let position = list.cards.len() as i32;
        list.cards.push(BoardCard {
            key: EntityKey::Local(local),
            title: title.clone(),
            description: None,
            position,
            sync: SyncStatus::Pending,
        });
        debug!(%local, list_id = list_id.0, position, "card added locally");

        Ok(RemoteOp::CreateCard {
            local,
            request: CreateCardRequest {
                title,
                description: None,
                position,
                list_id,
            },
        })
    }

    pub fn update_card(&mut self, card: CardKey, edit: CardEdit) -> ProjectionResult<RemoteOp> {
        let title = edit.title.as_deref().map(non_empty_title).transpose()?;
        let card_id = require_remote(card, "card")?;
        let (list_index, card_index) = self.persisted_card_coordinates(card_id)?;
        let card = &mut self.lists[list_index].cards[card_index];
        if let Some(title) = &title {
            card.title = title.clone();
        }
        if let Some(description) = &edit.description {
            card.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        card.sync = SyncStatus::Pending;

        Ok(RemoteOp::UpdateCard {
            card_id,
            request: UpdateCardRequest {
                title,
                description: edit.description,
                ..Default::default()
            },
        })
    }

    pub fn rename_list(&mut self, list: ListKey, title: &str) -> ProjectionResult<RemoteOp> {
        let title = non_empty_title(title)?;
        let list_id = require_remote(list, "list")?;
        let list_index = self.persisted_list_index(list_id)?;
        let list = &mut self.lists[list_index];
        list.title = title.clone();
        list.sync = SyncStatus::Pending;

        Ok(RemoteOp::UpdateList {
            list_id,
            request: UpdateListRequest {
                title: Some(title),
                position: None,
            },
        })
    }

    pub fn delete_card(&mut self, card: CardKey) -> ProjectionResult<RemoteOp> {
        let card_id = require_remote(card, "card")?;
        let (list_index, card_index) = self.persisted_card_coordinates(card_id)?;
        self.lists[list_index].cards.remove(card_index);
        Ok(RemoteOp::DeleteCard { card_id })
    }

    pub fn delete_list(&mut self, list: ListKey) -> ProjectionResult<RemoteOp> {
        let list_id = require_remote(list, "list")?;
        let list_index = self.persisted_list_index(list_id)?;
        self.lists.remove(list_index);
        Ok(RemoteOp::DeleteList { list_id })
    }

    /// Drops a local-only list whose creation failed.
    pub fn discard_local_list(&mut self, local: LocalId) -> bool {
        let before = self.lists.len();
        self.lists.retain(|list| list.key != EntityKey::Local(local));
        before != self.lists.len()
    }

    /// Drops a local-only card whose creation failed.
    pub fn discard_local_card(&mut self, local: LocalId) -> bool {
        for list in &mut self.lists {
            if let Some(index) = list
                .cards
                .iter()
                .position(|card| card.key == EntityKey::Local(local))
            {
                list.cards.remove(index);
                return true;
            }
        }
        false
    }

    /// Places the card at `mv.position` in `mv.list_id` and returns the move
    /// request. The position reported is the index as of this call.
    pub fn move_card(&mut self, mv: CardMove) -> ProjectionResult<RemoteOp> {
        let position = self.relocate_card(mv.card_id, mv.list_id, mv.position)?;
        if let Some((list_index, card_index)) = self.card_coordinates(mv.card_id) {
            let card = &mut self.lists[list_index].cards[card_index];
            card.position = position as i32;
            card.sync = SyncStatus::Pending;
        }
        Ok(RemoteOp::MoveCard {
            card_id: mv.card_id,
            list_id: mv.list_id,
            position: position as i32,
        })
    }

    /// Moves a card locally without producing a store request. Returns the
    /// index the card ended up at after clamping.
    pub fn relocate_card(
        &mut self,
        card_id: CardId,
        list_id: ListId,
        index: usize,
    ) -> ProjectionResult<usize> {
        let target_index = self.persisted_list_index(list_id)?;
        let (source_index, card_index) = self.persisted_card_coordinates(card_id)?;

        let card = self.lists[source_index].cards.remove(card_index);
        let target = &mut self.lists[target_index].cards;
        let index = index.min(target.len());
        target.insert(index, card);
        Ok(index)
    }

    pub fn snapshot(&self) -> ProjectionSnapshot {
        ProjectionSnapshot {
            lists: self.lists.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: ProjectionSnapshot) {
        self.lists = snapshot.lists;
    }

    pub fn apply_outcome(&mut self, outcome: RemoteOutcome) {
        match outcome {
            RemoteOutcome::ListCreated { local, list } => {
                match self
                    .lists
                    .iter_mut()
                    .find(|entry| entry.key == EntityKey::Local(local))
                {
                    Some(entry) => {
                        entry.key = EntityKey::Remote(list.id);
                        entry.position = list.position;
                        entry.sync = SyncStatus::Confirmed;
                    }
                    None => debug!(%local, list_id = list.id.0, "created list no longer shown"),
                }
            }
            RemoteOutcome::CardCreated { local, card } => {
                match self
                    .lists
                    .iter_mut()
                    .flat_map(|list| list.cards.iter_mut())
                    .find(|entry| entry.key == EntityKey::Local(local))
                {
                    Some(entry) => {
                        entry.key = EntityKey::Remote(card.id);
                        entry.position = card.position;
                        entry.sync = SyncStatus::Confirmed;
                    }
                    None => debug!(%local, card_id = card.id.0, "created card no longer shown"),
                }
            }
            RemoteOutcome::ListUpdated(list) => {
                if let Some(index) = self.list_index(list.id) {
                    self.lists[index].sync = SyncStatus::Confirmed;
                }
            }
            RemoteOutcome::CardUpdated(card) | RemoteOutcome::CardMoved(card) => {
                if let Some((list_index, card_index)) = self.card_coordinates(card.id) {
                    self.lists[list_index].cards[card_index].sync = SyncStatus::Confirmed;
                }
            }
            RemoteOutcome::ListDeleted(_) | RemoteOutcome::CardDeleted(_) => {}
        }
    }

    /// Records a failed request. Moves cannot be patched locally and ask for
    /// a reload; everything else keeps its optimistic state and is flagged.
    pub fn apply_failure(&mut self, op: &RemoteOp, reason: &str) -> FailureRecovery {
        if op.is_move() {
            warn!(operation = op.name(), "move rejected; board will be reloaded: {reason}");
            return FailureRecovery::Reload;
        }

        warn!(operation = op.name(), "keeping optimistic change after failure: {reason}");
        let failed = SyncStatus::Failed {
            reason: reason.to_string(),
        };
        match op.subject() {
            EntityRef::List(key) => {
                if let Some(list) = self.lists.iter_mut().find(|list| list.key == key) {
                    list.sync = failed;
                }
            }
            EntityRef::Card(key) => {
                if let Some(card) = self
                    .lists
                    .iter_mut()
                    .flat_map(|list| list.cards.iter_mut())
                    .find(|card| card.key == key)
                {
                    card.sync = failed;
                }
            }
        }
        FailureRecovery::Flagged
    }
}

fn require_remote<Id: Copy + std::fmt::Display>(
    key: EntityKey<Id>,
    kind: &str,
) -> ProjectionResult<Id> {
    key.remote()
        .ok_or_else(|| ProjectionError::NotPersisted(format!("{kind} {key}")))
}

fn non_empty_title(title: &str) -> ProjectionResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ProjectionError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/projection_tests.rs"]
mod tests;
