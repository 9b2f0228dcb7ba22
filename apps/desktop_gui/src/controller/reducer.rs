//! Board session state and the transitions driven by UI intents and backend events.

use client_core::{
    BoardProjection, DragEngine, DropOutcome, FailureRecovery, ProjectionError, RemoteOp,
};
use shared::domain::{BoardId, CardId};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{
    describe_load_failure, BoardIntent, UiError, UiErrorContext, UiEvent,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    LoadFailed(String),
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub severity: StatusBannerSeverity,
    pub message: String,
}

/// Side effects of one intent or event.
#[derive(Debug, Default, PartialEq)]
pub struct Effects {
    pub commands: Vec<BackendCommand>,
    /// A card was clicked without dragging; the view opens its editor.
    pub open_editor: Option<CardId>,
}

impl Effects {
    fn command(cmd: BackendCommand) -> Self {
        Self {
            commands: vec![cmd],
            open_editor: None,
        }
    }
}

pub struct BoardSession {
    board_id: BoardId,
    pub view: ViewState,
    pub projection: Option<BoardProjection>,
    pub drag: DragEngine,
    pub status: String,
    pub banner: Option<StatusBanner>,
}

impl BoardSession {
    pub fn new(board_id: BoardId, drag_threshold: f32) -> Self {
        Self {
            board_id,
            view: ViewState::Loading,
            projection: None,
            drag: DragEngine::new(drag_threshold),
            status: "Starting".to_string(),
            banner: None,
        }
    }

    /// Shows the loading screen and asks for the board.
    pub fn start_load(&mut self) -> BackendCommand {
        self.view = ViewState::Loading;
        self.status = format!("Loading board {}", self.board_id);
        self.reload_command()
    }

    fn reload_command(&self) -> BackendCommand {
        BackendCommand::LoadBoard {
            board_id: self.board_id,
        }
    }

    pub fn handle_event(&mut self, event: UiEvent) -> Effects {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::Error(err) => {
                tracing::error!(context = ?err.context(), "{}", err.message());
                self.status = err.message().to_string();
                if err.context() == UiErrorContext::BackendStartup {
                    self.view = ViewState::LoadFailed(describe_load_failure(&err));
                } else {
                    self.show_error(err.message().to_string());
                }
            }
            UiEvent::BoardLoaded(board) => {
                if let Some(projection) = self.projection.as_mut() {
                    if self.drag.cancel(projection).is_some() {
                        tracing::debug!("drag interrupted by board reload");
                    }
                    projection.replace(board);
                } else {
                    self.projection = Some(BoardProjection::from_board(board));
                }
                self.view = ViewState::Ready;
                self.status = "Board loaded".to_string();
            }
            UiEvent::BoardLoadFailed(err) => {
                tracing::error!(board_id = self.board_id.0, "board load failed: {}", err.message());
                if self.view == ViewState::Ready && self.projection.is_some() {
                    // Resync after a failed move; the board stays usable.
                    self.show_error(format!(
                        "Could not reload board ({}); use Reload to retry",
                        err.message()
                    ));
                } else {
                    self.status = err.message().to_string();
                    self.view = ViewState::LoadFailed(describe_load_failure(&err));
                }
            }
            UiEvent::RemoteCompleted(outcome) => {
                if let Some(projection) = self.projection.as_mut() {
                    projection.apply_outcome(outcome);
                }
            }
            UiEvent::RemoteFailed { op, error } => {
                let Some(projection) = self.projection.as_mut() else {
                    return Effects::default();
                };
                match projection.apply_failure(&op, error.message()) {
                    FailureRecovery::Flagged => {
                        self.show_error(format!(
                            "Could not {}: {}",
                            operation_label(&op),
                            error.message()
                        ));
                    }
                    FailureRecovery::Reload => {
                        self.show_error(format!(
                            "Could not move card ({}); reloading board",
                            error.message()
                        ));
                        self.status = "Resynchronizing board".to_string();
                        return Effects::command(self.reload_command());
                    }
                }
            }
        }
        Effects::default()
    }

    /// A command never reached the backend worker. It is reported the same
    /// way a failed request would be.
    pub fn command_dropped(&mut self, cmd: BackendCommand, reason: &str) -> Effects {
        let event = match cmd {
            BackendCommand::LoadBoard { .. } => {
                UiEvent::BoardLoadFailed(UiError::from_message(UiErrorContext::LoadBoard, reason))
            }
            BackendCommand::Perform(op) => UiEvent::RemoteFailed {
                error: UiError::from_message(UiErrorContext::for_op(&op), reason),
                op,
            },
        };
        self.handle_event(event)
    }

    pub fn handle_intent(&mut self, intent: BoardIntent) -> Effects {
        match intent {
            BoardIntent::Reload => return Effects::command(self.start_load()),
            BoardIntent::DismissBanner => {
                self.banner = None;
                return Effects::default();
            }
            _ => {}
        }

        let Some(projection) = self.projection.as_mut() else {
            return Effects::default();
        };

        let result = match intent {
            BoardIntent::Reload | BoardIntent::DismissBanner => return Effects::default(),
            BoardIntent::AddList(title) => projection.add_list(&title).map(Some),
            BoardIntent::RenameList { list, title } => {
                projection.rename_list(list, &title).map(Some)
            }
            BoardIntent::DeleteList(list) => projection.delete_list(list).map(Some),
            BoardIntent::AddCard { list, title } => projection.add_card(list, &title).map(Some),
            BoardIntent::UpdateCard { card, edit } => projection.update_card(card, edit).map(Some),
            BoardIntent::DeleteCard(card) => projection.delete_card(card).map(Some),
            BoardIntent::DiscardLocalList(local) => {
                projection.discard_local_list(local);
                Ok(None)
            }
            BoardIntent::DiscardLocalCard(local) => {
                projection.discard_local_card(local);
                Ok(None)
            }
            BoardIntent::PressCard { card_id, pos } => {
                self.drag.press(card_id, pos);
                Ok(None)
            }
            BoardIntent::PointerMoved { pos, over } => {
                self.drag.pointer_moved(projection, pos, over);
                Ok(None)
            }
            BoardIntent::PointerReleased { over } => {
                return match self.drag.release(projection, over) {
                    DropOutcome::Click(card_id) => Effects {
                        commands: Vec::new(),
                        open_editor: Some(card_id),
                    },
                    DropOutcome::Commit { mv, changed_list } => {
                        tracing::debug!(
                            card_id = mv.card_id.0,
                            list_id = mv.list_id.0,
                            position = mv.position,
                            changed_list,
                            "committing card move"
                        );
                        match projection.move_card(mv) {
                            Ok(op) => Effects::command(BackendCommand::Perform(op)),
                            Err(err) => {
                                self.reject(err);
                                Effects::default()
                            }
                        }
                    }
                    DropOutcome::Cancelled(card_id) | DropOutcome::Aborted(card_id) => {
                        tracing::debug!(card_id = card_id.0, "drop ended without a move");
                        Effects::default()
                    }
                    DropOutcome::Idle => Effects::default(),
                };
            }
            BoardIntent::CancelDrag => {
                self.drag.cancel(projection);
                Ok(None)
            }
        };

        match result {
            Ok(Some(op)) => Effects::command(BackendCommand::Perform(op)),
            Ok(None) => Effects::default(),
            Err(err) => {
                self.reject(err);
                Effects::default()
            }
        }
    }

    fn reject(&mut self, err: ProjectionError) {
        tracing::debug!("intent rejected: {err}");
        if err != ProjectionError::EmptyTitle {
            self.show_error(err.to_string());
        }
    }

    fn show_error(&mut self, message: String) {
        self.status = message.clone();
        self.banner = Some(StatusBanner {
            severity: StatusBannerSeverity::Error,
            message,
        });
    }
}

fn operation_label(op: &RemoteOp) -> &'static str {
    match op {
        RemoteOp::CreateList { .. } => "create list",
        RemoteOp::CreateCard { .. } => "create card",
        RemoteOp::UpdateList { .. } => "rename list",
        RemoteOp::UpdateCard { .. } => "save card",
        RemoteOp::MoveCard { .. } => "move card",
        RemoteOp::DeleteList { .. } => "delete list",
        RemoteOp::DeleteCard { .. } => "delete card",
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
