//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{CardEdit, DropTarget, PointerPos, RemoteOp, RemoteOutcome, StoreError};
use shared::{
    domain::{CardId, CardKey, ListKey, LocalId},
    protocol::BoardDto,
};

/// Results flowing from the backend worker to the UI thread.
#[derive(Debug, Clone)]
pub enum UiEvent {
    Info(String),
    Error(UiError),
    BoardLoaded(BoardDto),
    BoardLoadFailed(UiError),
    RemoteCompleted(RemoteOutcome),
    RemoteFailed { op: RemoteOp, error: UiError },
}

impl UiEvent {
    pub fn remote_failed(op: RemoteOp, err: &StoreError) -> Self {
        Self::RemoteFailed {
            error: UiError::from_store(UiErrorContext::for_op(&op), err),
            op,
        }
    }
}

/// Things the user did this frame, collected while rendering and applied
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardIntent {
    Reload,
    DismissBanner,
    AddList(String),
    RenameList { list: ListKey, title: String },
    DeleteList(ListKey),
    AddCard { list: ListKey, title: String },
    UpdateCard { card: CardKey, edit: CardEdit },
    DeleteCard(CardKey),
    DiscardLocalList(LocalId),
    DiscardLocalCard(LocalId),
    PressCard { card_id: CardId, pos: PointerPos },
    PointerMoved { pos: PointerPos, over: Option<DropTarget> },
    PointerReleased { over: Option<DropTarget> },
    CancelDrag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Unreachable,
    Rejected,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadBoard,
    Mutation,
    Move,
}

impl UiErrorContext {
    pub fn for_op(op: &RemoteOp) -> Self {
        if op.is_move() {
            Self::Move
        } else {
            Self::Mutation
        }
    }
}

pub fn describe_load_failure(error: &UiError) -> String {
    match error.category() {
        UiErrorCategory::Unreachable => {
            "Failed to load board. Make sure the backend is running and reachable.".to_string()
        }
        UiErrorCategory::Rejected if error.message().contains("404") => {
            "Failed to load board. The board does not exist on the server.".to_string()
        }
        _ => format!("Failed to load board: {}", error.message()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("unreachable")
            || message_lower.contains("connection")
            || message_lower.contains("timed out")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Unreachable
        } else if message_lower.contains("status") || message_lower.contains("rejected") {
            UiErrorCategory::Rejected
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_store(context: UiErrorContext, err: &StoreError) -> Self {
        let category = if err.is_unreachable() {
            UiErrorCategory::Unreachable
        } else if err.status().is_some() {
            UiErrorCategory::Rejected
        } else {
            UiErrorCategory::Unknown
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
