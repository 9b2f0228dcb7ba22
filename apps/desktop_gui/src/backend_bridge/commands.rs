//! Backend commands queued from UI to backend worker.

use client_core::RemoteOp;
use shared::domain::BoardId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    LoadBoard { board_id: BoardId },
    Perform(RemoteOp),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadBoard { .. } => "load_board",
            Self::Perform(op) => op.name(),
        }
    }
}
