//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the backend worker. A command that could not be queued
/// is handed back so the caller can treat it as failed.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> Result<(), BackendCommand> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(cmd)) => {
            tracing::warn!(command = cmd_name, "ui command queue full");
            *status = "UI command queue is full; the request was not sent".to_string();
            Err(cmd)
        }
        Err(TrySendError::Disconnected(cmd)) => {
            tracing::error!(command = cmd_name, "backend worker disconnected");
            *status =
                "Backend worker disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
            Err(cmd)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use shared::domain::BoardId;

    #[test]
    fn queues_commands_and_reports_a_full_queue() {
        let (tx, rx) = bounded(1);
        let mut status = String::new();

        let load = BackendCommand::LoadBoard {
            board_id: BoardId(1),
        };
        assert_eq!(dispatch_backend_command(&tx, load.clone(), &mut status), Ok(()));
        assert!(status.is_empty());
        assert_eq!(rx.try_recv().ok(), Some(load.clone()));

        assert_eq!(dispatch_backend_command(&tx, load.clone(), &mut status), Ok(()));
        assert_eq!(
            dispatch_backend_command(&tx, load.clone(), &mut status),
            Err(load)
        );
        assert!(status.contains("full"));
    }

    #[test]
    fn reports_a_disconnected_worker() {
        let (tx, rx) = bounded(4);
        drop(rx);
        let mut status = String::new();
        let returned = dispatch_backend_command(
            &tx,
            BackendCommand::LoadBoard {
                board_id: BoardId(1),
            },
            &mut status,
        );
        assert!(returned.is_err());
        assert!(status.contains("disconnected"));
    }
}
