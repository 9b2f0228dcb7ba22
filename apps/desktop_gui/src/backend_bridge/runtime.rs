//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{perform, BoardStore, ClientSettings, HttpBoardStore};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let store: Arc<dyn BoardStore> = match HttpBoardStore::from_settings(&settings) {
            Ok(store) => {
                tracing::info!(api_base = store.api_base(), "board store configured");
                Arc::new(store)
            }
            Err(err) => {
                tracing::error!("invalid board store configuration: {err}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_store(
                    UiErrorContext::BackendStartup,
                    &err,
                )));
                return;
            }
        };

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                let store = Arc::clone(&store);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let cmd_name = cmd.name();
                    let event = execute(store.as_ref(), cmd).await;
                    if ui_tx.try_send(event).is_err() {
                        tracing::warn!(command = cmd_name, "ui event queue unavailable");
                    }
                });
            }
            tracing::info!("ui command queue closed; backend worker exiting");
        });
    });
}

/// Runs one command against the store and turns the result into a UI event.
pub async fn execute(store: &dyn BoardStore, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::LoadBoard { board_id } => match store.get_board(board_id).await {
            Ok(board) => UiEvent::BoardLoaded(board),
            Err(err) => {
                tracing::warn!(operation = err.operation(), board_id = board_id.0, "{err}");
                UiEvent::BoardLoadFailed(UiError::from_store(UiErrorContext::LoadBoard, &err))
            }
        },
        BackendCommand::Perform(op) => match perform(store, &op).await {
            Ok(outcome) => UiEvent::RemoteCompleted(outcome),
            Err(err) => {
                tracing::warn!(operation = err.operation(), status = ?err.status(), "{err}");
                UiEvent::remote_failed(op, &err)
            }
        },
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
