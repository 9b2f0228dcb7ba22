mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{load_settings, ClientSettings};
use crossbeam_channel::bounded;
use eframe::egui;
use shared::domain::BoardId;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{StartupConfig, TaskBoardApp};

#[derive(Debug, Parser)]
#[command(name = "taskboard", about = "Kanban board desktop client")]
struct Args {
    /// Origin of the board store, e.g. http://127.0.0.1:8080
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    board_id: Option<i64>,
    /// Pointer travel in pixels before a press turns into a drag
    #[arg(long)]
    drag_threshold: Option<f32>,
}

impl Args {
    fn apply(self, settings: &mut ClientSettings) {
        if let Some(api_url) = self.api_url {
            settings.api_url = api_url;
        }
        if let Some(board_id) = self.board_id {
            settings.board_id = BoardId(board_id);
        }
        if let Some(threshold) = self.drag_threshold {
            settings.drag_threshold = threshold;
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut settings = load_settings();
    Args::parse().apply(&mut settings);
    tracing::info!(
        api_url = %settings.api_url,
        board_id = settings.board_id.0,
        "starting task board"
    );
    let startup = StartupConfig { settings };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(startup.settings.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Task Board")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Task Board",
        options,
        Box::new(move |_cc| Ok(Box::new(TaskBoardApp::new(cmd_tx, ui_rx, &startup)))),
    )
}
