use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, BoardStore, HttpBoardStore};
use shared::{
    domain::{BoardId, ListId},
    protocol::{BoardDto, CreateCardRequest, CreateListRequest},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "board-cli", about = "Inspect and edit boards from the terminal")]
struct Args {
    /// Origin of the board store; overrides board.toml and the environment
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Board to operate on
    #[arg(long, global = true)]
    board_id: Option<i64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the board as an outline
    Show,
    /// Create a new, empty board
    CreateBoard { name: String },
    /// Append a list to the board
    AddList { title: String },
    /// Append a card to a list
    AddCard {
        #[arg(long)]
        list_id: i64,
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(board_id) = args.board_id {
        settings.board_id = BoardId(board_id);
    }
    let store = HttpBoardStore::from_settings(&settings)?;
    let board_id = settings.board_id;
    tracing::debug!(api_base = store.api_base(), board_id = board_id.0, "board store ready");

    match args.command {
        Command::Show => {
            let board = store.get_board(board_id).await?;
            print!("{}", render_outline(&board));
        }
        Command::CreateBoard { name } => {
            let name = non_blank(&name, "board name")?;
            let board = store.create_board(&name).await?;
            println!("Created board {} ({})", board.id, board.name);
        }
        Command::AddList { title } => {
            let title = non_blank(&title, "list title")?;
            let board = store.get_board(board_id).await?;
            let list = store
                .create_list(&CreateListRequest {
                    title,
                    position: board.lists.len() as i32,
                    board_id,
                })
                .await?;
            println!("Created list {} ({}) at position {}", list.id, list.title, list.position);
        }
        Command::AddCard {
            list_id,
            title,
            description,
        } => {
            let title = non_blank(&title, "card title")?;
            let list_id = ListId(list_id);
            let board = store.get_board(board_id).await?;
            let list = board
                .lists
                .iter()
                .find(|list| list.id == list_id)
                .with_context(|| format!("list {list_id} is not on board {board_id}"))?;
            let card = store
                .create_card(&CreateCardRequest {
                    title,
                    description: description.filter(|d| !d.trim().is_empty()),
                    position: list.cards.len() as i32,
                    list_id,
                })
                .await?;
            println!("Created card {} ({}) in list {}", card.id, card.title, list_id);
        }
    }
    Ok(())
}

fn non_blank(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{what} must not be empty");
    }
    Ok(trimmed.to_string())
}

fn render_outline(board: &BoardDto) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (board {})", board.name, board.id);
    for list in &board.lists {
        let _ = writeln!(out, "  [{}] {}", list.id, list.title);
        for card in &list.cards {
            let _ = writeln!(out, "    - [{}] {}", card.id, card.title);
            if let Some(description) = card.description.as_deref().filter(|d| !d.is_empty()) {
                let _ = writeln!(out, "        {description}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{
        domain::CardId,
        protocol::{CardDto, ListDto},
    };

    #[test]
    fn outline_nests_cards_under_lists() {
        let board = BoardDto {
            id: BoardId(1),
            name: "Main".to_string(),
            lists: vec![ListDto {
                id: ListId(3),
                title: "Todo".to_string(),
                position: 0,
                cards: vec![CardDto {
                    id: CardId(7),
                    title: "Write tests".to_string(),
                    description: Some("cli first".to_string()),
                    position: 0,
                }],
            }],
        };
        assert_eq!(
            render_outline(&board),
            "Main (board 1)\n  [3] Todo\n    - [7] Write tests\n        cli first\n"
        );
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(non_blank("   ", "list title").is_err());
        assert_eq!(non_blank(" Done ", "list title").ok().as_deref(), Some("Done"));
    }

    #[test]
    fn subcommands_parse_with_global_flags() {
        let args = Args::parse_from([
            "board-cli",
            "add-card",
            "--list-id",
            "4",
            "Ship",
            "--board-id",
            "2",
        ]);
        assert_eq!(args.board_id, Some(2));
        match args.command {
            Command::AddCard { list_id, title, .. } => {
                assert_eq!(list_id, 4);
                assert_eq!(title, "Ship");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
