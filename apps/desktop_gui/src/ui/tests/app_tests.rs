use super::*;
use client_core::{DropTarget, PointerPos, SyncStatus};
use crossbeam_channel::bounded;
use eframe::egui::{pos2, vec2, Rect};
use shared::{
    domain::{BoardId, CardId, ListId},
    protocol::{BoardDto, CardDto, ListDto},
};

fn card(id: i64, title: &str, position: i32) -> CardDto {
    CardDto {
        id: CardId(id),
        title: title.to_string(),
        description: None,
        position,
    }
}

fn board() -> BoardDto {
    BoardDto {
        id: BoardId(1),
        name: "Main".to_string(),
        lists: vec![
            ListDto {
                id: ListId(10),
                title: "Todo".to_string(),
                position: 0,
                cards: vec![card(1, "A", 0), card(2, "B", 1)],
            },
            ListDto {
                id: ListId(20),
                title: "Done".to_string(),
                position: 1,
                cards: vec![card(3, "C", 0)],
            },
        ],
    }
}

/// An app whose single-slot command queue is already taken by the initial
/// board load, so every later command is refused.
fn app_with_full_queue() -> (TaskBoardApp, Receiver<BackendCommand>) {
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(1);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(8);
    let mut app = TaskBoardApp::new(cmd_tx, ui_rx, &StartupConfig::default());
    ui_tx
        .send(UiEvent::BoardLoaded(board()))
        .expect("ui queue");
    app.process_ui_events();
    assert_eq!(app.session.view, ViewState::Ready);
    (app, cmd_rx)
}

fn apply(app: &mut TaskBoardApp, intent: BoardIntent) {
    let effects = app.session.handle_intent(intent);
    app.apply_effects(effects);
}

fn card_sync(app: &TaskBoardApp, card_id: i64) -> SyncStatus {
    app.session
        .projection
        .as_ref()
        .and_then(|projection| projection.find_card(CardId(card_id)))
        .map(|card| card.sync.clone())
        .expect("card")
}

#[test]
fn unqueued_edit_is_flagged_as_failed() {
    let (mut app, cmd_rx) = app_with_full_queue();
    apply(
        &mut app,
        BoardIntent::UpdateCard {
            card: EntityKey::Remote(CardId(3)),
            edit: client_core::CardEdit {
                title: Some("C2".to_string()),
                description: None,
            },
        },
    );

    assert!(matches!(card_sync(&app, 3), SyncStatus::Failed { .. }));
    let banner = app.session.banner.as_ref().expect("banner");
    assert!(banner.message.contains("save card"));
    assert_eq!(cmd_rx.len(), 1);
}

#[test]
fn unqueued_move_asks_for_a_reload_and_keeps_the_board() {
    let (mut app, cmd_rx) = app_with_full_queue();
    apply(
        &mut app,
        BoardIntent::PressCard {
            card_id: CardId(1),
            pos: PointerPos::new(0.0, 0.0),
        },
    );
    apply(
        &mut app,
        BoardIntent::PointerMoved {
            pos: PointerPos::new(300.0, 40.0),
            over: Some(DropTarget::List(ListId(20))),
        },
    );
    apply(
        &mut app,
        BoardIntent::PointerReleased {
            over: Some(DropTarget::List(ListId(20))),
        },
    );

    // The reload could not be queued either; the board stays and says so.
    assert_eq!(app.session.view, ViewState::Ready);
    let banner = app.session.banner.as_ref().expect("banner");
    assert!(banner.message.contains("Could not reload board"));
    assert_eq!(
        cmd_rx.try_recv().ok(),
        Some(BackendCommand::LoadBoard {
            board_id: BoardId(1)
        })
    );
    assert!(cmd_rx.try_recv().is_err());
}

#[test]
fn disconnected_worker_fails_the_initial_load() {
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(4);
    drop(cmd_rx);
    let (_ui_tx, ui_rx) = bounded::<UiEvent>(4);
    let app = TaskBoardApp::new(cmd_tx, ui_rx, &StartupConfig::default());
    assert!(matches!(app.session.view, ViewState::LoadFailed(_)));
}

fn frame() -> PointerFrame {
    PointerFrame {
        latest: Some(pos2(20.0, 20.0)),
        released: false,
        escape: false,
        has_pointer: true,
        focused: true,
    }
}

fn layout() -> BoardLayout {
    let mut layout = BoardLayout::default();
    layout.record_list(ListId(10), Rect::from_min_size(pos2(0.0, 0.0), vec2(272.0, 400.0)));
    layout
}

#[test]
fn pointer_moves_resolve_their_drop_target() {
    assert_eq!(
        pointer_intents(frame(), &layout()),
        vec![BoardIntent::PointerMoved {
            pos: PointerPos::new(20.0, 20.0),
            over: Some(DropTarget::List(ListId(10))),
        }]
    );
}

#[test]
fn release_reports_the_target_under_the_pointer() {
    let released = PointerFrame {
        released: true,
        ..frame()
    };
    let intents = pointer_intents(released, &layout());
    assert_eq!(
        intents.last(),
        Some(&BoardIntent::PointerReleased {
            over: Some(DropTarget::List(ListId(10))),
        })
    );
}

#[test]
fn losing_the_pointer_or_focus_cancels_the_gesture() {
    let gone = PointerFrame {
        latest: None,
        has_pointer: false,
        ..frame()
    };
    assert_eq!(pointer_intents(gone, &layout()), vec![BoardIntent::CancelDrag]);

    let unfocused = PointerFrame {
        focused: false,
        ..frame()
    };
    assert_eq!(pointer_intents(unfocused, &layout()), vec![BoardIntent::CancelDrag]);

    let escape = PointerFrame {
        escape: true,
        ..frame()
    };
    assert_eq!(pointer_intents(escape, &layout()), vec![BoardIntent::CancelDrag]);
}

#[test]
fn release_outside_the_window_is_a_drop_without_target() {
    let released_outside = PointerFrame {
        latest: None,
        has_pointer: false,
        released: true,
        ..frame()
    };
    assert_eq!(
        pointer_intents(released_outside, &layout()),
        vec![BoardIntent::PointerReleased { over: None }]
    );
}

#[test]
fn drop_without_target_restores_and_sends_nothing() {
    let (mut app, cmd_rx) = app_with_full_queue();
    let _ = cmd_rx.try_recv();
    apply(
        &mut app,
        BoardIntent::PressCard {
            card_id: CardId(2),
            pos: PointerPos::new(0.0, 0.0),
        },
    );
    apply(
        &mut app,
        BoardIntent::PointerMoved {
            pos: PointerPos::new(300.0, 0.0),
            over: Some(DropTarget::List(ListId(20))),
        },
    );
    apply(&mut app, BoardIntent::PointerReleased { over: None });

    assert!(cmd_rx.try_recv().is_err());
    let projection = app.session.projection.as_ref().expect("projection");
    assert_eq!(projection.locate_card(CardId(2)), Some((ListId(10), 1)));
    assert_eq!(card_sync(&app, 2), SyncStatus::Confirmed);
}
