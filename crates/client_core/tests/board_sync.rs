use std::sync::{
    atomic::{AtomicBool, AtomicI64, Ordering},
    Arc,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use client_core::{
    perform, BoardProjection, BoardStore, CardMove, DragEngine, DropOutcome, DropTarget,
    FailureRecovery, HttpBoardStore, PointerPos,
};
use shared::{
    domain::{BoardId, CardId, CardKey, EntityKey, ListId, ListKey},
    protocol::{BoardDto, CardDto, CreateCardRequest, ListDto, UpdateCardRequest},
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct MemoryStore {
    board: Arc<Mutex<BoardDto>>,
    next_id: Arc<AtomicI64>,
    fail_moves: Arc<AtomicBool>,
}

fn seeded_board() -> BoardDto {
    let card = |id: i64, title: &str, position: i32| CardDto {
        id: CardId(id),
        title: title.to_string(),
        description: None,
        position,
    };
    BoardDto {
        id: BoardId(1),
        name: "Integration".to_string(),
        lists: vec![
            ListDto {
                id: ListId(1),
                title: "Todo".to_string(),
                position: 0,
                cards: vec![card(1, "A", 0), card(2, "B", 1)],
            },
            ListDto {
                id: ListId(2),
                title: "Done".to_string(),
                position: 1,
                cards: vec![card(3, "X", 0), card(4, "Y", 1)],
            },
        ],
    }
}

async fn get_board(State(store): State<MemoryStore>) -> Json<BoardDto> {
    Json(store.board.lock().await.clone())
}

async fn create_card(
    State(store): State<MemoryStore>,
    Json(request): Json<CreateCardRequest>,
) -> Result<Json<CardDto>, StatusCode> {
    let mut board = store.board.lock().await;
    let list = board
        .lists
        .iter_mut()
        .find(|list| list.id == request.list_id)
        .ok_or(StatusCode::BAD_REQUEST)?;
    let card = CardDto {
        id: CardId(store.next_id.fetch_add(1, Ordering::SeqCst)),
        title: request.title,
        description: request.description,
        position: request.position,
    };
    list.cards.push(card.clone());
    Ok(Json(card))
}

async fn update_card(
    State(store): State<MemoryStore>,
    Path(card_id): Path<i64>,
    Json(request): Json<UpdateCardRequest>,
) -> Result<Json<CardDto>, StatusCode> {
    if request.list_id.is_some() && store.fail_moves.load(Ordering::SeqCst) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let mut board = store.board.lock().await;
    let (list_index, card_index) = board
        .lists
        .iter()
        .enumerate()
        .find_map(|(li, list)| {
            list.cards
                .iter()
                .position(|card| card.id == CardId(card_id))
                .map(|ci| (li, ci))
        })
        .ok_or(StatusCode::NOT_FOUND)?;
    let mut card = board.lists[list_index].cards.remove(card_index);
    if let Some(title) = request.title {
        card.title = title;
    }
    let target_index = match request.list_id {
        Some(list_id) => board
            .lists
            .iter()
            .position(|list| list.id == list_id)
            .ok_or(StatusCode::BAD_REQUEST)?,
        None => list_index,
    };
    let target = &mut board.lists[target_index].cards;
    let position = request
        .position
        .map(|p| (p.max(0) as usize).min(target.len()))
        .unwrap_or(card_index.min(target.len()));
    card.position = position as i32;
    target.insert(position, card.clone());
    Ok(Json(card))
}

async fn spawn_memory_store() -> (String, MemoryStore) {
    let store = MemoryStore {
        board: Arc::new(Mutex::new(seeded_board())),
        next_id: Arc::new(AtomicI64::new(100)),
        fail_moves: Arc::new(AtomicBool::new(false)),
    };
    let app = Router::new()
        .route("/api/boards/:id", get(get_board))
        .route("/api/cards", post(create_card))
        .route("/api/cards/:id", put(update_card))
        .with_state(store.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), store)
}

fn outline(projection: &BoardProjection) -> Vec<(ListKey, Vec<CardKey>)> {
    projection
        .lists()
        .iter()
        .map(|list| (list.key, list.cards.iter().map(|card| card.key).collect()))
        .collect()
}

#[tokio::test]
async fn created_cards_match_a_fresh_load_after_confirmation() {
    let (url, _memory) = spawn_memory_store().await;
    let store = HttpBoardStore::new(&url).expect("store");
    let mut projection = BoardProjection::from_board(store.get_board(BoardId(1)).await.expect("load"));

    let first = projection
        .add_card(EntityKey::Remote(ListId(1)), "C")
        .expect("first");
    let second = projection
        .add_card(EntityKey::Remote(ListId(1)), "D")
        .expect("second");

    for op in [&first, &second] {
        let outcome = perform(&store, op).await.expect("create");
        projection.apply_outcome(outcome);
    }

    let fresh = BoardProjection::from_board(store.get_board(BoardId(1)).await.expect("reload"));
    assert_eq!(outline(&projection), outline(&fresh));
}

#[tokio::test]
async fn dragged_card_lands_where_the_store_puts_it() {
    let (url, _memory) = spawn_memory_store().await;
    let store = HttpBoardStore::new(&url).expect("store");
    let mut projection = BoardProjection::from_board(store.get_board(BoardId(1)).await.expect("load"));
    let mut engine = DragEngine::default();

    engine.press(CardId(1), PointerPos::new(0.0, 0.0));
    engine.pointer_moved(
        &mut projection,
        PointerPos::new(260.0, 50.0),
        Some(DropTarget::Card {
            card_id: CardId(4),
            top: 40.0,
            height: 40.0,
        }),
    );
    let outcome = engine.release(
        &mut projection,
        Some(DropTarget::Card {
            card_id: CardId(1),
            top: 40.0,
            height: 40.0,
        }),
    );
    let DropOutcome::Commit { mv, changed_list } = outcome else {
        panic!("expected commit, got {outcome:?}");
    };
    assert!(changed_list);
    assert_eq!(
        mv,
        CardMove {
            card_id: CardId(1),
            list_id: ListId(2),
            position: 1,
        }
    );

    let op = projection.move_card(mv).expect("move");
    let confirmed = perform(&store, &op).await.expect("store move");
    projection.apply_outcome(confirmed);

    let fresh = BoardProjection::from_board(store.get_board(BoardId(1)).await.expect("reload"));
    assert_eq!(outline(&projection), outline(&fresh));
}

#[tokio::test]
async fn failed_move_reloads_to_the_store_state() {
    let (url, memory) = spawn_memory_store().await;
    memory.fail_moves.store(true, Ordering::SeqCst);
    let store = HttpBoardStore::new(&url).expect("store");
    let mut projection = BoardProjection::from_board(store.get_board(BoardId(1)).await.expect("load"));

    let op = projection
        .move_card(CardMove {
            card_id: CardId(2),
            list_id: ListId(2),
            position: 0,
        })
        .expect("move");
    assert_ne!(outline(&projection), outline(&BoardProjection::from_board(seeded_board())));

    let err = perform(&store, &op).await.expect_err("store must reject");
    let recovery = projection.apply_failure(&op, &err.to_string());
    assert_eq!(recovery, FailureRecovery::Reload);

    projection.replace(store.get_board(BoardId(1)).await.expect("reload"));
    assert_eq!(
        outline(&projection),
        outline(&BoardProjection::from_board(seeded_board()))
    );
}
