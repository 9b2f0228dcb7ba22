use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{BoardId, CardId, ListId},
    protocol::{
        BoardDto, CardDto, CreateBoardRequest, CreateCardRequest, CreateListRequest, ListDto,
        UpdateCardRequest, UpdateListRequest,
    },
};
use tracing::{debug, info, warn};

pub mod config;
pub mod drag;
pub mod error;
pub mod projection;

pub use config::{load_settings, ClientSettings};
pub use drag::{DragEngine, DropOutcome, DropTarget, PointerPos};
pub use error::{StoreError, StoreResult};
pub use projection::{
    BoardCard, BoardList, BoardProjection, CardEdit, CardMove, FailureRecovery, ProjectionError,
    RemoteOp, RemoteOutcome, SyncStatus,
};

/// The remote service that owns boards, lists and cards.
#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn get_board(&self, board_id: BoardId) -> StoreResult<BoardDto>;
    async fn create_board(&self, name: &str) -> StoreResult<BoardDto>;
    async fn create_list(&self, request: &CreateListRequest) -> StoreResult<ListDto>;
    async fn update_list(
        &self,
        list_id: ListId,
        request: &UpdateListRequest,
    ) -> StoreResult<ListDto>;
    async fn delete_list(&self, list_id: ListId) -> StoreResult<()>;
    async fn create_card(&self, request: &CreateCardRequest) -> StoreResult<CardDto>;
    async fn update_card(
        &self,
        card_id: CardId,
        request: &UpdateCardRequest,
    ) -> StoreResult<CardDto>;
    async fn delete_card(&self, card_id: CardId) -> StoreResult<()>;
}

pub struct HttpBoardStore {
    http: Client,
    api_base: String,
}

impl HttpBoardStore {
    /// `api_url` is the store origin; `/api` is appended.
    pub fn new(api_url: &str) -> StoreResult<Self> {
        let origin = config::normalize_api_url(api_url)?;
        Ok(Self {
            http: Client::new(),
            api_base: format!("{origin}/api"),
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> StoreResult<Self> {
        Self::new(&settings.api_url)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> StoreResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|source| StoreError::Transport { operation, source })?;
        let status = response.status();
        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "board store rejected request");
            return Err(StoreError::Status {
                operation,
                status: status.as_u16(),
            });
        }
        debug!(operation, status = status.as_u16(), "board store request ok");
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> StoreResult<T> {
        self.send(operation, request)
            .await?
            .json()
            .await
            .map_err(|source| StoreError::Decode { operation, source })
    }
}

#[async_trait]
impl BoardStore for HttpBoardStore {
    async fn get_board(&self, board_id: BoardId) -> StoreResult<BoardDto> {
        let board: BoardDto = self
            .send_json(
                "get_board",
                self.http.get(format!("{}/boards/{board_id}", self.api_base)),
            )
            .await?;
        info!(board_id = board.id.0, lists = board.lists.len(), "board loaded");
        Ok(board)
    }

    async fn create_board(&self, name: &str) -> StoreResult<BoardDto> {
        self.send_json(
            "create_board",
            self.http
                .post(format!("{}/boards", self.api_base))
                .json(&CreateBoardRequest {
                    name: name.to_string(),
                }),
        )
        .await
    }

    async fn create_list(&self, request: &CreateListRequest) -> StoreResult<ListDto> {
        self.send_json(
            "create_list",
            self.http
                .post(format!("{}/lists", self.api_base))
                .json(request),
        )
        .await
    }

    async fn update_list(
        &self,
        list_id: ListId,
        request: &UpdateListRequest,
    ) -> StoreResult<ListDto> {
        self.send_json(
            "update_list",
            self.http
                .put(format!("{}/lists/{list_id}", self.api_base))
                .json(request),
        )
        .await
    }

    async fn delete_list(&self, list_id: ListId) -> StoreResult<()> {
        self.send(
            "delete_list",
            self.http.delete(format!("{}/lists/{list_id}", self.api_base)),
        )
        .await?;
        Ok(())
    }

    async fn create_card(&self, request: &CreateCardRequest) -> StoreResult<CardDto> {
        self.send_json(
            "create_card",
            self.http
                .post(format!("{}/cards", self.api_base))
                .json(request),
        )
        .await
    }

    async fn update_card(
        &self,
        card_id: CardId,
        request: &UpdateCardRequest,
    ) -> StoreResult<CardDto> {
        self.send_json(
            "update_card",
            self.http
                .put(format!("{}/cards/{card_id}", self.api_base))
                .json(request),
        )
        .await
    }

    async fn delete_card(&self, card_id: CardId) -> StoreResult<()> {
        self.send(
            "delete_card",
            self.http.delete(format!("{}/cards/{card_id}", self.api_base)),
        )
        .await?;
        Ok(())
    }
}

/// Issues `op` against the store and maps the response to the outcome the
/// projection understands.
pub async fn perform(store: &dyn BoardStore, op: &RemoteOp) -> StoreResult<RemoteOutcome> {
    match op {
        RemoteOp::CreateList { local, request } => {
            let list = store.create_list(request).await?;
            Ok(RemoteOutcome::ListCreated {
                local: *local,
                list,
            })
        }
        RemoteOp::CreateCard { local, request } => {
            let card = store.create_card(request).await?;
            Ok(RemoteOutcome::CardCreated {
                local: *local,
                card,
            })
        }
        RemoteOp::UpdateList { list_id, request } => store
            .update_list(*list_id, request)
            .await
            .map(RemoteOutcome::ListUpdated),
        RemoteOp::UpdateCard { card_id, request } => store
            .update_card(*card_id, request)
            .await
            .map(RemoteOutcome::CardUpdated),
        RemoteOp::MoveCard {
            card_id,
            list_id,
            position,
        } => {
            let request = UpdateCardRequest {
                position: Some(*position),
                list_id: Some(*list_id),
                ..Default::default()
            };
            store
                .update_card(*card_id, &request)
                .await
                .map(RemoteOutcome::CardMoved)
        }
        RemoteOp::DeleteList { list_id } => {
            store.delete_list(*list_id).await?;
            Ok(RemoteOutcome::ListDeleted(*list_id))
        }
        RemoteOp::DeleteCard { card_id } => {
            store.delete_card(*card_id).await?;
            Ok(RemoteOutcome::CardDeleted(*card_id))
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
