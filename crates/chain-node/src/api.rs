//! HTTP surface of the node.

use crate::fetcher::HttpChainFetcher;
use crate::peer::{urls_for_host, validate_peer_list, PeerAddressError};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, State},
    http::{header::HOST, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chain_core::{resolve_conflicts, Block, ChainResponse, SharedLedger, Transaction};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub ledger: SharedLedger,
    pub fetcher: HttpChainFetcher,
    /// This node's own base URL; peers may not register it.
    pub public_url: String,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodesList {
    pub nodes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// `Json` whose rejections go through [`ApiError`], so malformed bodies get
/// the same `{"detail": ...}` shape as every other client error.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
struct ApiJson<T>(T);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidPeers(#[from] PeerAddressError),
    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),
    #[error("mining task failed: {0}")]
    Mining(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidPeers(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::Mining(err) => {
                error!(error = %err, "mining task failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/mine/", post(mine))
        .route("/transaction/", post(add_transaction))
        .route("/chain/", get(get_chain))
        .route("/nodes/", post(register_nodes))
        .route("/resolve-conflicts/", post(resolve))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Mines a block. The proof search runs on the blocking pool.
async fn mine(State(state): State<AppState>) -> Result<(StatusCode, Json<Block>), ApiError> {
    let ledger = state.ledger.clone();
    let block = tokio::task::spawn_blocking(move || ledger.mine()).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

async fn add_transaction(
    State(state): State<AppState>,
    ApiJson(tx): ApiJson<Transaction>,
) -> (StatusCode, Json<MessageResponse>) {
    let index = state.ledger.add_transaction(tx);
    let message =
        format!("Transaction will be added to the next mined block (index:{index})");
    (StatusCode::CREATED, Json(MessageResponse::new(message)))
}

async fn get_chain(State(state): State<AppState>) -> Json<ChainResponse> {
    Json(ChainResponse {
        chain: state.ledger.chain(),
    })
}

/// Registers peers. The node's configured public URL and the URL the caller
/// reached it on (from `Host`) both count as its own address.
async fn register_nodes(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<NodesList>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let mut own_urls = vec![state.public_url.clone()];
    if let Some(host) = headers.get(HOST).and_then(|h| h.to_str().ok()) {
        own_urls.extend(urls_for_host(host));
    }
    validate_peer_list(&body.nodes, &own_urls)?;
    info!(count = body.nodes.len(), "registering nodes");
    state.ledger.register_peers(body.nodes);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("New nodes have been registered")),
    ))
}

async fn resolve(State(state): State<AppState>) -> (StatusCode, Json<MessageResponse>) {
    let replaced = resolve_conflicts(&state.ledger, &state.fetcher).await;
    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    (StatusCode::CREATED, Json(MessageResponse::new(message)))
}
