//! # tb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the
//! [`BoardService`]. Handlers only parse, delegate, and shape responses.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Redirect,
    Json,
};
use tb_core::models::{ThreadDetail, ThreadSummary};
use tb_core::traits::ThreadStore;
use tb_core::BoardService;
use tracing::debug;

use crate::dto::{
    CreateReplyRequest, CreateThreadRequest, DeleteReplyRequest, DeleteThreadRequest,
    GetThreadQuery, ReportReplyRequest, ThreadRef,
};
use crate::error::ApiError;
use crate::extract::Payload;

/// State shared across all request handlers.
pub struct AppState {
    pub service: BoardService,
}

impl AppState {
    pub fn new(store: Arc<dyn ThreadStore>) -> Self {
        Self {
            service: BoardService::new(store),
        }
    }
}

const SUCCESS: &str = "success";

fn board_page(board: &str) -> String {
    format!("/b/{}", urlencoding::encode(board))
}

fn query_or_400<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

/// POST /api/threads/{board}
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Path(board): Path<String>,
    Payload(req): Payload<CreateThreadRequest>,
) -> Result<Redirect, ApiError> {
    state
        .service
        .create_thread(&board, &req.text, &req.delete_password)
        .await?;
    Ok(Redirect::to(&board_page(&board)))
}

/// GET /api/threads/{board}
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Path(board): Path<String>,
) -> Result<Json<Vec<ThreadSummary>>, ApiError> {
    let threads = state.service.list_recent_threads(&board).await?;
    Ok(Json(threads))
}

/// DELETE /api/threads/{board}
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(_board): Path<String>,
    Payload(req): Payload<DeleteThreadRequest>,
) -> Result<&'static str, ApiError> {
    let outcome = state
        .service
        .delete_thread(req.threadid, &req.delete_password)
        .await?;
    Ok(outcome.as_str())
}

/// PUT /api/threads/{board}
///
/// The thread id is taken from the body first, then the query string. An
/// unreadable body or a missing/malformed id still answers `success`.
pub async fn report_thread(
    State(state): State<Arc<AppState>>,
    Path(_board): Path<String>,
    query: Result<Query<ThreadRef>, QueryRejection>,
    body: Result<Payload<ThreadRef>, ApiError>,
) -> Result<&'static str, ApiError> {
    let from_body = body.ok().and_then(|Payload(r)| r.thread_id());
    let from_query = query.ok().and_then(|Query(r)| r.thread_id());

    match from_body.or(from_query) {
        Some(thread_id) => state.service.report_thread(thread_id).await?,
        None => debug!("report without a usable threadid ignored"),
    }
    Ok(SUCCESS)
}

/// POST /api/replies/{board}
pub async fn create_reply(
    State(state): State<Arc<AppState>>,
    Path(board): Path<String>,
    Payload(req): Payload<CreateReplyRequest>,
) -> Result<Redirect, ApiError> {
    state
        .service
        .create_reply(req.threadid, &req.text, &req.delete_password)
        .await?;
    Ok(Redirect::to(&format!("{}/{}", board_page(&board), req.threadid)))
}

/// GET /api/replies/{board}?threadid={thread_id}
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(_board): Path<String>,
    query: Result<Query<GetThreadQuery>, QueryRejection>,
) -> Result<Json<ThreadDetail>, ApiError> {
    let query = query_or_400(query)?;
    let thread = state.service.get_thread(query.threadid).await?;
    Ok(Json(thread))
}

/// DELETE /api/replies/{board}
pub async fn delete_reply(
    State(state): State<Arc<AppState>>,
    Path(_board): Path<String>,
    Payload(req): Payload<DeleteReplyRequest>,
) -> Result<&'static str, ApiError> {
    let outcome = state
        .service
        .delete_reply(req.threadid, req.replyid, &req.delete_password)
        .await?;
    Ok(outcome.as_str())
}

/// PUT /api/replies/{board}
pub async fn report_reply(
    State(state): State<Arc<AppState>>,
    Path(_board): Path<String>,
    Payload(req): Payload<ReportReplyRequest>,
) -> Result<&'static str, ApiError> {
    state.service.report_reply(req.threadid, req.replyid).await?;
    Ok(SUCCESS)
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Result<&'static str, ApiError> {
    state.service.health().await?;
    Ok("OK")
}
