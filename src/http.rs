//! REST surface over the catalog operations.

use std::net::SocketAddr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{
    categories, items,
    model::{Category, Item, ItemDetail, ItemSummary},
    state::AppState,
    util::dispatch_async_app_result,
    AppError, ErrorKind,
};

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::FORBIDDEN,
            ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.kind().status();
        if status.is_server_error() {
            self.log_with_event("http_request_failed");
        }
        (status, Json(self)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, AppError>;

/// Request bodies must be JSON objects; anything else validates as empty.
fn body_fields(body: Value) -> Map<String, Value> {
    match body {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{id}", axum::routing::delete(delete_category))
        .route("/api/inventoryItems", axum::routing::post(create_item))
        .route("/api/inventoryItems/fetchAllItems", get(list_all_items))
        .route("/api/inventoryItems/fetchAllItems/", get(list_all_items))
        .route(
            "/api/inventoryItems/fetchAllItems/{category_id}",
            get(list_items_in_category),
        )
        .route(
            "/api/inventoryItems/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let pool = state.pool_clone();
    dispatch_async_app_result(|| async move { categories::list_categories(&pool).await })
        .await
        .map(Json)
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Category> {
    let pool = state.pool_clone();
    dispatch_async_app_result(|| async move { categories::delete_category(&pool, &id).await })
        .await
        .map(Json)
}

async fn fetch_items(pool: SqlitePool, category_id: Option<String>) -> ApiResult<Vec<ItemSummary>> {
    dispatch_async_app_result(|| async move {
        items::list_items_vec(&pool, category_id.as_deref()).await
    })
    .await
    .map(Json)
}

async fn list_all_items(State(state): State<AppState>) -> ApiResult<Vec<ItemSummary>> {
    fetch_items(state.pool_clone(), None).await
}

async fn list_items_in_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> ApiResult<Vec<ItemSummary>> {
    fetch_items(state.pool_clone(), Some(category_id)).await
}

async fn get_item(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ItemDetail> {
    let pool = state.pool_clone();
    dispatch_async_app_result(|| async move { items::get_item(&pool, &id).await })
        .await
        .map(Json)
}

/// Answers `200 OK` with the stored item.
async fn create_item(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult<Item> {
    let pool = state.pool_clone();
    let fields = body_fields(body);
    dispatch_async_app_result(|| async move { items::create_item(&pool, &fields).await })
        .await
        .map(Json)
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Item> {
    let pool = state.pool_clone();
    let fields = body_fields(body);
    dispatch_async_app_result(|| async move { items::update_item(&pool, &id, &fields).await })
        .await
        .map(Json)
}

async fn delete_item(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Item> {
    let pool = state.pool_clone();
    dispatch_async_app_result(|| async move { items::delete_item(&pool, &id).await })
        .await
        .map(Json)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, pool: SqlitePool) -> anyhow::Result<()> {
    let app = router(AppState::new(pool));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(target: "catalog", event = "http_listening", addr = %listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!(target: "catalog", event = "http_stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "catalog", event = "signal_listen_failed", error = %err);
        std::future::pending::<()>().await;
    }
}
