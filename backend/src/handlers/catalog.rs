//! HTTP handlers for catalog endpoints (batches and items)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::catalog::{
    BatchListQuery, BatchResponse, CatalogService, CreateBatchInput, ItemListQuery, ItemResponse,
};
use crate::AppState;

/// Create a year batch, pre-generating one item per configured size
pub async fn create_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateBatchInput>,
) -> AppResult<Json<BatchResponse>> {
    let service = CatalogService::new(state.db);
    let batch = service.create_batch(&current_user.0.username, input).await?;
    Ok(Json(batch))
}

/// List batches with optional filtering
pub async fn list_batches(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<BatchListQuery>,
) -> AppResult<Json<Vec<BatchResponse>>> {
    let service = CatalogService::new(state.db);
    let batches = service.list_batches(query).await?;
    Ok(Json(batches))
}

/// Get batch details
pub async fn get_batch(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<BatchResponse>> {
    let service = CatalogService::new(state.db);
    let batch = service.get_batch(batch_id).await?;
    Ok(Json(batch))
}

/// Get all items in a batch
pub async fn get_batch_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<Vec<ItemResponse>>> {
    let service = CatalogService::new(state.db);
    let items = service.get_batch_items(batch_id).await?;
    Ok(Json(items))
}

/// List items with optional filtering
pub async fn list_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ItemListQuery>,
) -> AppResult<Json<Vec<ItemResponse>>> {
    let service = CatalogService::new(state.db);
    let items = service.list_items(query).await?;
    Ok(Json(items))
}

/// Query parameters for a single item
#[derive(Debug, Deserialize)]
pub struct GetItemQuery {
    #[serde(default)]
    pub include_stock: bool,
}

/// Get a single item by id
pub async fn get_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Query(query): Query<GetItemQuery>,
) -> AppResult<Json<ItemResponse>> {
    let service = CatalogService::new(state.db);
    let item = service.get_item(item_id, query.include_stock).await?;
    Ok(Json(item))
}
