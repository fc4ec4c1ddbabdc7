//! HTTP handlers for receiving endpoints (boxes and check-in)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::receiving::{
    BoxInventoryEntry, BoxListQuery, BoxResponse, BoxWithContents, CheckInInput, ReceiveBoxInput,
    ReceivingService,
};
use crate::AppState;

/// Receive a new box from a supplier
pub async fn receive_box(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ReceiveBoxInput>,
) -> AppResult<Json<BoxWithContents>> {
    let service = ReceivingService::new(state.db);
    let stock_box = service.receive_box(&current_user.0.username, input).await?;
    Ok(Json(stock_box))
}

/// List boxes with optional filtering
pub async fn list_boxes(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<BoxListQuery>,
) -> AppResult<Json<Vec<BoxResponse>>> {
    let service = ReceivingService::new(state.db);
    let boxes = service.list_boxes(query).await?;
    Ok(Json(boxes))
}

/// Pagination parameters for pending box listing
#[derive(Debug, Deserialize)]
pub struct PendingBoxQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Get all boxes waiting to be checked in
pub async fn get_pending_boxes(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<PendingBoxQuery>,
) -> AppResult<Json<Vec<BoxWithContents>>> {
    let service = ReceivingService::new(state.db);
    let boxes = service.get_pending_boxes(query.skip, query.limit).await?;
    Ok(Json(boxes))
}

/// Get box details with contents
pub async fn get_box(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(box_id): Path<Uuid>,
) -> AppResult<Json<BoxWithContents>> {
    let service = ReceivingService::new(state.db);
    let stock_box = service.get_box(box_id).await?;
    Ok(Json(stock_box))
}

/// Check a box into a store
pub async fn check_in_box(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(box_id): Path<Uuid>,
    Json(input): Json<CheckInInput>,
) -> AppResult<Json<BoxResponse>> {
    let service = ReceivingService::new(state.db);
    let stock_box = service
        .check_in_box(box_id, &current_user.0.username, input)
        .await?;
    Ok(Json(stock_box))
}

/// Get the inventory rows created from a box's check-in
pub async fn get_box_inventory(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(box_id): Path<Uuid>,
) -> AppResult<Json<Vec<BoxInventoryEntry>>> {
    let service = ReceivingService::new(state.db);
    let inventory = service.get_box_inventory(box_id).await?;
    Ok(Json(inventory))
}
