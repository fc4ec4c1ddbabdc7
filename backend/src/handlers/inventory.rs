//! HTTP handlers for inventory and stock transaction endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Inventory;
use crate::services::inventory::{
    BulkDeleteInput, BulkDeleteResult, InventoryListQuery, InventoryResponse, InventoryService,
    PostTransactionInput, TransactionListQuery, TransactionResponse,
};
use crate::AppState;

/// Post a stock transaction (stock_in, stock_out, transfer_out, ...)
pub async fn post_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<PostTransactionInput>,
) -> AppResult<Json<TransactionResponse>> {
    let service = InventoryService::new(state.db);
    let transaction = service
        .post_transaction(&current_user.0.username, input)
        .await?;
    Ok(Json(transaction))
}

/// List stock transactions with optional filtering
pub async fn list_transactions(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<TransactionListQuery>,
) -> AppResult<Json<Vec<TransactionResponse>>> {
    let service = InventoryService::new(state.db);
    let transactions = service.list_transactions(query).await?;
    Ok(Json(transactions))
}

/// List inventory rows with item/store context and box provenance
pub async fn list_inventory(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<InventoryListQuery>,
) -> AppResult<Json<Vec<InventoryResponse>>> {
    let service = InventoryService::new(state.db);
    let inventory = service.list_inventory(query).await?;
    Ok(Json(inventory))
}

/// Re-resolve an inventory row's thresholds from the catalog
pub async fn refresh_inventory_levels(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(inventory_id): Path<Uuid>,
) -> AppResult<Json<Inventory>> {
    let service = InventoryService::new(state.db);
    let inventory = service.refresh_levels(inventory_id).await?;
    Ok(Json(inventory))
}

/// Query parameters for inventory deletion
#[derive(Debug, Deserialize)]
pub struct DeleteInventoryQuery {
    #[serde(default)]
    pub force: bool,
}

/// Delete an inventory row
pub async fn delete_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(inventory_id): Path<Uuid>,
    Query(query): Query<DeleteInventoryQuery>,
) -> AppResult<StatusCode> {
    if query.force {
        current_user.0.require_force_delete()?;
    }

    let service = InventoryService::new(state.db);
    service.delete_inventory(inventory_id, query.force).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk delete inventory rows
pub async fn bulk_delete_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<BulkDeleteInput>,
) -> AppResult<Json<BulkDeleteResult>> {
    if input.force {
        current_user.0.require_force_delete()?;
    }

    let service = InventoryService::new(state.db);
    let result = service.bulk_delete(input).await?;
    Ok(Json(result))
}
