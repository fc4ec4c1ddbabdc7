//! Route definitions for the Warehouse Inventory Management System

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - catalog (batches and items)
        .nest("/batches", batch_routes())
        .nest("/items", item_routes())
        // Protected routes - receiving
        .nest("/boxes", box_routes())
        // Protected routes - inventory ledger
        .nest("/inventory", inventory_routes())
        .nest("/transactions", transaction_routes())
        // Protected routes - notifications
        .nest("/notifications", notification_routes())
}

/// Batch management routes (protected)
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches).post(handlers::create_batch))
        .route("/:batch_id", get(handlers::get_batch))
        .route("/:batch_id/items", get(handlers::get_batch_items))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Item routes (protected)
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items))
        .route("/:item_id", get(handlers::get_item))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Box receiving routes (protected)
fn box_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_boxes).post(handlers::receive_box))
        .route("/pending", get(handlers::get_pending_boxes))
        .route("/:box_id", get(handlers::get_box))
        .route("/:box_id/checkin", put(handlers::check_in_box))
        .route("/:box_id/inventory", get(handlers::get_box_inventory))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inventory))
        .route("/bulk-delete", post(handlers::bulk_delete_inventory))
        .route("/:inventory_id", delete(handlers::delete_inventory))
        .route(
            "/:inventory_id/refresh-levels",
            post(handlers::refresh_inventory_levels),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock transaction routes (protected)
fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_transactions).post(handlers::post_transaction),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Notification routes (protected)
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_notifications).post(handlers::create_notification),
        )
        .route("/unread-count", get(handlers::get_unread_count))
        .route("/read-all", put(handlers::mark_all_as_read))
        .route(
            "/:notification_id",
            delete(handlers::delete_notification),
        )
        .route("/:notification_id/read", put(handlers::mark_as_read))
        .route("/scan/stock-alerts", post(handlers::scan_stock_alerts))
        .route(
            "/scan/pending-checkin",
            post(handlers::scan_pending_checkin),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
