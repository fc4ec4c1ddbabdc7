//! HTTP handlers for notification endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Notification;
use crate::services::notification::{
    CreateNotificationInput, NotificationListQuery, NotificationService,
};
use crate::AppState;

/// Count of alerts created by a scan
#[derive(Debug, Serialize)]
pub struct ScanResult {
    pub alerts_created: i64,
}

/// Count response for unread notifications
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Count of notifications updated in bulk
#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub updated: i64,
}

/// Get notifications for the current user
pub async fn list_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<NotificationListQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let service = NotificationService::new(state.db);
    let notifications = service
        .list_notifications(current_user.0.user_id, query)
        .await?;
    Ok(Json(notifications))
}

/// Get count of unread notifications
pub async fn get_unread_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UnreadCountResponse>> {
    let service = NotificationService::new(state.db);
    let count = service.unread_count(current_user.0.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Create a notification (admin only)
pub async fn create_notification(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateNotificationInput>,
) -> AppResult<Json<Notification>> {
    current_user.0.require_admin()?;

    let service = NotificationService::new(state.db);
    let notification = service.create_notification(input).await?;
    Ok(Json(notification))
}

/// Mark a notification as read
pub async fn mark_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<Notification>> {
    let service = NotificationService::new(state.db);
    let notification = service
        .mark_as_read(current_user.0.user_id, notification_id)
        .await?;
    Ok(Json(notification))
}

/// Mark all notifications as read for the current user
pub async fn mark_all_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UpdatedResponse>> {
    let service = NotificationService::new(state.db);
    let updated = service.mark_all_as_read(current_user.0.user_id).await?;
    Ok(Json(UpdatedResponse { updated }))
}

/// Delete a notification
pub async fn delete_notification(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let service = NotificationService::new(state.db);
    service
        .delete_notification(current_user.0.user_id, notification_id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Generate stock alerts for low/out-of-stock inventory (admin only)
pub async fn scan_stock_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ScanResult>> {
    current_user.0.require_admin()?;

    let service = NotificationService::new(state.db);
    let alerts_created = service.scan_stock_alerts().await?;
    Ok(Json(ScanResult { alerts_created }))
}

/// Generate a pending check-in alert if boxes are waiting (admin only)
pub async fn scan_pending_checkin(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ScanResult>> {
    current_user.0.require_admin()?;

    let service = NotificationService::new(state.db);
    let alerts_created = service.scan_pending_checkin().await?;
    Ok(Json(ScanResult { alerts_created }))
}
