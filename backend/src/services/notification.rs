//! Notification service: stock alerts and in-app notifications
//!
//! Alert generation is synchronous and deduplicated: a scan never
//! creates a second unread alert for the same (item, store) payload key,
//! and at most one unread pending-checkin broadcast exists at a time.
//! Delivery and formatting beyond these rows belong to external systems.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    stock_alert_kind, Notification, NotificationStatus, NotificationType, PendingCheckinPayload,
    StockAlertPayload,
};

/// Notification service for alerts and notification management
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

/// Input for manually creating a notification
#[derive(Debug, Deserialize)]
pub struct CreateNotificationInput {
    pub user_id: Option<Uuid>,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub payload: Option<serde_json::Value>,
}

/// Query parameters for listing notifications
#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub unread_only: bool,
}

fn default_limit() -> i64 {
    50
}

const NOTIFICATION_COLUMNS: &str =
    "notification_id, user_id, type, title, message, status, link, payload, created_at, read_at";

/// Row for notification queries
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    notification_id: Uuid,
    user_id: Option<Uuid>,
    #[sqlx(rename = "type")]
    notification_type: String,
    title: String,
    message: String,
    status: String,
    link: Option<String>,
    payload: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
}

impl NotificationRow {
    fn into_model(self) -> Notification {
        Notification {
            notification_id: self.notification_id,
            user_id: self.user_id,
            notification_type: self.notification_type,
            title: self.title,
            message: self.message,
            status: self.status,
            link: self.link,
            payload: self.payload,
            created_at: self.created_at,
            read_at: self.read_at,
        }
    }
}

/// Row for the stock alert scan
#[derive(Debug, sqlx::FromRow)]
struct ScanRow {
    item_id: Uuid,
    store_id: Uuid,
    quantity: i32,
    min_level: i32,
    item_code: String,
    item_name: String,
    store_name: String,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Alert generation
    // ========================================================================

    /// Scan inventory for threshold breaches and emit deduplicated
    /// broadcast alerts. Returns the number of alerts created.
    pub async fn scan_stock_alerts(&self) -> AppResult<i64> {
        let rows = sqlx::query_as::<_, ScanRow>(
            r#"
            SELECT inv.item_id, inv.store_id, inv.quantity, inv.min_level,
                   i.item_code, i.item_name, s.store_name
            FROM inventory inv
            JOIN items i ON i.item_id = inv.item_id AND i.status = 'active'
            JOIN stores s ON s.store_id = inv.store_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut alerts_created = 0i64;
        for row in rows {
            let Some(kind) = stock_alert_kind(row.quantity, row.min_level) else {
                continue;
            };

            if self.unread_alert_exists(kind, row.item_id, row.store_id).await? {
                continue;
            }

            let (title, message, quantity) = match kind {
                NotificationType::OutOfStock => (
                    format!("Out of Stock: {}", row.item_name),
                    format!("{} is out of stock at {}", row.item_name, row.store_name),
                    None,
                ),
                _ => (
                    format!("Low Stock: {}", row.item_name),
                    format!(
                        "{} is running low ({} remaining) at {}",
                        row.item_name, row.quantity, row.store_name
                    ),
                    Some(row.quantity),
                ),
            };

            let payload = StockAlertPayload {
                item_id: row.item_id,
                store_id: row.store_id,
                item_code: row.item_code.clone(),
                quantity,
            };

            sqlx::query(
                r#"
                INSERT INTO notifications (user_id, type, title, message, status, link, payload)
                VALUES (NULL, $1, $2, $3, 'unread', $4, $5)
                "#,
            )
            .bind(kind.as_str())
            .bind(&title)
            .bind(&message)
            .bind(format!(
                "/inventory?item_id={}&store_id={}",
                row.item_id, row.store_id
            ))
            .bind(serde_json::to_value(&payload).map_err(anyhow::Error::from)?)
            .execute(&self.db)
            .await?;

            alerts_created += 1;
        }

        Ok(alerts_created)
    }

    /// Emit at most one unread broadcast summarizing boxes waiting to be
    /// checked in. Returns the number of alerts created (0 or 1).
    pub async fn scan_pending_checkin(&self) -> AppResult<i64> {
        let box_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT box_id FROM boxes WHERE status = 'pending_checkin' ORDER BY created_at",
        )
        .fetch_all(&self.db)
        .await?;

        if box_ids.is_empty() {
            return Ok(0);
        }

        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notifications
                WHERE type = $1 AND status = $2)
            "#,
        )
        .bind(NotificationType::PendingCheckin.as_str())
        .bind(NotificationStatus::Unread.as_str())
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Ok(0);
        }

        let payload = PendingCheckinPayload {
            count: box_ids.len() as i64,
            box_ids,
        };

        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, type, title, message, status, link, payload)
            VALUES (NULL, $1, $2, $3, 'unread', '/receiving', $4)
            "#,
        )
        .bind(NotificationType::PendingCheckin.as_str())
        .bind(format!("{} Box(es) Pending Check-In", payload.count))
        .bind(format!(
            "You have {} box(es) waiting to be checked in",
            payload.count
        ))
        .bind(serde_json::to_value(&payload).map_err(anyhow::Error::from)?)
        .execute(&self.db)
        .await?;

        Ok(1)
    }

    /// Whether an unread alert of this kind already exists for the
    /// (item, store) payload key.
    async fn unread_alert_exists(
        &self,
        kind: NotificationType,
        item_id: Uuid,
        store_id: Uuid,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notifications
                WHERE type = $1 AND status = $2
                  AND payload->>'item_id' = $3 AND payload->>'store_id' = $4)
            "#,
        )
        .bind(kind.as_str())
        .bind(NotificationStatus::Unread.as_str())
        .bind(item_id.to_string())
        .bind(store_id.to_string())
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    // ========================================================================
    // Notification management
    // ========================================================================

    /// Manually create a notification.
    pub async fn create_notification(
        &self,
        input: CreateNotificationInput,
    ) -> AppResult<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            INSERT INTO notifications (user_id, type, title, message, status, link, payload)
            VALUES ($1, $2, $3, $4, 'unread', $5, $6)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(input.user_id)
        .bind(input.notification_type.as_str())
        .bind(&input.title)
        .bind(&input.message)
        .bind(&input.link)
        .bind(&input.payload)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_model())
    }

    /// Get notifications visible to a user (own plus broadcast).
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        query: NotificationListQuery,
    ) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE (user_id = $1 OR user_id IS NULL)
              AND (NOT $2 OR status = 'unread')
            ORDER BY created_at DESC
            OFFSET $3 LIMIT $4
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(query.unread_only)
        .bind(query.skip.max(0))
        .bind(query.limit.clamp(1, 100))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(NotificationRow::into_model).collect())
    }

    /// Count unread notifications visible to a user.
    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE (user_id = $1 OR user_id IS NULL) AND status = 'unread'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Mark one notification as read.
    pub async fn mark_as_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> AppResult<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            UPDATE notifications
            SET status = 'read', read_at = NOW()
            WHERE notification_id = $1 AND (user_id = $2 OR user_id IS NULL)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification".to_string()))?;

        Ok(row.into_model())
    }

    /// Mark all of a user's visible notifications as read. Returns the
    /// number updated.
    pub async fn mark_all_as_read(&self, user_id: Uuid) -> AppResult<i64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET status = 'read', read_at = NOW()
            WHERE (user_id = $1 OR user_id IS NULL) AND status = 'unread'
            "#,
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() as i64)
    }

    /// Delete a notification visible to the user.
    pub async fn delete_notification(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE notification_id = $1 AND (user_id = $2 OR user_id IS NULL)
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification".to_string()));
        }

        Ok(())
    }
}
