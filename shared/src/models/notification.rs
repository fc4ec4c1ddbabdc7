//! Notification models
//!
//! Notifications are deduplicated alert records. Stock alerts carry a
//! structured payload whose (item_id, store_id) pair is the dedup key;
//! pending-checkin alerts form a singleton class keyed by type alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    LowStock,
    OutOfStock,
    PendingCheckin,
    Transaction,
    System,
    Info,
    Warning,
    Error,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::LowStock => "low_stock",
            NotificationType::OutOfStock => "out_of_stock",
            NotificationType::PendingCheckin => "pending_checkin",
            NotificationType::Transaction => "transaction",
            NotificationType::System => "system",
            NotificationType::Info => "info",
            NotificationType::Warning => "warning",
            NotificationType::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low_stock" => Some(NotificationType::LowStock),
            "out_of_stock" => Some(NotificationType::OutOfStock),
            "pending_checkin" => Some(NotificationType::PendingCheckin),
            "transaction" => Some(NotificationType::Transaction),
            "system" => Some(NotificationType::System),
            "info" => Some(NotificationType::Info),
            "warning" => Some(NotificationType::Warning),
            "error" => Some(NotificationType::Error),
            _ => None,
        }
    }
}

/// Read state of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Unread,
    Read,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Unread => "unread",
            NotificationStatus::Read => "read",
        }
    }
}

/// A notification row. `user_id` of `None` means broadcast to all users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: Uuid,
    pub user_id: Option<Uuid>,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub status: String,
    pub link: Option<String>,
    pub payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Structured payload of a stock alert; (item_id, store_id) is the
/// deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlertPayload {
    pub item_id: Uuid,
    pub store_id: Uuid,
    pub item_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

/// Structured payload of a pending-checkin alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCheckinPayload {
    pub count: i64,
    pub box_ids: Vec<Uuid>,
}

/// Alert classification for one inventory row: out-of-stock when the
/// quantity is exactly zero, low-stock when at or below the minimum
/// level, otherwise no alert.
pub fn stock_alert_kind(quantity: i32, min_level: i32) -> Option<NotificationType> {
    if quantity == 0 {
        Some(NotificationType::OutOfStock)
    } else if quantity <= min_level {
        Some(NotificationType::LowStock)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_kind_classification() {
        assert_eq!(stock_alert_kind(0, 50), Some(NotificationType::OutOfStock));
        assert_eq!(stock_alert_kind(30, 50), Some(NotificationType::LowStock));
        assert_eq!(stock_alert_kind(50, 50), Some(NotificationType::LowStock));
        assert_eq!(stock_alert_kind(51, 50), None);
    }
}
