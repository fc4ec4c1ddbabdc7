//! Receiving models: boxes and their declared contents
//!
//! A box is the unit of receiving: a physical shipment container whose
//! declared contents move into store inventory at check-in. Status moves
//! forward only: pending_checkin -> checked_in -> stocked_out.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a received box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxStatus {
    PendingCheckin,
    CheckedIn,
    StockedOut,
}

impl BoxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoxStatus::PendingCheckin => "pending_checkin",
            BoxStatus::CheckedIn => "checked_in",
            BoxStatus::StockedOut => "stocked_out",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending_checkin" => Some(BoxStatus::PendingCheckin),
            "checked_in" => Some(BoxStatus::CheckedIn),
            "stocked_out" => Some(BoxStatus::StockedOut),
            _ => None,
        }
    }

    /// Whether a transition to `next` is a legal forward step.
    pub fn can_transition_to(&self, next: BoxStatus) -> bool {
        matches!(
            (self, next),
            (BoxStatus::PendingCheckin, BoxStatus::CheckedIn)
                | (BoxStatus::CheckedIn, BoxStatus::StockedOut)
        )
    }
}

/// A physical shipment container from a supplier.
///
/// Named `StockBox` to keep the prelude's `Box` unambiguous in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockBox {
    pub box_id: Uuid,
    pub box_code: String,
    pub qr_code: Option<String>,
    pub supplier: Option<String>,
    pub po_number: Option<String>,
    pub do_number: Option<String>,
    pub invoice_number: Option<String>,
    pub store_id: Option<Uuid>,
    pub location_in_store: Option<String>,
    pub status: String,
    pub received_date: Option<NaiveDate>,
    pub received_by: Option<String>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_in_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A (box, item, quantity) declaration created at receive time.
/// `quantity` is immutable; `remaining` decreases as stock-out
/// transactions consume the box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxContent {
    pub content_id: Uuid,
    pub box_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub remaining: i32,
    pub created_at: DateTime<Utc>,
}
