//! Inventory ledger models
//!
//! An `Inventory` row is the current stock of one item at one store; a
//! `StockTransaction` is one append-only ledger entry. Quantities on
//! transactions are always positive magnitudes; direction is implied by
//! the type and by which store field is populated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    BoxCheckin,
    StockIn,
    StockOut,
    TransferOut,
    TransferIn,
    Adjustment,
    Return,
    Damage,
    Disposal,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::BoxCheckin => "box_checkin",
            TransactionType::StockIn => "stock_in",
            TransactionType::StockOut => "stock_out",
            TransactionType::TransferOut => "transfer_out",
            TransactionType::TransferIn => "transfer_in",
            TransactionType::Adjustment => "adjustment",
            TransactionType::Return => "return",
            TransactionType::Damage => "damage",
            TransactionType::Disposal => "disposal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "box_checkin" => Some(TransactionType::BoxCheckin),
            "stock_in" => Some(TransactionType::StockIn),
            "stock_out" => Some(TransactionType::StockOut),
            "transfer_out" => Some(TransactionType::TransferOut),
            "transfer_in" => Some(TransactionType::TransferIn),
            "adjustment" => Some(TransactionType::Adjustment),
            "return" => Some(TransactionType::Return),
            "damage" => Some(TransactionType::Damage),
            "disposal" => Some(TransactionType::Disposal),
            _ => None,
        }
    }
}

/// Current stock of one item at one store.
///
/// A new row is created for every box check-in rather than merging into
/// an existing row for the same (item, store); that preserves box
/// traceability at the cost of multiple rows per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub inventory_id: Uuid,
    pub item_id: Uuid,
    pub store_id: Uuid,
    pub quantity: i32,
    pub reserved_quantity: i32,
    /// Always `quantity - reserved_quantity`; computed by storage, never
    /// independently settable.
    pub available_quantity: i32,
    pub min_level: i32,
    pub max_level: i32,
    pub location_in_store: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One append-only ledger entry recording a stock movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransaction {
    pub transaction_id: Uuid,
    pub item_id: Uuid,
    pub from_store_id: Option<Uuid>,
    pub to_store_id: Option<Uuid>,
    pub transaction_type: String,
    pub quantity: i32,
    pub box_id: Option<Uuid>,
    pub reference_number: Option<String>,
    pub reference_type: Option<String>,
    pub employee_name: Option<String>,
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Available quantity for a (quantity, reserved) pair, floored at zero.
pub fn available_quantity(quantity: i32, reserved: i32) -> i32 {
    (quantity - reserved).max(0)
}
