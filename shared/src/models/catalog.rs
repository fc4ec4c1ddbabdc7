//! Catalog models: item types, batches, and items
//!
//! The catalog hierarchy is Category -> ItemType -> ItemBatch -> Item.
//! An ItemBatch is a production run of a type tagged with a short year
//! code; an Item is one concrete stock-keeping unit (type + year + size
//! + optional color) with a unique human-readable code.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::levels::SizeStockLevels;

/// A configurable product definition.
///
/// If `has_color` is true, `available_colors` is non-empty; if `has_size`
/// is true and no sizes are configured, `available_sizes` defaults to
/// `["Standard"]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemType {
    pub type_id: Uuid,
    pub category_id: Uuid,
    pub type_name: String,
    pub description: Option<String>,
    pub has_size: bool,
    pub available_sizes: Vec<String>,
    pub has_color: bool,
    pub available_colors: Vec<String>,
    pub min_stock_level: Option<i32>,
    pub max_stock_level: Option<i32>,
    pub size_stock_levels: Option<SizeStockLevels>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl ItemType {
    /// Sizes to generate items for, honoring the `["Standard"]` default
    /// when sizing is enabled but unconfigured.
    pub fn effective_sizes(&self) -> Vec<String> {
        if !self.has_size {
            return Vec::new();
        }
        if self.available_sizes.is_empty() {
            vec!["Standard".to_string()]
        } else {
            self.available_sizes.clone()
        }
    }
}

/// A production run of an item type, unique per (type, year_code).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemBatch {
    pub batch_id: Uuid,
    pub type_id: Uuid,
    pub year_code: String,
    pub batch_name: Option<String>,
    pub specifications: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

/// One concrete stock-keeping unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub item_id: Uuid,
    pub batch_id: Uuid,
    pub item_code: String,
    pub item_name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub unit_type: Option<String>,
    pub qr_code: Option<String>,
    pub barcode: Option<String>,
    pub unit_price: Option<Decimal>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
}
