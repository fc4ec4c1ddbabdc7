//! Database models for the Warehouse Inventory Management System
//!
//! Re-exports models from the shared crate and adds backend-specific models

pub use shared::models::*;
