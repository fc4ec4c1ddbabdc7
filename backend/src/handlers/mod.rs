//! HTTP handlers for the Warehouse Inventory Management System

pub mod catalog;
pub mod health;
pub mod inventory;
pub mod notification;
pub mod receiving;

pub use catalog::*;
pub use health::*;
pub use inventory::*;
pub use notification::*;
pub use receiving::*;
