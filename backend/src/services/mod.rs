//! Business logic services for the Warehouse Inventory Management System

pub mod catalog;
pub mod inventory;
pub mod notification;
pub mod receiving;
pub mod stock_levels;

pub use catalog::CatalogService;
pub use inventory::InventoryService;
pub use notification::NotificationService;
pub use receiving::ReceivingService;
