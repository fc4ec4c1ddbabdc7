//! Shared domain logic for the Warehouse Inventory Management System
//!
//! This crate contains the pure (I/O-free) core of the system: domain
//! models, code generation, stock-level resolution, box provenance
//! selection, and input validation. The backend crate wraps these with
//! persistence and HTTP.

pub mod codes;
pub mod levels;
pub mod models;
pub mod provenance;
pub mod validation;

pub use codes::*;
pub use levels::*;
pub use models::*;
pub use provenance::*;
pub use validation::*;
