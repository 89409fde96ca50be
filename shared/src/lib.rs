//! Shared domain types for the Pasta Stock Management engine
//!
//! This crate contains the pure core shared between the backend engine and
//! any front-facing shell: entity models, the tray/kilogram unit converter,
//! and the order-intake validation rules. It performs no I/O.

pub mod models;
pub mod units;
pub mod validation;

pub use models::*;
pub use units::*;
pub use validation::*;
