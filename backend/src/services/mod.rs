//! Business logic services for the Pasta Stock Management engine
//!
//! One service per concern; each holds a clone of the shared pool.

use shared::units::UnitType;

use crate::error::{AppError, AppResult};

pub mod client;
pub mod order;
pub mod product;
pub mod production;
pub mod stats;
pub mod stock;

pub use client::ClientService;
pub use order::OrderService;
pub use product::ProductService;
pub use production::ProductionService;
pub use stats::StatsService;
pub use stock::StockService;

/// Decode a stored unit tag. The schema CHECK-constrains the column to the
/// two accepted tags, so a miss here means the store was edited out of band.
pub(crate) fn decode_unit(tag: &str) -> AppResult<UnitType> {
    UnitType::from_str(tag).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("unit tag '{tag}' stored outside kg/unit"))
    })
}
