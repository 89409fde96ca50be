//! Derived stock views

use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::units::to_kilograms;

/// Net stock for one product, in trays and kilograms.
///
/// A snapshot is a pure function of current ledger contents: it is
/// recomputed on every read and never stored, so there is no running
/// balance that could drift.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockSnapshot {
    pub product_id: i64,
    pub product_code: Option<String>,
    pub product_name: String,
    pub kg_per_tray: f64,
    pub initial_trays: f64,
    pub produced_trays: f64,
    /// All ordered quantities for the product, normalized to trays
    pub ordered_trays: f64,
    pub net_trays: f64,
    pub net_kilograms: f64,
}

impl StockSnapshot {
    /// Assemble a snapshot from the product record and the two ledger
    /// aggregates. `ordered_trays` must already be normalized to trays.
    pub fn compute(product: &Product, produced_trays: f64, ordered_trays: f64) -> Self {
        let net_trays = product.initial_stock_trays + produced_trays - ordered_trays;
        StockSnapshot {
            product_id: product.id,
            product_code: product.code.clone(),
            product_name: product.name.clone(),
            kg_per_tray: product.kg_per_tray,
            initial_trays: product.initial_stock_trays,
            produced_trays,
            ordered_trays,
            net_trays,
            net_kilograms: to_kilograms(net_trays, product.kg_per_tray),
        }
    }
}
