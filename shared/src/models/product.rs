//! Product catalog models

use serde::{Deserialize, Serialize};

/// A product in the catalog
///
/// `kg_per_tray` is the declared conversion factor between the discrete
/// tray unit and kilograms; the unit converter is only well-defined while
/// it is positive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub code: Option<String>,
    /// Unique display name
    pub name: String,
    /// Kilograms represented by one tray of this product
    pub kg_per_tray: f64,
    /// Stock on hand (in trays) when the ledger started
    pub initial_stock_trays: f64,
}
