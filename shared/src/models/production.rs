//! Production ledger models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tray-replenishment event. Production is always counted in trays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductionEntry {
    pub id: i64,
    pub entry_date: NaiveDate,
    pub product_id: i64,
    /// Always greater than zero
    pub trays_produced: f64,
}
