//! Order models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::units::UnitType;

/// An order header. Owns one or more order lines; an order with zero lines
/// never persists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub order_date: NaiveDate,
    pub client_id: i64,
}

/// One product/quantity entry within an order, in the unit it was entered in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// Always greater than zero
    pub quantity: f64,
    pub unit: UnitType,
}
