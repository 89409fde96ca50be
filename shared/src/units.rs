//! Tray/kilogram unit conversion
//!
//! Production is always counted in trays; order lines may be entered in
//! either trays or kilograms. Every consumer of a quantity goes through the
//! conversions in this module, using the product's declared `kg_per_tray`
//! factor.

use serde::{Deserialize, Serialize};

/// Unit an order-line quantity was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    /// Kilograms
    Kg,
    /// Tray units
    Unit,
}

impl UnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Kg => "kg",
            UnitType::Unit => "unit",
        }
    }

    /// Parse one of the two accepted tags. Anything else is rejected.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "kg" => Some(UnitType::Kg),
            "unit" => Some(UnitType::Unit),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Convert an entered quantity to tray units.
///
/// Kilogram quantities divide by the product's `kg_per_tray` factor; tray
/// quantities pass through unchanged. A non-positive (or NaN) factor yields
/// `0.0` trays instead of failing: the read path tolerates a malformed
/// product record rather than aborting a whole warehouse view. The zeroing
/// is lossy and intentional; callers must not re-interpret it as real stock.
pub fn to_trays(quantity: f64, unit: UnitType, kg_per_tray: f64) -> f64 {
    match unit {
        UnitType::Unit => quantity,
        UnitType::Kg => {
            if kg_per_tray > 0.0 {
                quantity / kg_per_tray
            } else {
                0.0
            }
        }
    }
}

/// Convert tray units to kilograms.
pub fn to_kilograms(trays: f64, kg_per_tray: f64) -> f64 {
    trays * kg_per_tray
}

/// Normalize an entered quantity to the `(kilograms, trays)` pair that
/// report and checklist rows carry.
///
/// The entered side is kept verbatim; only the other side is derived, so a
/// kilogram line against a malformed factor still reports its kilograms
/// while its tray side degrades to `0.0` per [`to_trays`].
pub fn normalize(quantity: f64, unit: UnitType, kg_per_tray: f64) -> (f64, f64) {
    match unit {
        UnitType::Kg => (quantity, to_trays(quantity, unit, kg_per_tray)),
        UnitType::Unit => (to_kilograms(quantity, kg_per_tray), quantity),
    }
}
