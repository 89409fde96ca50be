//! Validation rules for catalog intake and order intake
//!
//! Pure functions only; the backend services translate the `&'static str`
//! rejections into their error taxonomy.

use serde::Deserialize;

use crate::units::UnitType;

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a required display name (client or product)
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name is required");
    }
    Ok(())
}

/// Normalize an optional external code: trimmed, blank becomes `None`
pub fn normalize_code(code: Option<&str>) -> Option<String> {
    match code {
        Some(c) => {
            let trimmed = c.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        None => None,
    }
}

/// Validate a tray-to-kilogram conversion factor
pub fn validate_conversion_factor(kg_per_tray: f64) -> Result<(), &'static str> {
    if !kg_per_tray.is_finite() {
        return Err("Conversion factor must be a number");
    }
    if kg_per_tray <= 0.0 {
        return Err("Conversion factor must be greater than 0");
    }
    Ok(())
}

/// Validate an initial stock level
///
/// Negative values are accepted; they occur as data-entry anomalies and the
/// ledger carries them through rather than masking them.
pub fn validate_initial_stock(trays: f64) -> Result<(), &'static str> {
    if !trays.is_finite() {
        return Err("Initial stock must be a number");
    }
    Ok(())
}

// ============================================================================
// Order Intake
// ============================================================================

/// One candidate order line as entered, before any validation.
///
/// Quantities arrive as raw text; operators type decimal commas ("2,5") as
/// often as decimal points.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrderLine {
    pub product_id: Option<i64>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

/// An order line that survived intake filtering
#[derive(Debug, Clone, PartialEq)]
pub struct ValidOrderLine {
    pub product_id: i64,
    pub quantity: f64,
    pub unit: UnitType,
}

/// Parse a raw quantity string, tolerating a decimal comma
pub fn parse_quantity(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(q) if q.is_finite() => Some(q),
        _ => None,
    }
}

/// Filter candidate order lines down to the valid ones.
///
/// A line is dropped (never the whole order) when the product is
/// unspecified, the quantity is unspecified or fails to parse, the parsed
/// quantity is not greater than zero, or the unit tag is not one of
/// `kg`/`unit`. A line with neither product nor quantity is an empty form
/// row and is skipped the same way.
pub fn filter_order_lines(lines: &[RawOrderLine]) -> Vec<ValidOrderLine> {
    let mut valid = Vec::new();

    for line in lines {
        let Some(product_id) = line.product_id else {
            continue;
        };
        let Some(raw_quantity) = line.quantity.as_deref() else {
            continue;
        };
        let Some(quantity) = parse_quantity(raw_quantity) else {
            continue;
        };
        if quantity <= 0.0 {
            continue;
        }
        let Some(unit) = line.unit.as_deref().and_then(UnitType::from_str) else {
            continue;
        };

        valid.push(ValidOrderLine {
            product_id,
            quantity,
            unit,
        });
    }

    valid
}
