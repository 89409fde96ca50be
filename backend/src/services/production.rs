//! Production ledger service
//!
//! Append-only record of tray-replenishment events. Production is always
//! counted in trays; the log view derives the kilogram equivalent through
//! the product's conversion factor.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::error::{AppError, AppResult};
use shared::models::ProductionEntry;
use shared::units::to_kilograms;

/// Production service for recording and listing replenishment events
#[derive(Clone)]
pub struct ProductionService {
    db: SqlitePool,
}

/// Input for recording a production entry
#[derive(Debug, Deserialize)]
pub struct RecordProductionInput {
    pub product_id: i64,
    /// Defaults to today when omitted
    pub entry_date: Option<NaiveDate>,
    pub trays_produced: f64,
}

/// Production log row with product identity and kilogram equivalent
#[derive(Debug, Clone, Serialize)]
pub struct ProductionLogEntry {
    pub id: i64,
    pub entry_date: NaiveDate,
    pub product_id: i64,
    pub product_name: String,
    pub product_code: Option<String>,
    pub trays_produced: f64,
    pub kilograms: f64,
}

/// Row mapped at the store boundary
#[derive(Debug, FromRow)]
struct ProductionEntryRow {
    id: i64,
    entry_date: NaiveDate,
    product_id: i64,
    trays_produced: f64,
}

impl From<ProductionEntryRow> for ProductionEntry {
    fn from(row: ProductionEntryRow) -> Self {
        ProductionEntry {
            id: row.id,
            entry_date: row.entry_date,
            product_id: row.product_id,
            trays_produced: row.trays_produced,
        }
    }
}

/// Log row before the kilogram equivalent is derived
#[derive(Debug, FromRow)]
struct LogRow {
    id: i64,
    entry_date: NaiveDate,
    product_id: i64,
    product_name: String,
    product_code: Option<String>,
    trays_produced: f64,
    kg_per_tray: f64,
}

impl ProductionService {
    /// Create a new ProductionService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Record a replenishment event
    pub async fn record_production(
        &self,
        input: RecordProductionInput,
    ) -> AppResult<ProductionEntry> {
        if !input.trays_produced.is_finite() || input.trays_produced <= 0.0 {
            return Err(AppError::Validation {
                field: "trays_produced".to_string(),
                message: "Trays produced must be greater than 0".to_string(),
                message_it: "Le vaschette devono essere maggiori di 0".to_string(),
            });
        }

        let product_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE id = ?1")
                .bind(input.product_id)
                .fetch_one(&self.db)
                .await?;

        if product_exists == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let entry_date = input.entry_date.unwrap_or_else(|| Utc::now().date_naive());

        let row = sqlx::query_as::<_, ProductionEntryRow>(
            "INSERT INTO production_entries (entry_date, product_id, trays_produced) \
             VALUES (?1, ?2, ?3) \
             RETURNING id, entry_date, product_id, trays_produced",
        )
        .bind(entry_date)
        .bind(input.product_id)
        .bind(input.trays_produced)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!(
            entry_id = row.id,
            product_id = row.product_id,
            "production recorded"
        );
        Ok(row.into())
    }

    /// Production log with product identity, newest first
    pub async fn list_production(&self) -> AppResult<Vec<ProductionLogEntry>> {
        let rows = sqlx::query_as::<_, LogRow>(
            "SELECT pe.id, pe.entry_date, pe.product_id, \
                    p.name AS product_name, p.code AS product_code, \
                    pe.trays_produced, p.kg_per_tray \
             FROM production_entries pe \
             JOIN products p ON p.id = pe.product_id \
             ORDER BY pe.entry_date DESC, pe.id DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProductionLogEntry {
                id: row.id,
                entry_date: row.entry_date,
                product_id: row.product_id,
                product_name: row.product_name,
                product_code: row.product_code,
                trays_produced: row.trays_produced,
                kilograms: to_kilograms(row.trays_produced, row.kg_per_tray),
            })
            .collect())
    }
}
