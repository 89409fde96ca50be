//! Stock ledger calculator
//!
//! Reconciles the product catalog, the production ledger and the order
//! ledger into per-product net-stock snapshots. Every read recomputes from
//! current committed state; nothing here is cached or stored, so the
//! snapshot can never drift from the ledgers it is derived from.

use std::collections::HashMap;

use sqlx::{FromRow, SqlitePool};

use crate::error::{AppError, AppResult};
use crate::services::decode_unit;
use shared::models::{Product, StockSnapshot};
use shared::units::to_trays;

/// Stock service computing net-stock snapshots on demand
#[derive(Clone)]
pub struct StockService {
    db: SqlitePool,
}

/// Row mapped at the store boundary
#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    code: Option<String>,
    name: String,
    kg_per_tray: f64,
    initial_stock_trays: f64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            code: row.code,
            name: row.name,
            kg_per_tray: row.kg_per_tray,
            initial_stock_trays: row.initial_stock_trays,
        }
    }
}

/// Order-line row feeding the ordered-trays aggregate
#[derive(Debug, FromRow)]
struct OrderedRow {
    product_id: i64,
    quantity: f64,
    unit_type: String,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Snapshot every product, sorted by name.
    ///
    /// A product with a malformed conversion factor does not abort the
    /// read: its kilogram-typed lines normalize to 0 trays (a documented,
    /// lossy tolerance — the snapshot under-counts what was ordered for
    /// that product).
    pub async fn list_snapshots(&self) -> AppResult<Vec<StockSnapshot>> {
        let products: Vec<Product> = sqlx::query_as::<_, ProductRow>(
            "SELECT id, code, name, kg_per_tray, initial_stock_trays \
             FROM products ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

        let produced: HashMap<i64, f64> = sqlx::query_as::<_, (i64, f64)>(
            "SELECT product_id, SUM(trays_produced) \
             FROM production_entries GROUP BY product_id",
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .collect();

        let lines = sqlx::query_as::<_, OrderedRow>(
            "SELECT product_id, quantity, unit_type FROM order_lines",
        )
        .fetch_all(&self.db)
        .await?;

        let factors: HashMap<i64, f64> =
            products.iter().map(|p| (p.id, p.kg_per_tray)).collect();

        let mut ordered: HashMap<i64, f64> = HashMap::new();
        for line in lines {
            let unit = decode_unit(&line.unit_type)?;
            let factor = factors.get(&line.product_id).copied().unwrap_or(0.0);
            *ordered.entry(line.product_id).or_insert(0.0) +=
                to_trays(line.quantity, unit, factor);
        }

        Ok(products
            .iter()
            .map(|product| {
                StockSnapshot::compute(
                    product,
                    produced.get(&product.id).copied().unwrap_or(0.0),
                    ordered.get(&product.id).copied().unwrap_or(0.0),
                )
            })
            .collect())
    }

    /// Snapshot a single product
    pub async fn get_snapshot(&self, product_id: i64) -> AppResult<StockSnapshot> {
        let product: Product = sqlx::query_as::<_, ProductRow>(
            "SELECT id, code, name, kg_per_tray, initial_stock_trays \
             FROM products WHERE id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .map(Product::from)
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let produced = sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(trays_produced), 0.0) \
             FROM production_entries WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        let lines = sqlx::query_as::<_, OrderedRow>(
            "SELECT product_id, quantity, unit_type FROM order_lines WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        let mut ordered = 0.0;
        for line in lines {
            let unit = decode_unit(&line.unit_type)?;
            ordered += to_trays(line.quantity, unit, product.kg_per_tray);
        }

        Ok(StockSnapshot::compute(&product, produced, ordered))
    }
}
