//! Sales statistics service
//!
//! Aggregates the order ledger for the producer's dashboards: best-selling
//! products, biggest clients, monthly volume. All totals are normalized to
//! kilograms through each product's conversion factor so mixed-unit lines
//! aggregate consistently.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::AppResult;

/// Statistics service over the order ledger
#[derive(Clone)]
pub struct StatsService {
    db: SqlitePool,
}

/// Ordered volume for one product
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductSales {
    pub product_name: String,
    pub product_code: Option<String>,
    pub total_kilograms: f64,
}

/// Ordered volume for one client
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ClientSales {
    pub client_name: String,
    pub client_code: Option<String>,
    pub total_kilograms: f64,
}

/// Ordered volume for one calendar month ("YYYY-MM")
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MonthlySales {
    pub month: String,
    pub total_kilograms: f64,
}

impl StatsService {
    /// Create a new StatsService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Best-selling products by ordered kilograms
    pub async fn top_products(&self, limit: i64) -> AppResult<Vec<ProductSales>> {
        let rows = sqlx::query_as::<_, ProductSales>(
            "SELECT p.name AS product_name, p.code AS product_code, \
                    SUM(CASE WHEN ol.unit_type = 'kg' THEN ol.quantity \
                             ELSE ol.quantity * p.kg_per_tray END) AS total_kilograms \
             FROM order_lines ol \
             JOIN products p ON p.id = ol.product_id \
             GROUP BY p.id \
             ORDER BY total_kilograms DESC \
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Clients with the largest ordered volume
    pub async fn top_clients(&self, limit: i64) -> AppResult<Vec<ClientSales>> {
        let rows = sqlx::query_as::<_, ClientSales>(
            "SELECT c.name AS client_name, c.code AS client_code, \
                    SUM(CASE WHEN ol.unit_type = 'kg' THEN ol.quantity \
                             ELSE ol.quantity * p.kg_per_tray END) AS total_kilograms \
             FROM order_lines ol \
             JOIN orders o ON o.id = ol.order_id \
             JOIN clients c ON c.id = o.client_id \
             JOIN products p ON p.id = ol.product_id \
             GROUP BY c.id \
             ORDER BY total_kilograms DESC \
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Ordered volume per calendar month, oldest first
    pub async fn monthly_totals(&self) -> AppResult<Vec<MonthlySales>> {
        let rows = sqlx::query_as::<_, MonthlySales>(
            "SELECT strftime('%Y-%m', o.order_date) AS month, \
                    SUM(CASE WHEN ol.unit_type = 'kg' THEN ol.quantity \
                             ELSE ol.quantity * p.kg_per_tray END) AS total_kilograms \
             FROM order_lines ol \
             JOIN orders o ON o.id = ol.order_id \
             JOIN products p ON p.id = ol.product_id \
             GROUP BY month \
             ORDER BY month",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
