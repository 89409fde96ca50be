//! Order ledger service
//!
//! Order intake is all-or-nothing: candidate lines are filtered first and
//! the header is only ever written together with at least one valid line,
//! in a single transaction. Every read view normalizes line quantities to
//! the (kilograms, trays) pair through the product's conversion factor.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::error::{AppError, AppResult};
use crate::services::decode_unit;
use shared::models::{Order, OrderLine};
use shared::units::normalize;
use shared::validation::{filter_order_lines, RawOrderLine};

/// Order service for intake, register views and deletion
#[derive(Clone)]
pub struct OrderService {
    db: SqlitePool,
}

/// Input for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub client_id: i64,
    /// Defaults to today when omitted
    pub order_date: Option<NaiveDate>,
    /// Candidate lines as entered; invalid ones are dropped per line
    pub lines: Vec<RawOrderLine>,
}

/// One order in the register, with client identity and aggregate totals
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderSummary {
    pub id: i64,
    pub order_date: NaiveDate,
    pub client_name: String,
    pub client_code: Option<String>,
    pub line_count: i64,
    pub total_kilograms: f64,
}

/// One line of an order, normalized to both units
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetailLine {
    pub product_name: String,
    pub product_code: Option<String>,
    pub kilograms: f64,
    pub trays: f64,
}

/// A full order with normalized lines and totals, for checklist consumers
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub id: i64,
    pub order_date: NaiveDate,
    pub client_name: String,
    pub client_code: Option<String>,
    pub lines: Vec<OrderDetailLine>,
    pub total_kilograms: f64,
    pub total_trays: f64,
}

/// One normalized order line for a delivery date, for load-list consumers
#[derive(Debug, Clone, Serialize)]
pub struct DailyLoadLine {
    pub client_name: String,
    pub client_code: Option<String>,
    pub product_name: String,
    pub product_code: Option<String>,
    pub kilograms: f64,
    pub trays: f64,
}

/// Row mapped at the store boundary
#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    order_date: NaiveDate,
    client_id: i64,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            order_date: row.order_date,
            client_id: row.client_id,
        }
    }
}

/// Row mapped at the store boundary
#[derive(Debug, FromRow)]
struct OrderLineRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: f64,
    unit_type: String,
}

/// Header row for detail views
#[derive(Debug, FromRow)]
struct OrderHeaderRow {
    id: i64,
    order_date: NaiveDate,
    client_name: String,
    client_code: Option<String>,
}

/// Line row joined with product identity and conversion factor
#[derive(Debug, FromRow)]
struct LineRow {
    quantity: f64,
    unit_type: String,
    product_name: String,
    product_code: Option<String>,
    kg_per_tray: f64,
}

/// Load-list row before normalization
#[derive(Debug, FromRow)]
struct LoadLineRow {
    client_name: String,
    client_code: Option<String>,
    product_name: String,
    product_code: Option<String>,
    quantity: f64,
    unit_type: String,
    kg_per_tray: f64,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Accept a candidate order.
    ///
    /// Invalid lines are dropped one by one; if no line survives, the whole
    /// order is rejected and nothing is written. Otherwise the header and
    /// the surviving lines commit in one transaction.
    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<Order> {
        let client_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients WHERE id = ?1")
                .bind(input.client_id)
                .fetch_one(&self.db)
                .await?;

        if client_exists == 0 {
            return Err(AppError::NotFound("Client".to_string()));
        }

        let valid = filter_order_lines(&input.lines);
        if valid.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "No valid order lines were entered".to_string(),
                message_it: "Nessuna riga valida inserita".to_string(),
            });
        }

        // Every surviving line must point at a real product; an unknown id
        // rejects the whole order before anything is written.
        for line in &valid {
            let product_exists =
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE id = ?1")
                    .bind(line.product_id)
                    .fetch_one(&self.db)
                    .await?;

            if product_exists == 0 {
                return Err(AppError::NotFound(format!("Product {}", line.product_id)));
            }
        }

        let order_date = input
            .order_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        let order: Order = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (order_date, client_id) VALUES (?1, ?2) \
             RETURNING id, order_date, client_id",
        )
        .bind(order_date)
        .bind(input.client_id)
        .fetch_one(&mut *tx)
        .await?
        .into();

        for line in &valid {
            sqlx::query(
                "INSERT INTO order_lines (order_id, product_id, quantity, unit_type) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(order_id = order.id, lines = valid.len(), "order created");
        Ok(order)
    }

    /// The stored lines of one order, in the unit each was entered in
    pub async fn get_order_lines(&self, order_id: i64) -> AppResult<Vec<OrderLine>> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE id = ?1")
            .bind(order_id)
            .fetch_one(&self.db)
            .await?;

        if exists == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }

        let rows = sqlx::query_as::<_, OrderLineRow>(
            "SELECT id, order_id, product_id, quantity, unit_type \
             FROM order_lines WHERE order_id = ?1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            lines.push(OrderLine {
                id: row.id,
                order_id: row.order_id,
                product_id: row.product_id,
                quantity: row.quantity,
                unit: decode_unit(&row.unit_type)?,
            });
        }

        Ok(lines)
    }

    /// Get one order with normalized lines and totals
    pub async fn get_order(&self, order_id: i64) -> AppResult<OrderDetail> {
        let header = sqlx::query_as::<_, OrderHeaderRow>(
            "SELECT o.id, o.order_date, c.name AS client_name, c.code AS client_code \
             FROM orders o \
             JOIN clients c ON c.id = o.client_id \
             WHERE o.id = ?1",
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let rows = sqlx::query_as::<_, LineRow>(
            "SELECT ol.quantity, ol.unit_type, p.name AS product_name, \
                    p.code AS product_code, p.kg_per_tray \
             FROM order_lines ol \
             JOIN products p ON p.id = ol.product_id \
             WHERE ol.order_id = ?1 \
             ORDER BY p.name",
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        let mut total_kilograms = 0.0;
        let mut total_trays = 0.0;

        for row in rows {
            let unit = decode_unit(&row.unit_type)?;
            let (kilograms, trays) = normalize(row.quantity, unit, row.kg_per_tray);
            total_kilograms += kilograms;
            total_trays += trays;
            lines.push(OrderDetailLine {
                product_name: row.product_name,
                product_code: row.product_code,
                kilograms,
                trays,
            });
        }

        Ok(OrderDetail {
            id: header.id,
            order_date: header.order_date,
            client_name: header.client_name,
            client_code: header.client_code,
            lines,
            total_kilograms,
            total_trays,
        })
    }

    /// Order register: every order with client identity, line count and
    /// total kilograms, newest first.
    pub async fn list_orders(&self) -> AppResult<Vec<OrderSummary>> {
        let summaries = sqlx::query_as::<_, OrderSummary>(
            "SELECT o.id, o.order_date, \
                    c.name AS client_name, c.code AS client_code, \
                    COUNT(ol.id) AS line_count, \
                    SUM(CASE WHEN ol.unit_type = 'kg' THEN ol.quantity \
                             ELSE ol.quantity * p.kg_per_tray END) AS total_kilograms \
             FROM orders o \
             JOIN clients c ON c.id = o.client_id \
             JOIN order_lines ol ON ol.order_id = o.id \
             JOIN products p ON p.id = ol.product_id \
             GROUP BY o.id, o.order_date, c.name, c.code \
             ORDER BY o.order_date DESC, o.id DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(summaries)
    }

    /// Normalized order lines for one delivery date, one row per line,
    /// sorted by client then product. Load-list and packing-list
    /// collaborators consume this view.
    pub async fn daily_load_lines(&self, date: NaiveDate) -> AppResult<Vec<DailyLoadLine>> {
        let rows = sqlx::query_as::<_, LoadLineRow>(
            "SELECT c.name AS client_name, c.code AS client_code, \
                    p.name AS product_name, p.code AS product_code, \
                    ol.quantity, ol.unit_type, p.kg_per_tray \
             FROM order_lines ol \
             JOIN orders o ON o.id = ol.order_id \
             JOIN clients c ON c.id = o.client_id \
             JOIN products p ON p.id = ol.product_id \
             WHERE o.order_date = ?1 \
             ORDER BY c.name, p.name",
        )
        .bind(date)
        .fetch_all(&self.db)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let unit = decode_unit(&row.unit_type)?;
            let (kilograms, trays) = normalize(row.quantity, unit, row.kg_per_tray);
            lines.push(DailyLoadLine {
                client_name: row.client_name,
                client_code: row.client_code,
                product_name: row.product_name,
                product_code: row.product_code,
                kilograms,
                trays,
            });
        }

        Ok(lines)
    }

    /// Full order details for one delivery date, sorted by client then
    /// order id. Checklist printers consume this view.
    pub async fn orders_for_date(&self, date: NaiveDate) -> AppResult<Vec<OrderDetail>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT o.id \
             FROM orders o \
             JOIN clients c ON c.id = o.client_id \
             WHERE o.order_date = ?1 \
             ORDER BY c.name, o.id",
        )
        .bind(date)
        .fetch_all(&self.db)
        .await?;

        let mut details = Vec::with_capacity(ids.len());
        for id in ids {
            details.push(self.get_order(id).await?);
        }

        Ok(details)
    }

    /// Delete an order together with all of its lines.
    pub async fn delete_order(&self, order_id: i64) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE id = ?1")
            .bind(order_id)
            .fetch_one(&self.db)
            .await?;

        if exists == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }

        // Lines go with the header in one transaction; an orphaned line
        // would corrupt every aggregate that joins orders to lines.
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM order_lines WHERE order_id = ?1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(order_id, "order deleted");
        Ok(())
    }
}
