//! Product catalog service
//!
//! Owns product identity and the tray/kilogram conversion factor every
//! quantity computation depends on.

use serde::Deserialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::{map_unique_violation, AppError, AppResult};
use shared::models::Product;
use shared::validation::{
    normalize_code, validate_conversion_factor, validate_initial_stock, validate_name,
};

/// Product service for managing the catalog
#[derive(Clone)]
pub struct ProductService {
    db: SqlitePool,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub code: Option<String>,
    pub name: String,
    pub kg_per_tray: f64,
    /// Defaults to 0 when omitted
    pub initial_stock_trays: Option<f64>,
}

/// Input for updating a product; omitted fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductInput {
    pub code: Option<String>,
    pub name: Option<String>,
    pub kg_per_tray: Option<f64>,
    pub initial_stock_trays: Option<f64>,
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

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Add a product to the catalog
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        let name = input.name.trim().to_string();
        if validate_name(&name).is_err() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
                message_it: "Il nome del prodotto è obbligatorio".to_string(),
            });
        }

        if let Err(message) = validate_conversion_factor(input.kg_per_tray) {
            return Err(AppError::Validation {
                field: "kg_per_tray".to_string(),
                message: message.to_string(),
                message_it: "Kg per vaschetta non valido".to_string(),
            });
        }

        let initial_stock_trays = input.initial_stock_trays.unwrap_or(0.0);
        if let Err(message) = validate_initial_stock(initial_stock_trays) {
            return Err(AppError::Validation {
                field: "initial_stock_trays".to_string(),
                message: message.to_string(),
                message_it: "Giacenza iniziale non valida".to_string(),
            });
        }

        let code = normalize_code(input.code.as_deref());

        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (code, name, kg_per_tray, initial_stock_trays) \
             VALUES (?1, ?2, ?3, ?4) \
             RETURNING id, code, name, kg_per_tray, initial_stock_trays",
        )
        .bind(&code)
        .bind(&name)
        .bind(input.kg_per_tray)
        .bind(initial_stock_trays)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "product"))?;

        tracing::debug!(product_id = row.id, "product created");
        Ok(row.into())
    }

    /// List all products sorted by name
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, code, name, kg_per_tray, initial_stock_trays \
             FROM products ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by id
    pub async fn get_product(&self, product_id: i64) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, code, name, kg_per_tray, initial_stock_trays \
             FROM products WHERE id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Update a product. Direct edits are allowed even while ledger entries
    /// reference the product; snapshots pick up the new factor on the next
    /// read.
    pub async fn update_product(
        &self,
        product_id: i64,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        let existing = self.get_product(product_id).await?;

        let name = match input.name {
            Some(n) => n.trim().to_string(),
            None => existing.name,
        };
        if validate_name(&name).is_err() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
                message_it: "Il nome del prodotto è obbligatorio".to_string(),
            });
        }

        let kg_per_tray = input.kg_per_tray.unwrap_or(existing.kg_per_tray);
        if let Err(message) = validate_conversion_factor(kg_per_tray) {
            return Err(AppError::Validation {
                field: "kg_per_tray".to_string(),
                message: message.to_string(),
                message_it: "Kg per vaschetta non valido".to_string(),
            });
        }

        let initial_stock_trays = input
            .initial_stock_trays
            .unwrap_or(existing.initial_stock_trays);
        if let Err(message) = validate_initial_stock(initial_stock_trays) {
            return Err(AppError::Validation {
                field: "initial_stock_trays".to_string(),
                message: message.to_string(),
                message_it: "Giacenza iniziale non valida".to_string(),
            });
        }

        let code = match input.code {
            Some(c) => normalize_code(Some(&c)),
            None => existing.code,
        };

        let row = sqlx::query_as::<_, ProductRow>(
            "UPDATE products SET code = ?1, name = ?2, kg_per_tray = ?3, \
             initial_stock_trays = ?4 WHERE id = ?5 \
             RETURNING id, code, name, kg_per_tray, initial_stock_trays",
        )
        .bind(&code)
        .bind(&name)
        .bind(kg_per_tray)
        .bind(initial_stock_trays)
        .bind(product_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "product"))?;

        Ok(row.into())
    }

    /// Delete a product. Refused while any order line or production entry
    /// references it.
    pub async fn delete_product(&self, product_id: i64) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_one(&self.db)
            .await?;

        if exists == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let line_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_lines WHERE product_id = ?1")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        let production_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM production_entries WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if line_count + production_count > 0 {
            return Err(AppError::ReferentialConflict {
                resource: "product".to_string(),
                message: format!(
                    "Cannot delete product: {} order lines and {} production entries reference it",
                    line_count, production_count
                ),
                message_it: format!(
                    "Impossibile eliminare: il prodotto ha {} movimenti registrati",
                    line_count + production_count
                ),
            });
        }

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        tracing::debug!(product_id, "product deleted");
        Ok(())
    }
}
