//! Client registry service

use serde::Deserialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::{map_unique_violation, AppError, AppResult};
use shared::models::Client;
use shared::validation::{normalize_code, validate_name};

/// Client service for managing the client registry
#[derive(Clone)]
pub struct ClientService {
    db: SqlitePool,
}

/// Input for creating a client
#[derive(Debug, Deserialize)]
pub struct CreateClientInput {
    pub code: Option<String>,
    pub name: String,
}

/// Row mapped at the store boundary
#[derive(Debug, FromRow)]
struct ClientRow {
    id: i64,
    code: Option<String>,
    name: String,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            code: row.code,
            name: row.name,
        }
    }
}

impl ClientService {
    /// Create a new ClientService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Register a client
    pub async fn create_client(&self, input: CreateClientInput) -> AppResult<Client> {
        let name = input.name.trim().to_string();
        if validate_name(&name).is_err() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
                message_it: "Il nome è obbligatorio".to_string(),
            });
        }
        let code = normalize_code(input.code.as_deref());

        let row = sqlx::query_as::<_, ClientRow>(
            "INSERT INTO clients (code, name) VALUES (?1, ?2) RETURNING id, code, name",
        )
        .bind(&code)
        .bind(&name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "client"))?;

        tracing::debug!(client_id = row.id, "client created");
        Ok(row.into())
    }

    /// List all clients sorted by name
    pub async fn list_clients(&self) -> AppResult<Vec<Client>> {
        let rows =
            sqlx::query_as::<_, ClientRow>("SELECT id, code, name FROM clients ORDER BY name")
                .fetch_all(&self.db)
                .await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    /// Get a client by id
    pub async fn get_client(&self, client_id: i64) -> AppResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>("SELECT id, code, name FROM clients WHERE id = ?1")
            .bind(client_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        Ok(row.into())
    }

    /// Delete a client. Refused while any order references it.
    pub async fn delete_client(&self, client_id: i64) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients WHERE id = ?1")
            .bind(client_id)
            .fetch_one(&self.db)
            .await?;

        if exists == 0 {
            return Err(AppError::NotFound("Client".to_string()));
        }

        let order_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE client_id = ?1")
                .bind(client_id)
                .fetch_one(&self.db)
                .await?;

        if order_count > 0 {
            return Err(AppError::ReferentialConflict {
                resource: "client".to_string(),
                message: format!("Cannot delete client: {} orders reference it", order_count),
                message_it: format!(
                    "Impossibile eliminare: il cliente ha {} ordini registrati",
                    order_count
                ),
            });
        }

        sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(client_id)
            .execute(&self.db)
            .await?;

        tracing::debug!(client_id, "client deleted");
        Ok(())
    }
}
