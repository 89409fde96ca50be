//! Pasta Stock Management - backend engine
//!
//! Stock-ledger and order-intake engine for a small fresh-pasta producer.
//! Clients order products in kilograms or in trays; production replenishes
//! stock in trays; the engine reconciles initial stock, production entries
//! and order lines into a per-product net-stock snapshot through each
//! product's declared tray/kilogram conversion factor.
//!
//! This crate is the engine only: front-facing shells (web UI, exporters,
//! printers) call the services here and format their output themselves.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

/// Initialize tracing for shells and tests that embed the engine.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pasta_stock_backend=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
