//! Database models for the Pasta Stock Management engine
//!
//! Re-exports models from the shared crate; view and input structs live
//! with the service that owns them.

pub use shared::models::*;
