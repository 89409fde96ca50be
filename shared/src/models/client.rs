//! Client models

use serde::{Deserialize, Serialize};

/// A client the producer delivers to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: i64,
    /// Optional external label (accounting code, route code)
    pub code: Option<String>,
    /// Unique display name
    pub name: String,
}
