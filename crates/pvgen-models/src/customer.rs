//! Customer records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One customer row, keyed by the primary field value.
///
/// Immutable after ingestion; the key doubles as the idempotency token and
/// the per-user file name stem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Primary field value
    pub key: String,
    /// Logical field name -> raw value, as read from the sheet
    pub fields: BTreeMap<String, String>,
}

impl CustomerRecord {
    pub fn new(key: impl Into<String>, fields: BTreeMap<String, String>) -> Self {
        Self {
            key: key.into(),
            fields,
        }
    }
}
