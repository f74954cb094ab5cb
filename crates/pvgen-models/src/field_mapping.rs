//! Field mapping configuration.
//!
//! A mapping set ties logical field names to source columns and declares how
//! each field is rendered for the audio and video contexts. Exactly one field
//! must be marked primary; its value keys idempotency and file naming.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::normalize::RuleKind;

/// Errors raised while validating a mapping set.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("no field is marked primary in the mapping set")]
    NoPrimaryField,

    #[error("multiple primary fields detected: '{first}' and '{second}'")]
    MultiplePrimaryFields { first: String, second: String },
}

/// How one logical field maps onto the customer sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Source column in the customer sheet
    pub column_name: String,
    /// Whether this field is the per-customer identifier
    #[serde(
        rename = "IsPrimary",
        default,
        deserialize_with = "de_flexible_bool"
    )]
    pub is_primary: bool,
    /// Rule applied when rendering for speech
    #[serde(default)]
    pub audio_processing: Option<RuleKind>,
    /// Rule applied when rendering for on-screen text
    #[serde(default)]
    pub video_processing: Option<RuleKind>,
    /// Rounding precision for numeric rules
    #[serde(default)]
    pub round_to: Option<u32>,
    /// Honorific suffix for the `name_respect` rule
    #[serde(default)]
    pub honorific: Option<String>,
}

/// A keyed mapping document: logical field name -> mapping.
pub type MappingSet = BTreeMap<String, FieldMapping>;

/// Find the unique primary field of a mapping set.
///
/// Zero or more than one primary field is a fatal configuration error.
pub fn find_primary_field(mapping: &MappingSet) -> Result<&str, MappingError> {
    let mut primary: Option<&str> = None;
    for (field, entry) in mapping {
        if entry.is_primary {
            if let Some(first) = primary {
                return Err(MappingError::MultiplePrimaryFields {
                    first: first.to_string(),
                    second: field.clone(),
                });
            }
            primary = Some(field);
        }
    }
    primary.ok_or(MappingError::NoPrimaryField)
}

/// Accepts `true`/`false` as well as the string forms `"True"`/`"False"`
/// found in hand-edited mapping documents.
fn de_flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Text(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Text(s) => Ok(s.eq_ignore_ascii_case("true")),
    }
}
