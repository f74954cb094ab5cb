//! Data normalizer: raw customer values -> presentation-ready strings.
//!
//! Each field carries a processing rule per rendering context (speech vs
//! on-screen text). Rules are a closed enum matched exhaustively; bad input
//! data never aborts a row, it degrades to the sanitized-text fallback.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::field_mapping::{FieldMapping, MappingSet};
use crate::sanitize::{sanitize_text, title_case};
use crate::words;

/// Default honorific appended by the `name_respect` rule.
pub const DEFAULT_HONORIFIC: &str = "Ji";

/// Rendering context a field is being normalized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderContext {
    /// Values substituted into the voiceover script
    Audio,
    /// Values drawn as overlay text
    Video,
}

/// Declared rule name in a mapping document.
///
/// Unknown names deserialize to [`RuleKind::Sanitize`], matching the
/// fall-through behavior for unconfigured fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Name,
    NameRespect,
    Ordinal,
    Float,
    Percentage,
    Percentile,
    PercentageReadout,
    PercentileReadout,
    Integer,
    CurrencyInr,
    #[serde(other)]
    Sanitize,
}

/// A processing rule with its parameters resolved from the field mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingRule {
    Name,
    NameRespect { honorific: String },
    Ordinal,
    Float { round_to: u32 },
    Percentage { round_to: u32 },
    Percentile { round_to: u32 },
    PercentageReadout { round_to: u32 },
    PercentileReadout { round_to: u32 },
    Integer,
    CurrencyInr,
    Sanitize,
}

impl ProcessingRule {
    /// Resolve the rule for one field in one rendering context.
    pub fn for_field(mapping: &FieldMapping, context: RenderContext) -> Self {
        let kind = match context {
            RenderContext::Audio => mapping.audio_processing,
            RenderContext::Video => mapping.video_processing,
        };
        match kind.unwrap_or(RuleKind::Sanitize) {
            RuleKind::Name => Self::Name,
            RuleKind::NameRespect => Self::NameRespect {
                honorific: mapping
                    .honorific
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HONORIFIC.to_string()),
            },
            RuleKind::Ordinal => Self::Ordinal,
            RuleKind::Float => Self::Float {
                round_to: mapping.round_to.unwrap_or(2),
            },
            RuleKind::Percentage => Self::Percentage {
                round_to: mapping.round_to.unwrap_or(0),
            },
            RuleKind::Percentile => Self::Percentile {
                round_to: mapping.round_to.unwrap_or(0),
            },
            RuleKind::PercentageReadout => Self::PercentageReadout {
                round_to: mapping.round_to.unwrap_or(0),
            },
            RuleKind::PercentileReadout => Self::PercentileReadout {
                round_to: mapping.round_to.unwrap_or(0),
            },
            RuleKind::Integer => Self::Integer,
            RuleKind::CurrencyInr => Self::CurrencyInr,
            RuleKind::Sanitize => Self::Sanitize,
        }
    }
}

/// Field name -> rendered string, for one rendering context.
pub type NormalizedFields = BTreeMap<String, String>;

/// Normalize every raw field of a customer row for the given context.
///
/// Fields without a mapping entry fall through to the sanitizer. Malformed
/// values (e.g. a non-numeric string under a numeric rule) are sanitized
/// instead, with a warning; they never abort the row.
pub fn normalize(
    raw: &BTreeMap<String, String>,
    mapping: &MappingSet,
    context: RenderContext,
) -> NormalizedFields {
    let mut out = NormalizedFields::new();
    for (field, value) in raw {
        let rule = mapping
            .get(field)
            .map(|m| ProcessingRule::for_field(m, context))
            .unwrap_or(ProcessingRule::Sanitize);
        out.insert(field.clone(), apply_rule(&rule, field, value));
    }
    out
}

fn apply_rule(rule: &ProcessingRule, field: &str, value: &str) -> String {
    match rule {
        ProcessingRule::Name => join_first_names(value, None),
        ProcessingRule::NameRespect { honorific } => join_first_names(value, Some(honorific)),
        ProcessingRule::Ordinal => match parse_ordinal_base(value) {
            Some(n) => words::ordinal(n),
            None => fallback(field, value),
        },
        ProcessingRule::Float { round_to } => match value.trim().parse::<f64>() {
            Ok(v) => format!("{:.*}", *round_to as usize, v),
            Err(_) => fallback(field, value),
        },
        ProcessingRule::Percentage { round_to } => match parse_percent(value) {
            Some(v) => format!("{:.*}%", *round_to as usize, v),
            None => fallback(field, value),
        },
        ProcessingRule::Percentile { round_to } => match parse_percent(value) {
            Some(v) => format!("{:.*}%ile", *round_to as usize, v),
            None => fallback(field, value),
        },
        ProcessingRule::PercentageReadout { round_to } => match parse_percent(value) {
            Some(v) => format!("{} percent", number_readout(v, *round_to)),
            None => fallback(field, value),
        },
        ProcessingRule::PercentileReadout { round_to } => match parse_percent(value) {
            Some(v) => format!("{} percentile", number_readout(v, *round_to)),
            None => fallback(field, value),
        },
        ProcessingRule::Integer => value.trim().to_string(),
        ProcessingRule::CurrencyInr => match value.trim().parse::<f64>() {
            Ok(v) => format_inr(v.round() as i64),
            Err(_) => fallback(field, value),
        },
        ProcessingRule::Sanitize => sanitize_text(value),
    }
}

fn fallback(field: &str, value: &str) -> String {
    warn!(field = %field, "value does not match its processing rule, sanitizing instead");
    sanitize_text(value)
}

/// `"Asha Mehta|Ravi Mehta"` -> `"Asha and Ravi"`, English list conjunction.
///
/// With an honorific, it is appended to the last name in the phrase.
fn join_first_names(value: &str, honorific: Option<&str>) -> String {
    let names: Vec<String> = value
        .split('|')
        .filter_map(|name| {
            name.split_whitespace()
                .next()
                .map(|first| title_case(first))
        })
        .collect();

    let suffix = honorific.map(|h| format!(" {}", h)).unwrap_or_default();
    match names.as_slice() {
        [] => String::new(),
        [only] => format!("{}{}", only, suffix),
        [a, b] => format!("{} and {}{}", a, b, suffix),
        [head @ .., last] => format!("{}, and {}{}", head.join(", "), last, suffix),
    }
}

/// Strip an existing ordinal suffix ("15th" -> 15) by keeping digits only.
fn parse_ordinal_base(value: &str) -> Option<u64> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Strip a literal `%` sign if present and parse the remainder.
fn parse_percent(value: &str) -> Option<f64> {
    value.trim().trim_end_matches('%').trim().parse().ok()
}

/// Spoken form of a rounded number: whole values become words, fractional
/// survivors keep their digits.
fn number_readout(value: f64, round_to: u32) -> String {
    let factor = 10f64.powi(round_to as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.fract() == 0.0 && rounded >= 0.0 {
        words::cardinal(rounded as u64)
    } else {
        format!("{:.*}", round_to as usize, rounded)
    }
}

/// Indian-style digit grouping with a rupee sign: 1234567 -> `₹12,34,567`.
fn format_inr(amount: i64) -> String {
    let (sign, magnitude) = if amount < 0 {
        ("-", amount.unsigned_abs())
    } else {
        ("", amount.unsigned_abs())
    };
    let digits = magnitude.to_string();
    if digits.len() <= 3 {
        return format!("{}₹{}", sign, digits);
    }
    let (rest, last_three) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let rest_bytes = rest.as_bytes();
    let mut idx = rest_bytes.len();
    while idx > 0 {
        let start = idx.saturating_sub(2);
        groups.push(std::str::from_utf8(&rest_bytes[start..idx]).unwrap());
        idx = start;
    }
    groups.reverse();
    format!("{}₹{},{}", sign, groups.join(","), last_three)
}
