//! Video template document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::audio::ScriptedSegment;
use crate::overlay::OverlayDefinition;

fn default_selection_key() -> String {
    "city".to_string()
}

/// Declarative description of one video variant family.
///
/// `backgrounds` is keyed first by selection attribute, then by attribute
/// value; each table should carry a `"default"` entry as its fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoTemplate {
    /// Customer attribute used to pick the background variant
    #[serde(default = "default_selection_key")]
    pub template_selection_key: String,
    /// selection key -> (attribute value -> background file name)
    pub backgrounds: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub overlays: Vec<OverlayDefinition>,
    #[serde(default)]
    pub audio_segments: Vec<ScriptedSegment>,
}

impl VideoTemplate {
    /// Background file name for a customer's attribute value, falling back
    /// to the table's declared default.
    pub fn background_for(&self, value: &str) -> Option<&str> {
        let table = self.backgrounds.get(&self.template_selection_key)?;
        table
            .get(value)
            .or_else(|| table.get("default"))
            .map(String::as_str)
    }

    /// The table's declared default, if any.
    pub fn default_background(&self) -> Option<&str> {
        self.backgrounds
            .get(&self.template_selection_key)?
            .get("default")
            .map(String::as_str)
    }
}
