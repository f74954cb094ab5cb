//! Voiceover script generation.
//!
//! Fills `{field}` placeholders in each audio segment's speech text with the
//! audio-normalized customer values. The text is SSML: `<mark/>` tags placed
//! by the template author come back from synthesis as timepoints.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use pvgen_models::normalize::NormalizedFields;
use pvgen_models::AudioSegment;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// Fill placeholders in every segment's speech text.
///
/// A placeholder with no matching field stays in the text verbatim and is
/// reported with a warning; synthesis will read it aloud, which is visible
/// in review rather than silently dropped.
pub fn fill_script(
    key: &str,
    segments: &[AudioSegment],
    audio_fields: &NormalizedFields,
) -> Vec<AudioSegment> {
    let filled: Vec<AudioSegment> = segments
        .iter()
        .map(|segment| {
            let mut text = segment.speech_text.clone();
            for (field, value) in audio_fields {
                text = text.replace(&format!("{{{}}}", field), value);
            }
            for leftover in unresolved_placeholders(&text) {
                warn!(user_key = %key, segment = %segment.segment_name, placeholder = %leftover,
                    "unresolved placeholder left in speech text");
            }
            AudioSegment {
                segment_name: segment.segment_name.clone(),
                speech_text: text,
            }
        })
        .collect();

    info!(user_key = %key, segments = filled.len(), "voiceover script generated");
    filled
}

/// Placeholder names still present in a filled text.
pub fn unresolved_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(name: &str, text: &str) -> AudioSegment {
        AudioSegment {
            segment_name: name.to_string(),
            speech_text: text.to_string(),
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> NormalizedFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fill_replaces_all_occurrences() {
        let segments = vec![segment(
            "intro",
            "<speak>Hello {name}, yes you, {name}!<mark name=\"m1\"/></speak>",
        )];
        let fields = fields(&[("name", "Asha")]);
        let out = fill_script("u1", &segments, &fields);
        assert_eq!(
            out[0].speech_text,
            "<speak>Hello Asha, yes you, Asha!<mark name=\"m1\"/></speak>"
        );
    }

    #[test]
    fn test_unknown_placeholder_left_verbatim() {
        let segments = vec![segment("intro", "Your rank is {rank} in {city}")];
        let fields = fields(&[("city", "Pune")]);
        let out = fill_script("u1", &segments, &fields);
        assert_eq!(out[0].speech_text, "Your rank is {rank} in Pune");
    }

    #[test]
    fn test_unresolved_placeholder_detection() {
        assert_eq!(
            unresolved_placeholders("a {x} b {y z}"),
            vec!["x".to_string(), "y z".to_string()]
        );
        assert!(unresolved_placeholders("no placeholders here").is_empty());
    }

    #[test]
    fn test_segment_names_preserved() {
        let segments = vec![segment("part_one", "{a}"), segment("part_two", "{a}")];
        let out = fill_script("u1", &segments, &fields(&[("a", "1")]));
        assert_eq!(out[0].segment_name, "part_one");
        assert_eq!(out[1].segment_name, "part_two");
    }
}
