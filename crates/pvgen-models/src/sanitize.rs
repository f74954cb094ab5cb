//! Free-text sanitization for the default processing rule.

use unicode_normalization::UnicodeNormalization;

/// Sanitize arbitrary customer text for display or speech.
///
/// Decodes HTML entities, applies NFKC normalization, strips control
/// characters, collapses whitespace runs and title-cases the result.
/// Never fails; garbage in degrades to a clean (possibly empty) string.
pub fn sanitize_text(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);
    let normalized: String = decoded.nfkc().collect();
    let printable: String = normalized.chars().filter(|c| !c.is_control()).collect();
    let collapsed = printable.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&collapsed)
}

/// Title-case each whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_entities_and_title_cases() {
        assert_eq!(sanitize_text("tom &amp; jerry"), "Tom & Jerry");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(sanitize_text("  hello \t\n world  "), "Hello World");
    }

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(sanitize_text("ab\u{0000}c\u{0007}"), "Abc");
    }

    #[test]
    fn test_unicode_normalization() {
        // Full-width forms fold to ASCII under NFKC
        assert_eq!(sanitize_text("ＡＢＣ"), "Abc");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_text(""), "");
        assert_eq!(sanitize_text("   "), "");
    }
}
