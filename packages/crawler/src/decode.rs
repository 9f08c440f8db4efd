//! Tolerant decoding of structured data from free-form model text.
//!
//! Fallback ladder: exact parse → balanced-delimiter substring parse →
//! heuristic keyword scan → default sentinel. The ladder is unit-tested
//! against malformed, truncated, and prose-wrapped inputs so no live model
//! is needed to verify it.

use serde::de::DeserializeOwned;

/// Locate the first balanced `{...}` region, honoring string literals and
/// escapes.
pub fn first_json_object(text: &str) -> Option<&str> {
    first_balanced(text, '{', '}')
}

/// Locate the first balanced `[...]` region.
pub fn first_json_array(text: &str) -> Option<&str> {
    first_balanced(text, '[', ']')
}

fn first_balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode a JSON object of type `T` from model text: exact parse first,
/// then the first balanced object substring. `None` means the caller should
/// fall through to its heuristic.
pub fn decode_object<T: DeserializeOwned>(text: &str) -> Option<T> {
    if let Ok(value) = serde_json::from_str::<T>(text.trim()) {
        return Some(value);
    }
    first_json_object(text).and_then(|region| serde_json::from_str(region).ok())
}

/// Decode a JSON array of `T` the same way.
pub fn decode_array<T: DeserializeOwned>(text: &str) -> Option<Vec<T>> {
    if let Ok(value) = serde_json::from_str::<Vec<T>>(text.trim()) {
        return Some(value);
    }
    first_json_array(text).and_then(|region| serde_json::from_str(region).ok())
}

/// Heuristic keyword scan: every vocabulary term that occurs literally in
/// the text, case-insensitive, in vocabulary order.
pub fn scan_vocabulary(text: &str, vocabulary: &[&str]) -> Vec<String> {
    let lower = text.to_lowercase();
    vocabulary
        .iter()
        .filter(|term| lower.contains(&term.to_lowercase()))
        .map(|term| term.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Titled {
        generated_title: String,
        #[serde(default)]
        categories: Vec<String>,
    }

    #[test]
    fn test_exact_parse() {
        let text = r#"{"generated_title": "Spring Scholarship", "categories": ["education"]}"#;
        let parsed: Titled = decode_object(text).unwrap();
        assert_eq!(parsed.generated_title, "Spring Scholarship");
    }

    #[test]
    fn test_object_embedded_in_prose() {
        let text = "Sure! Here is the JSON you asked for:\n```json\n\
                    {\"generated_title\": \"Housing Aid\", \"categories\": [\"housing\"]}\n\
                    ```\nLet me know if you need anything else.";
        let parsed: Titled = decode_object(text).unwrap();
        assert_eq!(parsed.generated_title, "Housing Aid");
        assert_eq!(parsed.categories, vec!["housing"]);
    }

    #[test]
    fn test_braces_inside_strings_do_not_confuse_scan() {
        let text = r#"noise {"generated_title": "a } b { c", "categories": []} trailing"#;
        let parsed: Titled = decode_object(text).unwrap();
        assert_eq!(parsed.generated_title, "a } b { c");
    }

    #[test]
    fn test_truncated_object_yields_none() {
        let text = r#"{"generated_title": "Cut off mid-"#;
        assert!(decode_object::<Titled>(text).is_none());
    }

    #[test]
    fn test_plain_prose_yields_none() {
        assert!(decode_object::<Titled>("no structure here at all").is_none());
    }

    #[test]
    fn test_array_embedded_in_prose() {
        #[derive(Deserialize)]
        struct Site {
            url: String,
        }
        let text = "Found these:\n[{\"url\": \"https://a.org\"}, {\"url\": \"https://b.org\"}]\nDone.";
        let sites: Vec<Site> = decode_array(text).unwrap();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].url, "https://a.org");
    }

    #[test]
    fn test_scan_vocabulary_matches_literally() {
        let vocab = ["education", "housing", "other"];
        let found = scan_vocabulary("This program covers Education costs for tenants", &vocab);
        assert_eq!(found, vec!["education"]);
        assert!(scan_vocabulary("nothing relevant", &vocab[..2]).is_empty());
    }
}
