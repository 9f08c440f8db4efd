//! LLM prompts for the relevance pipeline.

use crate::types::CATEGORY_VOCABULARY;

/// Prompt for semantic verification of a collected page.
pub const VERIFY_PROMPT: &str = r#"The following was crawled from a corporate or foundation website.

Title: {title}

Text:
{excerpt}

Decide whether this is an actual welfare, scholarship, or support program
announcement or application page.

- If it clearly concerns applying for a welfare or scholarship program, output exactly "VALID".
- If it is unrelated, unclear, an advertisement, news, or other content, output exactly "INVALID".
- Output no other words or explanation."#;

/// Prompt for the 1-3 sentence program summary.
pub const SUMMARIZE_PROMPT: &str = r#"You summarize welfare program information precisely and concisely.

Read the title and text below and produce a 1-3 sentence summary covering
the target audience, the benefit provided, and the application method or
conditions where present. Output only the summary, nothing else.

Title: {title}
Text: {excerpt}"#;

/// Prompt for title generation and category tagging.
pub const TITLE_CATEGORY_PROMPT: &str = r#"From the welfare program summary below, generate:

- generated_title: a one-line title
- target_audience: the main audience served
- note: caveats or conditions worth knowing
- categories: tags drawn ONLY from this list: {vocabulary}

Output a single JSON object and nothing else:
{
    "generated_title": "...",
    "target_audience": "...",
    "note": "...",
    "categories": ["..."]
}

Summary:
{summary}"#;

/// Prompt for discovering foundation seed sites.
pub const DISCOVER_SEEDS_PROMPT: &str = r#"List corporate and private scholarship foundations that run welfare or
scholarship programs, excluding government portals. Return only a JSON
array, one entry per foundation:

[{"foundation": "name", "url": "https://..."}]"#;

pub fn format_verify_prompt(title: &str, excerpt: &str) -> String {
    VERIFY_PROMPT
        .replace("{title}", title)
        .replace("{excerpt}", excerpt)
}

pub fn format_summarize_prompt(title: &str, excerpt: &str) -> String {
    SUMMARIZE_PROMPT
        .replace("{title}", title)
        .replace("{excerpt}", excerpt)
}

pub fn format_title_category_prompt(summary: &str) -> String {
    TITLE_CATEGORY_PROMPT
        .replace("{vocabulary}", &CATEGORY_VOCABULARY.join(", "))
        .replace("{summary}", summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_filled() {
        let prompt = format_verify_prompt("My Title", "Some excerpt");
        assert!(prompt.contains("My Title"));
        assert!(prompt.contains("Some excerpt"));
        assert!(!prompt.contains("{title}"));
        assert!(!prompt.contains("{excerpt}"));
    }

    #[test]
    fn test_vocabulary_is_listed() {
        let prompt = format_title_category_prompt("a summary");
        assert!(prompt.contains("education"));
        assert!(prompt.contains("other"));
    }
}
