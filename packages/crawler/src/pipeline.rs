//! Relevance pipeline: LLM-backed verify → summarize → title/categorize.
//!
//! Records are processed independently; a stage failure is attached to the
//! affected record and never aborts the batch. Stage outputs are parsed
//! defensively (see [`crate::decode`]).

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::decode::{decode_object, scan_vocabulary};
use crate::error::CompletionError;
use crate::llm::TextCompleter;
use crate::prompts::{format_summarize_prompt, format_title_category_prompt, format_verify_prompt};
use crate::render::truncate_chars;
use crate::types::{EnrichedRecord, PageRecord, Verdict, CATCH_ALL_CATEGORY, CATEGORY_VOCABULARY};

/// Summary used when the model fails or returns nothing.
pub const SUMMARY_PLACEHOLDER: &str = "could not summarize";

/// Raw verifier text kept on an Unknown verdict is capped at this length.
const UNKNOWN_RAW_CAP: usize = 200;

lazy_static! {
    static ref VERDICT_TOKEN: Regex = Regex::new(r"\b(VALID|INVALID)\b").expect("static pattern");
}

/// Outcome of running one record through the pipeline.
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    /// Verified valid, summarized, and categorized.
    Enriched(EnrichedRecord),
    /// Verifier said Invalid or Unknown; nothing further ran.
    Rejected { url: String, verdict: Verdict },
    /// A stage failed outright; the error stays with this record.
    Failed { url: String, error: String },
    /// No content to process (render error or boilerplate-suppressed page).
    Skipped { url: String },
}

impl RecordOutcome {
    pub fn enriched(&self) -> Option<&EnrichedRecord> {
        match self {
            RecordOutcome::Enriched(record) => Some(record),
            _ => None,
        }
    }
}

/// Parsed output of the title/categorize stage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleAndCategories {
    #[serde(default)]
    pub generated_title: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Sequential LLM stages over collected page records.
pub struct RelevancePipeline<C: TextCompleter> {
    completer: C,
}

impl<C: TextCompleter> RelevancePipeline<C> {
    pub fn new(completer: C) -> Self {
        Self { completer }
    }

    /// Run every record through verify → summarize → categorize.
    ///
    /// Record order is preserved; no record's outcome depends on another's.
    pub async fn enrich(&self, records: &[PageRecord]) -> Vec<RecordOutcome> {
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            outcomes.push(self.process(record).await);
        }

        let accepted = outcomes.iter().filter(|o| o.enriched().is_some()).count();
        tracing::info!(
            records = records.len(),
            accepted = accepted,
            "relevance pipeline finished"
        );
        outcomes
    }

    async fn process(&self, record: &PageRecord) -> RecordOutcome {
        let url = record.url.clone();

        if !record.has_content() {
            return RecordOutcome::Skipped { url };
        }

        let verdict = match self.verify(&record.title, &record.excerpt).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "verification failed");
                return RecordOutcome::Failed {
                    url,
                    error: e.to_string(),
                };
            }
        };

        if !verdict.is_valid() {
            tracing::debug!(url = %url, verdict = ?verdict, "record rejected");
            return RecordOutcome::Rejected { url, verdict };
        }

        let summary = self.summarize(&record.title, &record.excerpt).await;
        let titled = self.title_and_categorize(&summary).await;

        RecordOutcome::Enriched(EnrichedRecord {
            url,
            generated_title: titled.generated_title,
            summary,
            categories: titled.categories,
            target_audience: titled.target_audience,
            note: titled.note,
        })
    }

    /// Semantic verification: is this a real program announcement?
    pub async fn verify(&self, title: &str, excerpt: &str) -> Result<Verdict, CompletionError> {
        let response = self
            .completer
            .complete(&format_verify_prompt(title, excerpt))
            .await?;
        Ok(parse_verdict(&response))
    }

    /// 1-3 sentence summary; degrades to a placeholder, never errors.
    pub async fn summarize(&self, title: &str, excerpt: &str) -> String {
        match self
            .completer
            .complete(&format_summarize_prompt(title, excerpt))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "summarization failed, using placeholder");
                SUMMARY_PLACEHOLDER.to_string()
            }
        }
    }

    /// Title + categories from the summary; falls back to a vocabulary scan
    /// of the summary text, then to the catch-all category. Never empty.
    pub async fn title_and_categorize(&self, summary: &str) -> TitleAndCategories {
        let response = match self
            .completer
            .complete(&format_title_category_prompt(summary))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "title/category completion failed, using fallback");
                return fallback_titled(summary);
            }
        };

        match decode_object::<TitleAndCategories>(&response) {
            Some(mut titled) => {
                titled.categories = clean_categories(titled.categories, summary);
                if titled.generated_title.trim().is_empty() {
                    titled.generated_title = first_line(summary);
                }
                titled
            }
            None => {
                tracing::debug!("title/category response was not JSON, scanning response text");
                // The model answered in prose; scan it before the summary.
                let mut titled = fallback_titled(&response);
                if titled.categories == [CATCH_ALL_CATEGORY] {
                    titled.categories = clean_categories(Vec::new(), summary);
                }
                titled.generated_title = first_line(summary);
                titled
            }
        }
    }
}

/// Normalize a verifier response to a definite verdict.
///
/// Exact token match first, then an embedded-token search anywhere in the
/// uppercased response; anything else is Unknown carrying the raw text.
pub fn parse_verdict(response: &str) -> Verdict {
    let upper = response.trim().to_uppercase();
    if upper == "VALID" {
        return Verdict::Valid;
    }
    if upper == "INVALID" {
        return Verdict::Invalid;
    }

    if let Some(m) = VERDICT_TOKEN.captures(&upper) {
        return match &m[1] {
            "VALID" => Verdict::Valid,
            _ => Verdict::Invalid,
        };
    }

    Verdict::Unknown(truncate_chars(response.trim(), UNKNOWN_RAW_CAP))
}

fn clean_categories(raw: Vec<String>, fallback_text: &str) -> Vec<String> {
    let mut categories: Vec<String> = raw
        .into_iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();
    categories.dedup();

    if categories.is_empty() {
        categories = scan_vocabulary(fallback_text, CATEGORY_VOCABULARY)
            .into_iter()
            .filter(|c| c != CATCH_ALL_CATEGORY)
            .collect();
    }
    if categories.is_empty() {
        categories.push(CATCH_ALL_CATEGORY.to_string());
    }
    categories
}

fn fallback_titled(text: &str) -> TitleAndCategories {
    TitleAndCategories {
        generated_title: first_line(text),
        target_audience: String::new(),
        note: String::new(),
        categories: clean_categories(Vec::new(), text),
    }
}

fn first_line(text: &str) -> String {
    truncate_chars(text.lines().next().unwrap_or("").trim(), 80)
}
