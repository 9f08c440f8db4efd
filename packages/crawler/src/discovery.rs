//! LLM-backed seed discovery.
//!
//! One completion call asks for foundation sites as a JSON array; the
//! response is decoded tolerantly, deduplicated, and dead links are pruned
//! with the reachability probe. Discovery is best-effort: any failure
//! degrades to an empty list.

use std::collections::HashSet;

use crate::decode::decode_array;
use crate::gate::ReachabilityProbe;
use crate::llm::TextCompleter;
use crate::prompts::DISCOVER_SEEDS_PROMPT;
use crate::types::SeedCandidate;

/// Discovers crawl seeds through the completion capability.
pub struct SeedDiscovery<C: TextCompleter> {
    completer: C,
    probe: ReachabilityProbe,
    probe_enabled: bool,
}

impl<C: TextCompleter> SeedDiscovery<C> {
    pub fn new(completer: C) -> Self {
        Self {
            completer,
            probe: ReachabilityProbe::new(),
            probe_enabled: true,
        }
    }

    /// Skip the liveness probe (tests, offline runs).
    pub fn without_probe(mut self) -> Self {
        self.probe_enabled = false;
        self
    }

    /// Ask the model for foundation sites worth crawling.
    pub async fn discover(&self) -> Vec<SeedCandidate> {
        let response = match self.completer.complete(DISCOVER_SEEDS_PROMPT).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "seed discovery completion failed");
                return Vec::new();
            }
        };

        let candidates: Vec<SeedCandidate> = match decode_array(&response) {
            Some(candidates) => candidates,
            None => {
                tracing::warn!("seed discovery response carried no JSON array");
                return Vec::new();
            }
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut seeds = Vec::new();
        for candidate in candidates {
            let url = candidate.url.trim().to_string();
            if url.is_empty() || !seen.insert(url.clone()) {
                continue;
            }
            if self.probe_enabled && !self.probe.is_reachable(&url).await {
                tracing::debug!(url = %url, "discovered seed unreachable, dropping");
                continue;
            }
            seeds.push(SeedCandidate {
                foundation: candidate.foundation,
                url,
            });
        }

        tracing::info!(seeds = seeds.len(), "seed discovery finished");
        seeds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCompleter;

    #[tokio::test]
    async fn test_discovers_and_dedupes_seeds() {
        let completer = MockCompleter::new().with_default(
            r#"Here are some foundations:
            [{"foundation": "A Foundation", "url": "https://a.org"},
             {"foundation": "A Foundation again", "url": "https://a.org"},
             {"foundation": "B Foundation", "url": "https://b.org"}]"#,
        );
        let discovery = SeedDiscovery::new(completer).without_probe();
        let seeds = discovery.discover().await;
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].url, "https://a.org");
        assert_eq!(seeds[1].url, "https://b.org");
    }

    #[tokio::test]
    async fn test_unparseable_response_yields_empty() {
        let completer = MockCompleter::new().with_default("I could not find any sites.");
        let discovery = SeedDiscovery::new(completer).without_probe();
        assert!(discovery.discover().await.is_empty());
    }

    #[tokio::test]
    async fn test_completion_failure_yields_empty() {
        let completer = MockCompleter::new().with_failure("JSON");
        let discovery = SeedDiscovery::new(completer).without_probe();
        assert!(discovery.discover().await.is_empty());
    }
}
