//! Welfare program crawler.
//!
//! Crawls corporate/foundation websites breadth-first, filters boilerplate,
//! verifies and summarizes surviving pages through a text-completion
//! capability, and persists structured service records.
//!
//! # Pipeline
//!
//! 1. [`FrontierWalker`] walks a site from a seed URL: URL gate, headless
//!    render, boilerplate suppression, same-origin link discovery.
//! 2. [`RelevancePipeline`] runs collected records through verify →
//!    summarize → title/categorize, independently per record.
//! 3. A [`ServiceSink`] upserts the survivors under deterministic ids.
//!
//! # Usage
//!
//! ```rust,ignore
//! use welfare_crawler::{
//!     BrowserRenderer, FrontierWalker, GeminiClient, MemorySink,
//!     RelevancePipeline, RenderConfig, persist_records,
//! };
//!
//! let renderer = BrowserRenderer::launch(RenderConfig::default()).await?;
//! let walker = FrontierWalker::new(renderer);
//! let report = walker.crawl("https://foundation.example.org", 2).await?;
//!
//! let pipeline = RelevancePipeline::new(GeminiClient::from_env()?);
//! let outcomes = pipeline.enrich(&report.data).await;
//!
//! let accepted: Vec<_> = outcomes.iter().filter_map(|o| o.enriched().cloned()).collect();
//! persist_records(&MemorySink::new(), &accepted).await;
//! ```

pub mod boilerplate;
pub mod browser;
pub mod config;
pub mod decode;
pub mod discovery;
pub mod error;
pub mod frontier;
pub mod gate;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod render;
pub mod storage;
pub mod testing;
pub mod types;

// Re-export the crate surface at the root
pub use boilerplate::BoilerplateFilter;
pub use browser::BrowserRenderer;
pub use config::{CrawlConfig, RenderConfig};
pub use discovery::SeedDiscovery;
pub use error::{CompletionError, CrawlError, RenderError, SinkError};
pub use frontier::FrontierWalker;
pub use gate::{ReachabilityProbe, UrlGate};
pub use llm::{GeminiClient, TextCompleter};
pub use pipeline::{parse_verdict, RecordOutcome, RelevancePipeline, TitleAndCategories};
pub use render::{Renderer, RenderedPage};
pub use storage::{persist_records, MemorySink, PostgresSink, ServiceSink, ServiceWithCategories};
pub use types::{
    CrawlReport, CrawlTarget, EnrichedRecord, PageRecord, SeedCandidate, StopReason, Verdict,
    WelfareService, CATCH_ALL_CATEGORY, CATEGORY_VOCABULARY,
};
