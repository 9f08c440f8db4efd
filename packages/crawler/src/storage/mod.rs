//! Result sink: persistence seam for enriched records.

mod memory;
mod postgres;

pub use memory::MemorySink;
pub use postgres::PostgresSink;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::types::{EnrichedRecord, WelfareService};

/// A service row joined with its category list, as served by the read API.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ServiceWithCategories {
    #[serde(flatten)]
    pub service: WelfareService,
    pub categories: Vec<String>,
}

/// Idempotent sink for enriched records.
///
/// Upserts are keyed by the deterministic service id, so repeated pipeline
/// runs over the same source page converge on one row. Categories are
/// replaced wholesale on re-classification; blank category tokens are
/// skipped. Category rows are only written after the parent service row
/// write succeeds.
#[async_trait]
pub trait ServiceSink: Send + Sync {
    async fn upsert(&self, service: &WelfareService, categories: &[String]) -> Result<(), SinkError>;

    async fn list_services(&self) -> Result<Vec<ServiceWithCategories>, SinkError>;
}

/// Persist every enriched record, skipping individual failures.
///
/// Returns the number of records stored. A failed upsert is logged and the
/// record skipped; processing continues.
pub async fn persist_records<S: ServiceSink>(sink: &S, records: &[EnrichedRecord]) -> usize {
    let mut stored = 0;
    for record in records {
        let service = WelfareService::from_record(record);
        match sink.upsert(&service, &record.categories).await {
            Ok(()) => stored += 1,
            Err(e) => {
                tracing::warn!(link = %service.link, error = %e, "failed to store service");
            }
        }
    }
    tracing::info!(stored = stored, total = records.len(), "persisted enriched records");
    stored
}
