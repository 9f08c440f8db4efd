//! In-memory sink for testing and development.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{ServiceSink, ServiceWithCategories};
use crate::error::SinkError;
use crate::types::WelfareService;

/// Sink that keeps services in memory. Data is lost on restart.
#[derive(Default)]
pub struct MemorySink {
    services: RwLock<BTreeMap<String, ServiceWithCategories>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service_count(&self) -> usize {
        self.services.read().unwrap().len()
    }

    pub fn get(&self, service_id: &str) -> Option<ServiceWithCategories> {
        self.services.read().unwrap().get(service_id).cloned()
    }
}

#[async_trait]
impl ServiceSink for MemorySink {
    async fn upsert(&self, service: &WelfareService, categories: &[String]) -> Result<(), SinkError> {
        let categories: Vec<String> = categories
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        self.services.write().unwrap().insert(
            service.service_id.clone(),
            ServiceWithCategories {
                service: service.clone(),
                categories,
            },
        );
        Ok(())
    }

    async fn list_services(&self) -> Result<Vec<ServiceWithCategories>, SinkError> {
        Ok(self.services.read().unwrap().values().cloned().collect())
    }
}
