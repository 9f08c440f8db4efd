//! Postgres sink backed by sqlx.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;

use super::{ServiceSink, ServiceWithCategories};
use crate::error::SinkError;
use crate::types::WelfareService;

pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceSink for PostgresSink {
    async fn upsert(&self, service: &WelfareService, categories: &[String]) -> Result<(), SinkError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO welfare_services (
                service_id, policy_name, link, target_audience, note, details
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (service_id) DO UPDATE SET
                policy_name = EXCLUDED.policy_name,
                link = EXCLUDED.link,
                target_audience = EXCLUDED.target_audience,
                note = EXCLUDED.note,
                details = EXCLUDED.details
            "#,
        )
        .bind(&service.service_id)
        .bind(&service.policy_name)
        .bind(&service.link)
        .bind(&service.target_audience)
        .bind(&service.note)
        .bind(&service.details)
        .execute(&mut *tx)
        .await?;

        // Categories are replaced wholesale per re-classification.
        sqlx::query("DELETE FROM service_categories WHERE service_id = $1")
            .bind(&service.service_id)
            .execute(&mut *tx)
            .await?;

        for category in categories {
            let category = category.trim();
            if category.is_empty() {
                continue;
            }
            sqlx::query(
                r#"
                INSERT INTO service_categories (service_id, category)
                VALUES ($1, $2)
                "#,
            )
            .bind(&service.service_id)
            .bind(category)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            service_id = %service.service_id,
            link = %service.link,
            categories = categories.len(),
            "service upserted"
        );
        Ok(())
    }

    async fn list_services(&self) -> Result<Vec<ServiceWithCategories>, SinkError> {
        let rows = sqlx::query(
            r#"
            SELECT s.service_id, s.policy_name, s.link, s.target_audience,
                   s.note, s.details, c.category
            FROM welfare_services s
            LEFT JOIN service_categories c ON c.service_id = s.service_id
            ORDER BY s.service_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut services: BTreeMap<String, ServiceWithCategories> = BTreeMap::new();
        for row in rows {
            let service_id: String = row.get("service_id");
            let entry = services
                .entry(service_id.clone())
                .or_insert_with(|| ServiceWithCategories {
                    service: WelfareService {
                        service_id,
                        policy_name: row.get("policy_name"),
                        link: row.get("link"),
                        target_audience: row.get("target_audience"),
                        note: row.get("note"),
                        details: row.get("details"),
                    },
                    categories: Vec::new(),
                });
            if let Some(category) = row.get::<Option<String>, _>("category") {
                entry.categories.push(category);
            }
        }

        Ok(services.into_values().collect())
    }
}
