//! Shared context for database-backed integration tests.
//!
//! Uses an embedded PostgreSQL instance by default. Set `EXTERNAL_TEST_DB`
//! to run against an externally managed database configured through the
//! `VULNSCOPE_DB_*` environment variables.

use postgresql_embedded::PostgreSQL;
use sea_orm::{ActiveValue::Set, EntityTrait};
use std::env;
use test_context::AsyncTestContext;
use time::OffsetDateTime;
use tracing::instrument;
use vulnscope_common::{config, db::Database};
use vulnscope_entity::vulnerability;

pub struct VulnscopeContext {
    pub db: Database,
    postgresql: Option<PostgreSQL>,
}

impl VulnscopeContext {
    pub fn new(db: Database, postgresql: impl Into<Option<PostgreSQL>>) -> Self {
        Self {
            db,
            postgresql: postgresql.into(),
        }
    }

    /// Store one raw vulnerability document.
    pub async fn ingest_document(
        &self,
        id: &str,
        document: serde_json::Value,
    ) -> Result<(), anyhow::Error> {
        vulnerability::Entity::insert(vulnerability::ActiveModel {
            id: Set(id.to_string()),
            document: Set(document),
            created_at: Set(OffsetDateTime::now_utc()),
        })
        .exec(&self.db)
        .await?;

        Ok(())
    }
}

impl AsyncTestContext for VulnscopeContext {
    #[instrument]
    #[allow(clippy::expect_used)]
    async fn setup() -> Self {
        if env::var("EXTERNAL_TEST_DB").is_ok() {
            log::warn!("Using external database from 'VULNSCOPE_DB_*' env vars");
            let config = config::Database::from_env().expect("DB config from env");

            let db = if matches!(
                env::var("EXTERNAL_TEST_DB_BOOTSTRAP").as_deref(),
                Ok("1" | "true")
            ) {
                vulnscope_db::Database::bootstrap(&config).await
            } else {
                Database::new(&config).await
            }
            .expect("Configuring the database");

            return VulnscopeContext::new(db, None);
        }

        let (db, postgresql) = vulnscope_db::embedded::create()
            .await
            .expect("Create an embedded database");

        VulnscopeContext::new(db, postgresql)
    }

    async fn teardown(self) {
        let _ = self.db.close().await;

        if let Some(postgresql) = self.postgresql {
            let _ = postgresql.stop().await;
        }
    }
}
