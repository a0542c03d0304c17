//! Campaign repository

use async_trait::async_trait;
use chrono::Utc;
use zapflow_common::types::CampaignId;
use zapflow_common::{Error, Result};

use crate::db::DatabasePool;
use crate::models::{Campaign, CampaignStatus};

/// Campaign repository trait
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Get a campaign by ID
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>>;

    /// List campaigns in a given status
    async fn list_by_status(&self, status: CampaignStatus) -> Result<Vec<Campaign>>;

    /// Update campaign status, validating the transition table
    async fn update_status(&self, id: CampaignId, status: CampaignStatus) -> Result<Campaign>;

    /// Additively increment the sent/failed counters.
    ///
    /// Increments are never overwrites: multiple passes occur over a
    /// campaign's life and each pass contributes its own counts.
    async fn increment_counters(&self, id: CampaignId, sent: i32, failed: i32) -> Result<()>;
}

/// Database campaign repository
#[derive(Clone)]
pub struct DbCampaignRepository {
    pool: DatabasePool,
}

impl DbCampaignRepository {
    /// Create a new campaign repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for DbCampaignRepository {
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>> {
        sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn list_by_status(&self, status: CampaignStatus) -> Result<Vec<Campaign>> {
        sqlx::query_as::<_, Campaign>(
            r#"
            SELECT * FROM campaigns
            WHERE status = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(status.to_string())
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn update_status(&self, id: CampaignId, status: CampaignStatus) -> Result<Campaign> {
        let current = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Campaign {}", id)))?;

        let current_status: CampaignStatus = current.status.parse()?;
        if !current_status.can_transition_to(status) {
            return Err(Error::Validation(format!(
                "Illegal campaign status transition: {} -> {}",
                current_status, status
            )));
        }

        let started_at = if status == CampaignStatus::Active {
            Some(Utc::now())
        } else {
            None
        };

        let completed_at = if status.is_terminal() {
            Some(Utc::now())
        } else {
            None
        };

        sqlx::query_as::<_, Campaign>(
            r#"
            UPDATE campaigns SET
                status = $2,
                started_at = COALESCE(started_at, $3),
                completed_at = COALESCE($4, completed_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .bind(started_at)
        .bind(completed_at)
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn increment_counters(&self, id: CampaignId, sent: i32, failed: i32) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE campaigns SET
                sent_messages = sent_messages + $2,
                failed_messages = failed_messages + $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(sent)
        .bind(failed)
        .execute(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }
}
