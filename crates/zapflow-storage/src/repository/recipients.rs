//! Campaign recipient repository

use async_trait::async_trait;
use zapflow_common::types::{CampaignId, RecipientId};
use zapflow_common::{Error, Result};

use crate::db::DatabasePool;
use crate::models::{Recipient, RecipientStatus};

/// Campaign recipient repository trait
#[async_trait]
pub trait RecipientRepository: Send + Sync {
    /// List a campaign's pending recipients, in stable load order.
    ///
    /// Recipients already `sent` or `failed` are excluded, which is what
    /// makes re-running a campaign pass safe.
    async fn list_pending(&self, campaign_id: CampaignId) -> Result<Vec<Recipient>>;

    /// Count a campaign's pending recipients
    async fn count_pending(&self, campaign_id: CampaignId) -> Result<i64>;

    /// Mark a recipient as sent, stamping `sent_at`
    async fn mark_sent(&self, id: RecipientId) -> Result<()>;

    /// Mark a recipient as failed, recording the first error encountered
    async fn mark_failed(&self, id: RecipientId, error: &str) -> Result<()>;
}

/// Database campaign recipient repository
#[derive(Clone)]
pub struct DbRecipientRepository {
    pool: DatabasePool,
}

impl DbRecipientRepository {
    /// Create a new recipient repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientRepository for DbRecipientRepository {
    async fn list_pending(&self, campaign_id: CampaignId) -> Result<Vec<Recipient>> {
        sqlx::query_as::<_, Recipient>(
            r#"
            SELECT * FROM recipients
            WHERE campaign_id = $1 AND status = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(campaign_id)
        .bind(RecipientStatus::Pending.to_string())
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn count_pending(&self, campaign_id: CampaignId) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM recipients WHERE campaign_id = $1 AND status = $2",
        )
        .bind(campaign_id)
        .bind(RecipientStatus::Pending.to_string())
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(count.0)
    }

    async fn mark_sent(&self, id: RecipientId) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE recipients SET
                status = $2,
                sent_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = $3
            "#,
        )
        .bind(id)
        .bind(RecipientStatus::Sent.to_string())
        .bind(RecipientStatus::Pending.to_string())
        .execute(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(Error::Validation(format!(
                "Recipient {} is not pending",
                id
            )));
        }

        Ok(())
    }

    async fn mark_failed(&self, id: RecipientId, error: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE recipients SET
                status = $2,
                error_message = $3,
                updated_at = NOW()
            WHERE id = $1 AND status = $4
            "#,
        )
        .bind(id)
        .bind(RecipientStatus::Failed.to_string())
        .bind(error)
        .bind(RecipientStatus::Pending.to_string())
        .execute(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(Error::Validation(format!(
                "Recipient {} is not pending",
                id
            )));
        }

        Ok(())
    }
}
