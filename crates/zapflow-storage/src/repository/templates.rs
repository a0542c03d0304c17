//! Message template repository

use async_trait::async_trait;
use zapflow_common::types::CampaignId;
use zapflow_common::{Error, Result};

use crate::db::DatabasePool;
use crate::models::MessageTemplate;

/// Message template repository trait
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// List a campaign's templates in send order (`order_index` ascending)
    async fn list_by_campaign(&self, campaign_id: CampaignId) -> Result<Vec<MessageTemplate>>;
}

/// Database message template repository
#[derive(Clone)]
pub struct DbTemplateRepository {
    pool: DatabasePool,
}

impl DbTemplateRepository {
    /// Create a new template repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateRepository for DbTemplateRepository {
    async fn list_by_campaign(&self, campaign_id: CampaignId) -> Result<Vec<MessageTemplate>> {
        sqlx::query_as::<_, MessageTemplate>(
            r#"
            SELECT * FROM message_templates
            WHERE campaign_id = $1
            ORDER BY order_index ASC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }
}
