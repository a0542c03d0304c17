//! In-memory repositories and scripted senders shared by the campaign
//! component tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use zapflow_common::types::{CampaignId, RecipientId};
use zapflow_common::{Error, Result};
use zapflow_storage::models::{Campaign, CampaignStatus, MessageTemplate, Recipient};
use zapflow_storage::repository::{
    CampaignRepositoryTrait, RecipientRepositoryTrait, TemplateRepositoryTrait,
};

use super::execution::{ExecutionStatus, SharedExecution};
use crate::gateway::{MessageSender, OutboundMessage, SendOutcome};

/// In-memory stand-in for the three campaign repositories
#[derive(Default)]
pub struct InMemoryStore {
    campaigns: Mutex<HashMap<CampaignId, Campaign>>,
    templates: Mutex<Vec<MessageTemplate>>,
    recipients: Mutex<Vec<Recipient>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_campaign(&self, campaign: Campaign) {
        self.campaigns.lock().unwrap().insert(campaign.id, campaign);
    }

    pub fn insert_template(&self, template: MessageTemplate) {
        self.templates.lock().unwrap().push(template);
    }

    pub fn insert_recipient(&self, recipient: Recipient) {
        self.recipients.lock().unwrap().push(recipient);
    }

    pub fn campaign(&self, id: CampaignId) -> Campaign {
        self.campaigns.lock().unwrap().get(&id).cloned().unwrap()
    }

    pub fn recipient_status(&self, id: RecipientId) -> String {
        self.recipients
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.status.clone())
            .unwrap()
    }

    pub fn recipient_error(&self, id: RecipientId) -> Option<String> {
        self.recipients
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| r.error_message.clone())
    }
}

#[async_trait]
impl CampaignRepositoryTrait for InMemoryStore {
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>> {
        Ok(self.campaigns.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_status(&self, status: CampaignStatus) -> Result<Vec<Campaign>> {
        let wanted = status.to_string();
        Ok(self
            .campaigns
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.status == wanted)
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: CampaignId, status: CampaignStatus) -> Result<Campaign> {
        let mut campaigns = self.campaigns.lock().unwrap();
        let campaign = campaigns
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("campaign {}", id)))?;
        let current = campaign.status()?;
        if !current.can_transition_to(status) {
            return Err(Error::Validation(format!(
                "illegal campaign transition {} -> {}",
                current, status
            )));
        }
        campaign.status = status.to_string();
        campaign.updated_at = Utc::now();
        Ok(campaign.clone())
    }

    async fn increment_counters(&self, id: CampaignId, sent: i32, failed: i32) -> Result<()> {
        let mut campaigns = self.campaigns.lock().unwrap();
        let campaign = campaigns
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("campaign {}", id)))?;
        campaign.sent_messages += sent;
        campaign.failed_messages += failed;
        Ok(())
    }
}

#[async_trait]
impl TemplateRepositoryTrait for InMemoryStore {
    async fn list_by_campaign(&self, campaign_id: CampaignId) -> Result<Vec<MessageTemplate>> {
        let mut templates: Vec<MessageTemplate> = self
            .templates
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.campaign_id == campaign_id)
            .cloned()
            .collect();
        templates.sort_by_key(|t| t.order_index);
        Ok(templates)
    }
}

#[async_trait]
impl RecipientRepositoryTrait for InMemoryStore {
    async fn list_pending(&self, campaign_id: CampaignId) -> Result<Vec<Recipient>> {
        Ok(self
            .recipients
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.campaign_id == campaign_id && r.status == "pending")
            .cloned()
            .collect())
    }

    async fn count_pending(&self, campaign_id: CampaignId) -> Result<i64> {
        Ok(self
            .recipients
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.campaign_id == campaign_id && r.status == "pending")
            .count() as i64)
    }

    async fn mark_sent(&self, id: RecipientId) -> Result<()> {
        let mut recipients = self.recipients.lock().unwrap();
        let recipient = recipients
            .iter_mut()
            .find(|r| r.id == id && r.status == "pending")
            .ok_or_else(|| Error::Validation(format!("recipient {} is not pending", id)))?;
        recipient.status = "sent".to_string();
        recipient.sent_at = Some(Utc::now());
        Ok(())
    }

    async fn mark_failed(&self, id: RecipientId, error: &str) -> Result<()> {
        let mut recipients = self.recipients.lock().unwrap();
        let recipient = recipients
            .iter_mut()
            .find(|r| r.id == id && r.status == "pending")
            .ok_or_else(|| Error::Validation(format!("recipient {} is not pending", id)))?;
        recipient.status = "failed".to_string();
        recipient.error_message = Some(error.to_string());
        Ok(())
    }
}

/// Scripted gateway sender that records every call
#[derive(Default)]
pub struct RecordingSender {
    calls: Mutex<Vec<OutboundMessage>>,
    fail_destinations: Mutex<HashSet<String>>,
    latency: Option<Duration>,
    pause_after: Mutex<Option<(usize, SharedExecution)>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every send
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Sends to this destination fail with a scripted error
    pub fn fail_destination(&self, destination: &str) {
        self.fail_destinations
            .lock()
            .unwrap()
            .insert(destination.to_string());
    }

    /// Flip the execution to paused once `calls` sends have completed
    pub fn pause_after(&self, calls: usize, execution: SharedExecution) {
        *self.pause_after.lock().unwrap() = Some((calls, execution));
    }

    pub fn calls(&self) -> Vec<OutboundMessage> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, message: &OutboundMessage) -> SendOutcome {
        if let Some(latency) = self.latency {
            sleep(latency).await;
        }

        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(message.clone());
            calls.len()
        };

        let pause = {
            let pause_after = self.pause_after.lock().unwrap();
            match pause_after.as_ref() {
                Some((n, execution)) if *n == count => Some(execution.clone()),
                _ => None,
            }
        };
        if let Some(execution) = pause {
            execution.write().await.status = ExecutionStatus::Paused;
        }

        let failed = self
            .fail_destinations
            .lock()
            .unwrap()
            .contains(&message.destination);
        if failed {
            SendOutcome::err(format!("scripted failure for {}", message.destination))
        } else {
            SendOutcome::ok(Some(format!("MSG-{}", count)))
        }
    }
}

/// Active quick-start campaign with the given inter-recipient interval
pub fn quick_start_campaign(message_interval: i32) -> Campaign {
    Campaign {
        id: uuid::Uuid::new_v4(),
        tenant_id: uuid::Uuid::new_v4(),
        name: "promo".to_string(),
        campaign_type: "individual".to_string(),
        instance_id: "main".to_string(),
        status: "active".to_string(),
        scheduled_days: serde_json::json!([]),
        start_time: None,
        end_time: None,
        start_date: None,
        end_date: None,
        message_interval,
        total_contacts: 0,
        sent_messages: 0,
        failed_messages: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        started_at: None,
        completed_at: None,
    }
}

pub fn text_template(campaign_id: CampaignId, order_index: i32, content: &str) -> MessageTemplate {
    MessageTemplate {
        id: uuid::Uuid::new_v4(),
        campaign_id,
        order_index,
        message_type: "text".to_string(),
        content: Some(content.to_string()),
        media_url: None,
        media_base64: None,
        mime_type: None,
        file_name: None,
        created_at: Utc::now(),
    }
}

pub fn pending_recipient(
    campaign_id: CampaignId,
    name: &str,
    address: &str,
    tag: &str,
) -> Recipient {
    Recipient {
        id: uuid::Uuid::new_v4(),
        campaign_id,
        name: Some(name.to_string()),
        address: address.to_string(),
        tag: Some(tag.to_string()),
        attributes: serde_json::json!({}),
        status: "pending".to_string(),
        sent_at: None,
        error_message: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
