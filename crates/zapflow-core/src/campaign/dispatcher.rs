//! Message Dispatcher - drains one campaign's pending recipients
//!
//! One `run` call is one pass: recipients are processed sequentially in
//! load order, and within a recipient every template is sent strictly by
//! `order_index`. The inter-recipient interval is the primary throttle
//! protecting the external gateway; there is no parallel fan-out.

use std::sync::Arc;
use thiserror::Error;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};
use zapflow_storage::models::{Campaign, MessageTemplate, MessageType, Recipient};
use zapflow_storage::repository::{
    CampaignRepositoryTrait, RecipientRepositoryTrait, TemplateRepositoryTrait,
};

use super::execution::SharedExecution;
use super::template::TemplateRenderer;
use crate::gateway::{
    strip_data_uri_header, MediaKind, MessageSender, OutboundMessage, OutboundPayload,
};

/// Dispatch pass errors
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The campaign has no templates to send. Reported so the
    /// coordinator can flag it; the campaign itself is left untouched.
    #[error("campaign has no message templates")]
    NoTemplates,

    /// Nothing left to send. Not a failure: the campaign may be ready
    /// to complete.
    #[error("campaign has no pending recipients")]
    NoPendingRecipients,

    #[error(transparent)]
    Storage(#[from] zapflow_common::Error),
}

/// Counts accumulated by one dispatch pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent_messages: i32,
    pub failed_messages: i32,
}

/// Message Dispatcher
pub struct MessageDispatcher {
    campaigns: Arc<dyn CampaignRepositoryTrait>,
    templates: Arc<dyn TemplateRepositoryTrait>,
    recipients: Arc<dyn RecipientRepositoryTrait>,
    sender: Arc<dyn MessageSender>,
    renderer: TemplateRenderer,
    /// Gap between consecutive templates to the same recipient, ms
    template_gap_ms: u64,
}

impl MessageDispatcher {
    /// Create a new dispatcher
    pub fn new(
        campaigns: Arc<dyn CampaignRepositoryTrait>,
        templates: Arc<dyn TemplateRepositoryTrait>,
        recipients: Arc<dyn RecipientRepositoryTrait>,
        sender: Arc<dyn MessageSender>,
        template_gap_ms: u64,
    ) -> Self {
        Self {
            campaigns,
            templates,
            recipients,
            sender,
            renderer: TemplateRenderer::new(),
            template_gap_ms,
        }
    }

    /// Run one dispatch pass over the campaign's pending recipients.
    ///
    /// Partial progress always stands: recipient status updates happen
    /// as the loop advances, and the campaign counters receive one
    /// additive increment at the end of the pass.
    pub async fn run(
        &self,
        campaign: &Campaign,
        execution: &SharedExecution,
    ) -> Result<DispatchSummary, DispatchError> {
        let templates = self.templates.list_by_campaign(campaign.id).await?;
        if templates.is_empty() {
            return Err(DispatchError::NoTemplates);
        }

        let pending = self.recipients.list_pending(campaign.id).await?;
        if pending.is_empty() {
            return Err(DispatchError::NoPendingRecipients);
        }

        let total = pending.len();
        let interval_ms = campaign.message_interval.max(0) as u64 * 1000;
        let mut sent = 0i32;
        let mut failed = 0i32;

        debug!(
            campaign_id = %campaign.id,
            recipients = total,
            templates = templates.len(),
            "starting dispatch pass"
        );

        for (index, recipient) in pending.iter().enumerate() {
            // Pause and cancel are observed here, between recipients.
            // An in-flight send always completes first.
            if !execution.read().await.is_running() {
                info!(
                    campaign_id = %campaign.id,
                    processed = index,
                    total,
                    "dispatch pass aborted by status change"
                );
                break;
            }

            execution.write().await.current_index = index;

            match self.deliver(campaign, &templates, recipient).await {
                Ok(()) => {
                    self.recipients.mark_sent(recipient.id).await?;
                    sent += 1;
                    execution.write().await.sent_messages += 1;
                }
                Err(error) => {
                    warn!(
                        campaign_id = %campaign.id,
                        recipient_id = %recipient.id,
                        error = %error,
                        "recipient delivery failed"
                    );
                    self.recipients.mark_failed(recipient.id, &error).await?;
                    failed += 1;
                    execution.write().await.failed_messages += 1;
                }
            }

            if index + 1 < total && interval_ms > 0 {
                sleep(Duration::from_millis(interval_ms)).await;
            }
        }

        // Additive increment: passes accumulate, never overwrite
        self.campaigns
            .increment_counters(campaign.id, sent, failed)
            .await?;

        Ok(DispatchSummary {
            sent_messages: sent,
            failed_messages: failed,
        })
    }

    /// Send every template to one recipient, in order.
    ///
    /// Fail-fast per recipient: the first template that fails stops the
    /// sequence and its error becomes the recipient's error.
    async fn deliver(
        &self,
        campaign: &Campaign,
        templates: &[MessageTemplate],
        recipient: &Recipient,
    ) -> Result<(), String> {
        for (position, template) in templates.iter().enumerate() {
            if position > 0 && self.template_gap_ms > 0 {
                sleep(Duration::from_millis(self.template_gap_ms)).await;
            }

            let message = self.build_message(campaign, template, recipient)?;
            let outcome = self.sender.send(&message).await;
            if !outcome.success {
                return Err(outcome
                    .error
                    .unwrap_or_else(|| "send failed without error detail".to_string()));
            }
        }
        Ok(())
    }

    /// Translate one template into a concrete outbound message
    fn build_message(
        &self,
        campaign: &Campaign,
        template: &MessageTemplate,
        recipient: &Recipient,
    ) -> Result<OutboundMessage, String> {
        let message_type = template.message_type().map_err(|e| e.to_string())?;

        let payload = match message_type {
            MessageType::Text => OutboundPayload::Text {
                text: self
                    .renderer
                    .render(template.content.as_deref().unwrap_or(""), recipient),
            },
            MessageType::Image | MessageType::Video | MessageType::Document => {
                let kind = match message_type {
                    MessageType::Image => MediaKind::Image,
                    MessageType::Video => MediaKind::Video,
                    _ => MediaKind::Document,
                };
                // Inline base64 wins over a remote URL when both exist
                let media = template
                    .media_base64
                    .as_deref()
                    .map(|b| strip_data_uri_header(b).to_string())
                    .or_else(|| template.media_url.clone())
                    .ok_or_else(|| format!("template {} has no media payload", template.id))?;
                OutboundPayload::Media {
                    kind,
                    mime_type: template
                        .mime_type
                        .clone()
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                    caption: template
                        .content
                        .as_deref()
                        .map(|c| self.renderer.render(c, recipient)),
                    media,
                    file_name: template.file_name.clone(),
                }
            }
            MessageType::Audio => {
                // Audio has no URL path: the gateway requires raw base64
                let base64 = template
                    .media_base64
                    .as_deref()
                    .map(|b| strip_data_uri_header(b).to_string())
                    .ok_or_else(|| {
                        format!("audio template {} requires inline base64 content", template.id)
                    })?;
                OutboundPayload::Audio { base64 }
            }
        };

        Ok(OutboundMessage {
            instance_id: campaign.instance_id.clone(),
            destination: recipient.address.clone(),
            delay_ms: self.template_gap_ms,
            payload,
        })
    }
}
