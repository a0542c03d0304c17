//! Database models for campaigns, message templates, and recipients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use zapflow_common::types::{CampaignId, RecipientId, TemplateId, TenantId};

/// Campaign lifecycle status
///
/// Statuses are stored as text in the database; writes go through
/// [`CampaignStatus::can_transition_to`] so illegal transitions are
/// rejected at validation time instead of silently accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    /// Transition table for the campaign lifecycle.
    ///
    /// `active` is entered only from `draft`/`scheduled` (launch) or
    /// `paused` (resume); it leaves to `completed`, `paused`, or
    /// `cancelled`. `completed` and `cancelled` are terminal.
    pub fn can_transition_to(self, next: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, next),
            (Draft, Scheduled)
                | (Draft, Active)
                | (Draft, Cancelled)
                | (Scheduled, Active)
                | (Scheduled, Cancelled)
                | (Active, Paused)
                | (Active, Completed)
                | (Active, Cancelled)
                | (Paused, Active)
                | (Paused, Completed)
                | (Paused, Cancelled)
        )
    }

    /// True for statuses that can never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, CampaignStatus::Completed | CampaignStatus::Cancelled)
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignStatus::Draft => write!(f, "draft"),
            CampaignStatus::Scheduled => write!(f, "scheduled"),
            CampaignStatus::Active => write!(f, "active"),
            CampaignStatus::Paused => write!(f, "paused"),
            CampaignStatus::Completed => write!(f, "completed"),
            CampaignStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = zapflow_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CampaignStatus::Draft),
            "scheduled" => Ok(CampaignStatus::Scheduled),
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "completed" => Ok(CampaignStatus::Completed),
            "cancelled" => Ok(CampaignStatus::Cancelled),
            other => Err(zapflow_common::Error::Validation(format!(
                "Unknown campaign status: {}",
                other
            ))),
        }
    }
}

/// Campaign targeting type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    /// Individual phone numbers
    Individual,
    /// WhatsApp group identifiers
    Group,
}

impl std::fmt::Display for CampaignType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignType::Individual => write!(f, "individual"),
            CampaignType::Group => write!(f, "group"),
        }
    }
}

impl std::str::FromStr for CampaignType {
    type Err = zapflow_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(CampaignType::Individual),
            "group" => Ok(CampaignType::Group),
            other => Err(zapflow_common::Error::Validation(format!(
                "Unknown campaign type: {}",
                other
            ))),
        }
    }
}

/// Recipient send status
///
/// A one-way machine: `pending → sent` or `pending → failed`, both
/// terminal from the execution core's point of view; `sent → delivered`
/// is reserved for delivery receipts reported outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientStatus {
    Pending,
    Sent,
    Failed,
    Delivered,
}

impl RecipientStatus {
    /// Transition table for recipient status
    pub fn can_transition_to(self, next: RecipientStatus) -> bool {
        use RecipientStatus::*;
        matches!((self, next), (Pending, Sent) | (Pending, Failed) | (Sent, Delivered))
    }
}

impl std::fmt::Display for RecipientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipientStatus::Pending => write!(f, "pending"),
            RecipientStatus::Sent => write!(f, "sent"),
            RecipientStatus::Failed => write!(f, "failed"),
            RecipientStatus::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for RecipientStatus {
    type Err = zapflow_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RecipientStatus::Pending),
            "sent" => Ok(RecipientStatus::Sent),
            "failed" => Ok(RecipientStatus::Failed),
            "delivered" => Ok(RecipientStatus::Delivered),
            other => Err(zapflow_common::Error::Validation(format!(
                "Unknown recipient status: {}",
                other
            ))),
        }
    }
}

/// Message template content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    Document,
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageType::Text => write!(f, "text"),
            MessageType::Image => write!(f, "image"),
            MessageType::Video => write!(f, "video"),
            MessageType::Audio => write!(f, "audio"),
            MessageType::Document => write!(f, "document"),
        }
    }
}

impl std::str::FromStr for MessageType {
    type Err = zapflow_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageType::Text),
            "image" => Ok(MessageType::Image),
            "video" => Ok(MessageType::Video),
            "audio" => Ok(MessageType::Audio),
            "document" => Ok(MessageType::Document),
            other => Err(zapflow_common::Error::Validation(format!(
                "Unknown message type: {}",
                other
            ))),
        }
    }
}

/// Campaign model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub tenant_id: TenantId,
    pub name: String,
    pub campaign_type: String,
    /// Outbound gateway connection used to send; group campaigns are
    /// constrained to exactly one instance at launch time.
    pub instance_id: String,
    pub status: String,
    /// JSON array of lowercase weekday names; empty means no restriction
    pub scheduled_days: serde_json::Value,
    /// Wall-clock window start, "HH:MM"
    pub start_time: Option<String>,
    /// Wall-clock window end, "HH:MM"
    pub end_time: Option<String>,
    /// Null means quick-start: run once, immediately, ignoring gates
    pub start_date: Option<DateTime<Utc>>,
    /// Expiry; past this the campaign is completed with reason "expired"
    pub end_date: Option<DateTime<Utc>>,
    /// Seconds to wait between recipients
    pub message_interval: i32,
    pub total_contacts: i32,
    pub sent_messages: i32,
    pub failed_messages: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Campaign {
    /// Parse the stored status
    pub fn status(&self) -> Result<CampaignStatus, zapflow_common::Error> {
        self.status.parse()
    }

    /// Parse the stored campaign type
    pub fn campaign_type(&self) -> Result<CampaignType, zapflow_common::Error> {
        self.campaign_type.parse()
    }

    /// Get scheduled weekday names as a vector
    pub fn scheduled_days_vec(&self) -> Vec<String> {
        serde_json::from_value(self.scheduled_days.clone()).unwrap_or_default()
    }
}

/// Message template model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub id: TemplateId,
    pub campaign_id: CampaignId,
    /// Send order within the campaign, ascending
    pub order_index: i32,
    pub message_type: String,
    /// Text body for text templates, caption for media templates
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_base64: Option<String>,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MessageTemplate {
    /// Parse the stored message type
    pub fn message_type(&self) -> Result<MessageType, zapflow_common::Error> {
        self.message_type.parse()
    }
}

/// Campaign recipient model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub campaign_id: CampaignId,
    pub name: Option<String>,
    /// Destination address: phone number for individual campaigns,
    /// group identifier for group campaigns; passed through uniformly.
    pub address: String,
    /// Personalization tag
    pub tag: Option<String>,
    /// JSON object of custom personalization fields
    pub attributes: serde_json::Value,
    pub status: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipient {
    /// Parse the stored status
    pub fn status(&self) -> Result<RecipientStatus, zapflow_common::Error> {
        self.status.parse()
    }
}
