//! Common types for Zapflow

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Unique identifier for tenants
pub type TenantId = Uuid;

/// Unique identifier for campaigns
pub type CampaignId = Uuid;

/// Unique identifier for message templates
pub type TemplateId = Uuid;

/// Unique identifier for campaign recipients
pub type RecipientId = Uuid;

/// Identifier of an outbound gateway connection (instance)
pub type InstanceId = String;

/// Timestamp wrapper
pub type Timestamp = DateTime<Utc>;
