//! Outbound gateway client
//!
//! Translates one logical "send X to Y" request into the matching
//! physical gateway call and normalizes the result. The client performs
//! the network call only; it never touches persisted state.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use zapflow_common::config::GatewayConfig;

use super::response::{GatewayResponse, ResponseKind, SendOutcome};

/// Media content category for the send-media operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

impl MediaKind {
    fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }
}

/// Logical payload of one outbound message
#[derive(Debug, Clone)]
pub enum OutboundPayload {
    Text {
        text: String,
    },
    Media {
        kind: MediaKind,
        mime_type: String,
        caption: Option<String>,
        /// Remote URL or inline base64
        media: String,
        file_name: Option<String>,
    },
    Audio {
        /// Raw base64, no data-URI header
        base64: String,
    },
}

/// One logical message to one destination
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Gateway connection to send through
    pub instance_id: String,
    /// Phone number or group identifier, passed through uniformly
    pub destination: String,
    /// Per-message delay hint forwarded to the gateway, in milliseconds
    pub delay_ms: u64,
    pub payload: OutboundPayload,
}

/// Seam between the dispatcher and the physical gateway.
///
/// Implementations never return an error type: every failure mode is
/// normalized into an unsuccessful [`SendOutcome`].
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> SendOutcome;
}

/// HTTP client for the WhatsApp send gateway
pub struct GatewayClient {
    config: GatewayConfig,
    client: Client,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> zapflow_common::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                zapflow_common::Error::Gateway(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Select the physical operation and build its request body
    fn request_parts(&self, message: &OutboundMessage) -> (ResponseKind, String, Value) {
        match &message.payload {
            OutboundPayload::Text { text } => (
                ResponseKind::Text,
                format!(
                    "{}/message/sendText/{}",
                    self.config.base_url, message.instance_id
                ),
                json!({
                    "number": message.destination,
                    "text": text,
                    "delay": message.delay_ms,
                }),
            ),
            OutboundPayload::Media {
                kind,
                mime_type,
                caption,
                media,
                file_name,
            } => (
                ResponseKind::Media,
                format!(
                    "{}/message/sendMedia/{}",
                    self.config.base_url, message.instance_id
                ),
                json!({
                    "number": message.destination,
                    "mediatype": kind.as_str(),
                    "mimetype": mime_type,
                    "caption": caption.clone().unwrap_or_default(),
                    "media": media,
                    "fileName": file_name,
                    "delay": message.delay_ms,
                }),
            ),
            OutboundPayload::Audio { base64 } => (
                ResponseKind::Audio,
                format!(
                    "{}/message/sendWhatsAppAudio/{}",
                    self.config.base_url, message.instance_id
                ),
                json!({
                    "number": message.destination,
                    "audio": base64,
                    "delay": message.delay_ms,
                }),
            ),
        }
    }
}

#[async_trait]
impl MessageSender for GatewayClient {
    async fn send(&self, message: &OutboundMessage) -> SendOutcome {
        let (kind, url, body) = self.request_parts(message);

        debug!(
            destination = %message.destination,
            instance = %message.instance_id,
            url = %url,
            "Sending message through gateway"
        );

        let response = match self
            .client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(destination = %message.destination, "Gateway request failed: {}", e);
                return SendOutcome::err(format!("gateway request failed: {}", e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                destination = %message.destination,
                status = %status,
                "Gateway returned error status"
            );
            return SendOutcome::err(format!("gateway returned status {}: {}", status, body));
        }

        let raw: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => return SendOutcome::err(format!("invalid gateway response: {}", e)),
        };

        GatewayResponse::new(kind, raw).into_outcome()
    }
}

/// Strip a `data:<mime>;base64,` header, leaving raw base64.
///
/// The send-audio operation rejects data-URI payloads, unlike send-media
/// which accepts either a URL or base64 with or without the header.
pub fn strip_data_uri_header(payload: &str) -> &str {
    if payload.starts_with("data:") {
        match payload.split_once(',') {
            Some((_, rest)) => rest,
            None => payload,
        }
    } else {
        payload
    }
}
