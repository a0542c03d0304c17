//! Gateway response normalization
//!
//! The send gateway answers with a different JSON shape per message type,
//! so success cannot be read from a single field. Responses are wrapped in
//! a [`GatewayResponse`] envelope and classified against an ordered list
//! of success signals.

use serde_json::Value;

/// Which physical send operation produced the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Text,
    Media,
    Audio,
}

/// Uniform result of one logical send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl SendOutcome {
    /// Successful send, with the gateway message id when one was returned
    pub fn ok(message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            error: None,
        }
    }

    /// Failed send
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Raw gateway response envelope
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub kind: ResponseKind,
    pub raw: Value,
}

impl GatewayResponse {
    pub fn new(kind: ResponseKind, raw: Value) -> Self {
        Self { kind, raw }
    }

    /// Classify the response into a uniform [`SendOutcome`].
    ///
    /// Success signals, evaluated in order; any one of them declares the
    /// send accepted:
    ///
    /// 1. `success` is boolean `true`
    /// 2. `status` is `"pending"`, `"success"`, or `"sent"` (case-insensitive)
    /// 3. `messageId` is a string
    /// 4. `key.id` is present (provider acknowledgement)
    ///
    /// With no signal present, the error text is taken from the `error`
    /// field, then `message` (objects stringified), else a fixed
    /// no-signal message.
    pub fn into_outcome(self) -> SendOutcome {
        if self.is_success() {
            SendOutcome::ok(self.message_id())
        } else {
            SendOutcome::err(self.error_text())
        }
    }

    /// Evaluate the ordered success-signal list
    pub fn is_success(&self) -> bool {
        if self.raw.get("success").and_then(Value::as_bool) == Some(true) {
            return true;
        }

        if let Some(status) = self.raw.get("status").and_then(Value::as_str) {
            if matches!(
                status.to_ascii_lowercase().as_str(),
                "pending" | "success" | "sent"
            ) {
                return true;
            }
        }

        if self.raw.get("messageId").and_then(Value::as_str).is_some() {
            return true;
        }

        if self
            .raw
            .get("key")
            .and_then(|key| key.get("id"))
            .map(|id| !id.is_null())
            .unwrap_or(false)
        {
            return true;
        }

        false
    }

    /// Extract the gateway message identifier, if any
    pub fn message_id(&self) -> Option<String> {
        if let Some(id) = self.raw.get("messageId").and_then(Value::as_str) {
            return Some(id.to_string());
        }

        match self.raw.get("key").and_then(|key| key.get("id")) {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }

    /// Extract an error description from `error`/`message` fields
    fn error_text(&self) -> String {
        for field in ["error", "message"] {
            match self.raw.get(field) {
                Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(Value::Null) | None => continue,
                Some(other) => return other.to_string(),
            }
        }

        "gateway response contained no success signal".to_string()
    }
}
