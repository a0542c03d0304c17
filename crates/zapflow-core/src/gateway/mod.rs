//! Gateway Module - Outbound WhatsApp send API client

mod client;
mod response;

pub use client::{
    strip_data_uri_header, GatewayClient, MediaKind, MessageSender, OutboundMessage,
    OutboundPayload,
};
pub use response::{GatewayResponse, ResponseKind, SendOutcome};
