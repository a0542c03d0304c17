//! Zapflow Core - campaign execution engine
//!
//! This crate provides the campaign execution core for Zapflow: the
//! schedule gates, the message dispatcher, the gateway client, and the
//! coordinator loop that ties them together.

pub mod campaign;
pub mod gateway;

pub use campaign::{
    CampaignManager, DispatchError, DispatchSummary, ManagerStats, MessageDispatcher,
    TemplateRenderer,
};
pub use gateway::{
    GatewayClient, GatewayResponse, MediaKind, MessageSender, OutboundMessage, OutboundPayload,
    ResponseKind, SendOutcome,
};
