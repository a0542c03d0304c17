//! Campaign Module - scheduling, dispatch, and the coordinator loop

mod dispatcher;
mod execution;
mod manager;
pub mod schedule;
mod template;
#[cfg(test)]
mod testing;

pub use dispatcher::{DispatchError, DispatchSummary, MessageDispatcher};
pub use execution::{new_shared_execution, ExecutionRecord, ExecutionStatus, SharedExecution};
pub use manager::{CampaignManager, ManagerStats};
pub use template::TemplateRenderer;
