//! In-flight execution records
//!
//! One record exists per campaign currently being dispatched in this
//! process. The record is shared between the coordinator and the
//! dispatcher: the dispatcher reads the status at each recipient
//! boundary to observe pause requests, and writes its running counters
//! so aggregate stats reflect partial progress.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use zapflow_common::types::CampaignId;

/// Lifecycle of one dispatch pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Running,
    Paused,
    Completed,
    Error,
}

/// Mutable state of one in-flight campaign pass
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub campaign_id: CampaignId,
    pub status: ExecutionStatus,
    /// Successful sends accumulated in this pass
    pub sent_messages: i32,
    /// Failed recipients accumulated in this pass
    pub failed_messages: i32,
    /// Index of the recipient currently being processed
    pub current_index: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl ExecutionRecord {
    /// Create a fresh running record for a campaign
    pub fn new(campaign_id: CampaignId) -> Self {
        Self {
            campaign_id,
            status: ExecutionStatus::Running,
            sent_messages: 0,
            failed_messages: 0,
            current_index: 0,
            started_at: Utc::now(),
            finished_at: None,
            last_error: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == ExecutionStatus::Running
    }

    /// Close the record as successfully finished
    pub fn finish(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    /// Close the record with a pass-level error
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = ExecutionStatus::Error;
        self.last_error = Some(error.into());
        self.finished_at = Some(Utc::now());
    }
}

/// Handle shared between coordinator and dispatcher
pub type SharedExecution = Arc<RwLock<ExecutionRecord>>;

/// Wrap a fresh record for sharing
pub fn new_shared_execution(campaign_id: CampaignId) -> SharedExecution {
    Arc::new(RwLock::new(ExecutionRecord::new(campaign_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_running() {
        let record = ExecutionRecord::new(uuid::Uuid::new_v4());
        assert!(record.is_running());
        assert_eq!(record.sent_messages, 0);
        assert_eq!(record.failed_messages, 0);
        assert!(record.finished_at.is_none());
    }

    #[test]
    fn test_finish_and_fail_close_the_record() {
        let mut record = ExecutionRecord::new(uuid::Uuid::new_v4());
        record.finish();
        assert_eq!(record.status, ExecutionStatus::Completed);
        assert!(record.finished_at.is_some());

        let mut record = ExecutionRecord::new(uuid::Uuid::new_v4());
        record.fail("gateway unreachable");
        assert_eq!(record.status, ExecutionStatus::Error);
        assert_eq!(record.last_error.as_deref(), Some("gateway unreachable"));
    }
}
