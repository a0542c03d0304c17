//! Campaign Manager - the outer control loop
//!
//! One manager runs per process. Each tick it queries active campaigns,
//! applies the schedule gates, and hands due campaigns to the
//! dispatcher one at a time. The in-flight execution map guarantees at
//! most one concurrent pass per campaign within this process; it is not
//! a distributed lock, so multi-process deployments need an external
//! claim marker on top.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};
use zapflow_common::types::CampaignId;
use zapflow_common::Result;
use zapflow_storage::models::{Campaign, CampaignStatus};
use zapflow_storage::repository::{CampaignRepositoryTrait, RecipientRepositoryTrait};

use super::dispatcher::{DispatchError, MessageDispatcher};
use super::execution::{new_shared_execution, ExecutionStatus, SharedExecution};
use super::schedule;

/// Aggregate view over the in-flight executions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerStats {
    pub in_flight: usize,
    pub sent_messages: i32,
    pub failed_messages: i32,
}

/// Campaign Manager
pub struct CampaignManager {
    campaigns: Arc<dyn CampaignRepositoryTrait>,
    recipients: Arc<dyn RecipientRepositoryTrait>,
    dispatcher: MessageDispatcher,
    executions: Arc<RwLock<HashMap<CampaignId, SharedExecution>>>,
    check_interval_secs: u64,
    shutdown_tx: watch::Sender<bool>,
}

impl CampaignManager {
    /// Create a new campaign manager
    pub fn new(
        campaigns: Arc<dyn CampaignRepositoryTrait>,
        recipients: Arc<dyn RecipientRepositoryTrait>,
        dispatcher: MessageDispatcher,
        check_interval_secs: u64,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            campaigns,
            recipients,
            dispatcher,
            executions: Arc::new(RwLock::new(HashMap::new())),
            check_interval_secs: check_interval_secs.max(1),
            shutdown_tx,
        }
    }

    /// Run the periodic check loop until [`stop`](Self::stop) is called
    pub async fn run(&self) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        if *shutdown_rx.borrow_and_update() {
            return;
        }

        let mut ticker = interval(Duration::from_secs(self.check_interval_secs));

        info!(
            interval_secs = self.check_interval_secs,
            "campaign manager started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.check_campaigns().await {
                        error!(error = %e, "campaign check failed");
                    }
                }
                _ = shutdown_rx.changed() => {
                    info!("campaign manager stopping");
                    break;
                }
            }
        }
    }

    /// Signal the run loop to exit after the current tick
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// One full pass over the active campaigns.
    ///
    /// Also the force-check entry point: callers may invoke this
    /// directly to bypass the timer.
    pub async fn check_campaigns(&self) -> Result<()> {
        let active = self.campaigns.list_by_status(CampaignStatus::Active).await?;

        debug!(count = active.len(), "checking active campaigns");

        for campaign in active {
            // Claim under a single lock so overlapping checks cannot
            // start a second pass for the same campaign
            let execution = {
                let mut executions = self.executions.write().await;
                if executions.contains_key(&campaign.id) {
                    debug!(campaign_id = %campaign.id, "execution already in flight, skipping");
                    continue;
                }
                let execution = new_shared_execution(campaign.id);
                executions.insert(campaign.id, Arc::clone(&execution));
                execution
            };

            self.process_campaign(&campaign, &execution).await;

            // Released unconditionally so the next tick can pick the
            // campaign up again
            self.executions.write().await.remove(&campaign.id);
        }

        Ok(())
    }

    /// Apply the schedule gates and dispatch one campaign.
    ///
    /// Never returns an error: every failure is recorded on the
    /// execution and the loop continues with the next campaign.
    async fn process_campaign(&self, campaign: &Campaign, execution: &SharedExecution) {
        let now = Utc::now();

        if schedule::is_expired(campaign, now) {
            info!(campaign_id = %campaign.id, reason = "expired", "completing campaign");
            if let Err(e) = self
                .campaigns
                .update_status(campaign.id, CampaignStatus::Completed)
                .await
            {
                error!(campaign_id = %campaign.id, error = %e, "failed to complete campaign");
            }
            execution.write().await.finish();
            return;
        }

        if !schedule::should_execute_now(campaign, now) {
            debug!(campaign_id = %campaign.id, "campaign not due, will retry next tick");
            execution.write().await.finish();
            return;
        }

        match self.dispatcher.run(campaign, execution).await {
            Ok(summary) => {
                execution.write().await.finish();
                info!(
                    campaign_id = %campaign.id,
                    sent = summary.sent_messages,
                    failed = summary.failed_messages,
                    "dispatch pass finished"
                );
                self.complete_if_drained(campaign.id).await;
            }
            Err(DispatchError::NoPendingRecipients) => {
                execution.write().await.finish();
                self.complete_if_drained(campaign.id).await;
            }
            Err(DispatchError::NoTemplates) => {
                // Known sharp edge: the campaign stays active and will
                // be reported again every tick until templates appear
                // or an operator cancels it
                warn!(campaign_id = %campaign.id, "active campaign has no message templates");
                execution.write().await.fail("no message templates");
            }
            Err(e) => {
                error!(campaign_id = %campaign.id, error = %e, "dispatch pass failed");
                execution.write().await.fail(e.to_string());
            }
        }
    }

    /// Transition the campaign to completed once nothing is pending
    async fn complete_if_drained(&self, campaign_id: CampaignId) {
        match self.recipients.count_pending(campaign_id).await {
            Ok(0) => {
                info!(campaign_id = %campaign_id, reason = "finished", "completing campaign");
                if let Err(e) = self
                    .campaigns
                    .update_status(campaign_id, CampaignStatus::Completed)
                    .await
                {
                    error!(campaign_id = %campaign_id, error = %e, "failed to complete campaign");
                }
            }
            Ok(remaining) => {
                debug!(
                    campaign_id = %campaign_id,
                    remaining,
                    "recipients still pending, campaign stays active"
                );
            }
            Err(e) => {
                error!(campaign_id = %campaign_id, error = %e, "failed to count pending recipients");
            }
        }
    }

    /// Pause a campaign.
    ///
    /// An in-flight pass observes the flip at its next recipient
    /// boundary; the current send completes first.
    pub async fn pause(&self, campaign_id: CampaignId) -> Result<()> {
        if let Some(execution) = self.executions.read().await.get(&campaign_id).cloned() {
            let mut exec = execution.write().await;
            if exec.is_running() {
                exec.status = ExecutionStatus::Paused;
            }
        }

        self.campaigns
            .update_status(campaign_id, CampaignStatus::Paused)
            .await?;

        info!(campaign_id = %campaign_id, "campaign paused");
        Ok(())
    }

    /// Resume a paused campaign; the next due tick picks it up
    pub async fn resume(&self, campaign_id: CampaignId) -> Result<()> {
        self.campaigns
            .update_status(campaign_id, CampaignStatus::Active)
            .await?;

        info!(campaign_id = %campaign_id, "campaign resumed");
        Ok(())
    }

    /// Sum the counters of every in-flight execution
    pub async fn stats(&self) -> ManagerStats {
        let executions = self.executions.read().await;
        let mut stats = ManagerStats {
            in_flight: executions.len(),
            ..Default::default()
        };
        for execution in executions.values() {
            let exec = execution.read().await;
            stats.sent_messages += exec.sent_messages;
            stats.failed_messages += exec.failed_messages;
        }
        stats
    }
}
