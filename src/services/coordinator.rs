use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Notify, RwLock};
use tracing::{info, warn};

use crate::models::TaskSnapshot;
use crate::planner::PlannerClient;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CoordinatorState {
    pub snapshot: Option<TaskSnapshot>,
    pub last_update_success: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Polls one plan's open tasks on an interval, or sooner when a write asks
/// for it through [`PollingCoordinator::request_refresh`].
pub struct PollingCoordinator {
    planner: Arc<dyn PlannerClient>,
    plan_name: String,
    interval: Duration,
    state: RwLock<CoordinatorState>,
    wake: Notify,
}

impl PollingCoordinator {
    pub fn new(planner: Arc<dyn PlannerClient>, plan_name: impl Into<String>, interval: Duration) -> Self {
        Self {
            planner,
            plan_name: plan_name.into(),
            interval,
            state: RwLock::new(CoordinatorState::default()),
            wake: Notify::new(),
        }
    }

    pub fn plan_name(&self) -> &str {
        &self.plan_name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn state(&self) -> CoordinatorState {
        self.state.read().await.clone()
    }

    pub async fn snapshot(&self) -> Option<TaskSnapshot> {
        self.state.read().await.snapshot.clone()
    }

    pub async fn last_update_success(&self) -> bool {
        self.state.read().await.last_update_success
    }

    /// Rebuilds the snapshot now. Plan and listing failures arrive as data in
    /// the snapshot's `error`, so a completed poll always counts as a success.
    pub async fn refresh(&self) -> TaskSnapshot {
        let snapshot = self.planner.list_open_tasks(&self.plan_name).await;

        match &snapshot.error {
            None => info!(
                "Refreshed plan '{}': {} open tasks",
                self.plan_name, snapshot.total_open
            ),
            Some(err) => warn!("Refresh of plan '{}' failed: {}", self.plan_name, err),
        }

        let mut state = self.state.write().await;
        state.last_update_success = true;
        state.last_updated = Some(Utc::now());
        state.snapshot = Some(snapshot.clone());
        snapshot
    }

    /// Wakes the polling loop for an out-of-band refresh.
    pub fn request_refresh(&self) {
        self.wake.notify_one();
    }

    /// Refreshes immediately, then on every tick or refresh request. Runs forever.
    pub async fn start(self: Arc<Self>) {
        info!(
            "Starting planner coordinator for '{}' (interval: {:?})",
            self.plan_name, self.interval
        );

        loop {
            self.refresh().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.wake.notified() => {
                    info!("Refresh requested for '{}'", self.plan_name);
                }
            }
        }
    }
}
