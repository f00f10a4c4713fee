//! Capacity reconciler.
//!
//! One reconciliation per verified webhook delivery: describe the
//! service, apply each entry's effect to the demand counter, clamp,
//! and issue at most one fleet update. The fleet update is the only
//! externally visible side effect of a successful delivery.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use gantry_core::{DemandEffect, NotificationBatch, Settings};
use gantry_fleet::{AgentFleet, FleetError};
use gantry_state::{DemandCounter, StateError};

/// Errors from a reconciliation pass. Both sides are upstream failures
/// to the webhook caller.
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Fleet(#[from] FleetError),
}

/// Result of reconciling one notification batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleOutcome {
    /// Demand changed; the fleet was updated to the clamped count.
    Updated { demand: u64, desired: u32 },
    /// No actionable status in the batch; current capacity reported only.
    NoChange { current_desired: u32 },
}

/// Drives the managed service's desired count from the demand counter.
pub struct Reconciler {
    counter: DemandCounter,
    fleet: Arc<dyn AgentFleet>,
    settings: Settings,
}

impl Reconciler {
    pub fn new(counter: DemandCounter, fleet: Arc<dyn AgentFleet>, settings: Settings) -> Self {
        Self {
            counter,
            fleet,
            settings,
        }
    }

    /// Clamp demand against the agent ceiling.
    pub fn clamp(&self, demand: u64) -> u32 {
        demand.min(u64::from(self.settings.max_agents)) as u32
    }

    /// Reconcile one verified notification batch.
    ///
    /// Entries are folded in delivery order; each increment/decrement
    /// lands on the counter individually so the zero floor holds at
    /// every step. Statuses outside the scaling sets are logged and
    /// skipped. If no entry moved the counter the batch is a no-op and
    /// only the current capacity is reported.
    pub async fn apply(&self, batch: &NotificationBatch) -> Result<ScaleOutcome, ScaleError> {
        let cluster = &self.settings.cluster;
        let service = &self.settings.service;

        let state = self.fleet.describe_service(cluster, service).await?;
        info!(
            %cluster,
            %service,
            desired = state.desired_count,
            running = state.running_count,
            "current service count"
        );

        let mut demand = None;
        for status in batch.statuses() {
            match status.effect() {
                DemandEffect::Increment => {
                    demand = Some(self.counter.increment().await?);
                    debug!(%status, "run status adds an agent");
                }
                DemandEffect::Decrement => {
                    demand = Some(self.counter.decrement().await?);
                    debug!(%status, "run status releases an agent");
                }
                DemandEffect::NoChange => {
                    debug!(%status, "run status outside the scaling sets");
                }
            }
        }

        let Some(demand) = demand else {
            return Ok(ScaleOutcome::NoChange {
                current_desired: state.desired_count,
            });
        };

        let desired = self.clamp(demand);
        if let Err(e) = self.fleet.update_service(cluster, service, desired).await {
            // Demand is already persisted; capacity now diverges until
            // the next notification lands. There is no reconciliation
            // loop, so make the divergence visible to operators.
            error!(
                %cluster,
                %service,
                demand,
                desired,
                error = %e,
                "demand recorded but fleet update failed; capacity diverges"
            );
            return Err(e.into());
        }

        info!(demand, desired, "updated service count");
        Ok(ScaleOutcome::Updated { demand, desired })
    }
}
