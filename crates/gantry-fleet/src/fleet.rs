//! AgentFleet trait and fleet error taxonomy.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for fleet operations.
pub type FleetResult<T> = Result<T, FleetError>;

/// Errors from orchestrator calls. Every variant is a distinguishable
/// upstream failure; none are swallowed.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("orchestrator call timed out after {after:?}: {uri}")]
    Timeout { uri: String, after: Duration },

    #[error("orchestrator request failed: {0}")]
    Http(String),

    #[error("orchestrator returned {status} for {uri}")]
    Status { uri: String, status: u16 },

    #[error("unknown service {cluster}/{service}")]
    UnknownService { cluster: String, service: String },

    #[error("could not decode orchestrator response: {0}")]
    Decode(String),
}

/// A snapshot of the managed service as the orchestrator sees it.
///
/// `desired_count` is the replica count the orchestrator is converging
/// toward; `running_count` is what it has actually placed so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceState {
    pub cluster: String,
    pub service: String,
    pub desired_count: u32,
    #[serde(default)]
    pub running_count: u32,
}

/// The orchestrator surface gantry consumes: describe the managed
/// service, and propose a new desired replica count for it.
#[async_trait]
pub trait AgentFleet: Send + Sync {
    /// Current state of the service.
    async fn describe_service(&self, cluster: &str, service: &str) -> FleetResult<ServiceState>;

    /// Set the service's desired replica count.
    async fn update_service(&self, cluster: &str, service: &str, desired: u32) -> FleetResult<()>;
}
