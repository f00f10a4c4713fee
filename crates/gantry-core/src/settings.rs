//! Daemon settings.

use serde::{Deserialize, Serialize};

/// Immutable per-process scaling settings.
///
/// Assembled once at startup (flags with `GANTRY_*` environment
/// fallbacks) and threaded through the handler context; never mutated
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Cluster the managed agent service runs in.
    pub cluster: String,
    /// Service whose desired count gantry drives.
    pub service: String,
    /// Optional region hint forwarded to the orchestrator.
    pub region: Option<String>,
    /// Ceiling on the desired agent count. Demand above this is queued,
    /// not scheduled.
    pub max_agents: u32,
    /// Name of the parameter holding the notification-signing secret.
    pub token_param: String,
    /// Name of the parameter holding the demand counter.
    pub counter_param: String,
}
