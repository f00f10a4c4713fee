//! gantry-scale — capacity reconciliation.
//!
//! Folds the run statuses of a notification batch into the demand
//! counter, clamps the resulting demand against the configured agent
//! ceiling, and pushes the clamped value to the orchestrator:
//!
//! ```text
//! desired = min(demand, max_agents)
//! ```
//!
//! Demand above the ceiling stays in the counter; the fleet grows into
//! it as ceilinged capacity frees up.

pub mod reconciler;

pub use reconciler::{Reconciler, ScaleError, ScaleOutcome};
