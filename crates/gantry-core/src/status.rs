//! Run-status classification.
//!
//! Upstream runs move through lifecycle statuses; a subset of those
//! statuses drives the demand counter. `pending` means a run is queued
//! and waiting for an agent; the terminal statuses mean a queued or
//! active run has left the system.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an upstream run, as delivered in notification
/// payloads.
///
/// The enum is closed over the statuses that affect scaling. Every other
/// status string is preserved verbatim in [`RunStatus::Other`] so callers
/// can log it without failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    /// Run is queued and waiting for an agent to pick it up.
    Pending,
    /// Run failed with an error.
    Errored,
    /// Run was canceled.
    Canceled,
    /// Run was discarded without being applied.
    Discarded,
    /// Plan-only run finished with nothing to apply.
    PlannedAndFinished,
    /// Run was applied successfully.
    Applied,
    /// Run completed.
    Completed,
    /// Any status outside the scaling sets (e.g. `planning`).
    Other(String),
}

/// Effect of a single run-status transition on the demand counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandEffect {
    /// One more run is waiting; an additional agent is wanted.
    Increment,
    /// A run left the queue; one agent's worth of demand is released.
    Decrement,
    /// Status does not affect demand.
    NoChange,
}

impl RunStatus {
    /// Parse a status string. Unrecognized values become [`RunStatus::Other`].
    pub fn parse(s: &str) -> RunStatus {
        match s {
            "pending" => RunStatus::Pending,
            "errored" => RunStatus::Errored,
            "canceled" => RunStatus::Canceled,
            "discarded" => RunStatus::Discarded,
            "planned_and_finished" => RunStatus::PlannedAndFinished,
            "applied" => RunStatus::Applied,
            "completed" => RunStatus::Completed,
            other => RunStatus::Other(other.to_string()),
        }
    }

    /// The wire form of this status.
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Errored => "errored",
            RunStatus::Canceled => "canceled",
            RunStatus::Discarded => "discarded",
            RunStatus::PlannedAndFinished => "planned_and_finished",
            RunStatus::Applied => "applied",
            RunStatus::Completed => "completed",
            RunStatus::Other(s) => s,
        }
    }

    /// Classify this status into its effect on the demand counter.
    ///
    /// The match is exhaustive over the increment/decrement/unknown
    /// partition, so adding a variant forces a classification decision.
    pub fn effect(&self) -> DemandEffect {
        match self {
            RunStatus::Pending => DemandEffect::Increment,
            RunStatus::Errored
            | RunStatus::Canceled
            | RunStatus::Discarded
            | RunStatus::PlannedAndFinished
            | RunStatus::Applied
            | RunStatus::Completed => DemandEffect::Decrement,
            RunStatus::Other(_) => DemandEffect::NoChange,
        }
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        RunStatus::parse(&s)
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
