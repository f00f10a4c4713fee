//! Notification payload types.
//!
//! Wire shape of the run-status webhook body. Only `run_status` inside
//! each notification entry drives scaling; the remaining fields are
//! metadata carried for logging. Unknown JSON fields are ignored, and a
//! body without any recognizable status degrades to a no-op upstream.

use serde::{Deserialize, Serialize};

use crate::status::RunStatus;

/// A webhook delivery: run metadata plus one or more notification entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationBatch {
    #[serde(default)]
    pub notifications: Vec<RunNotification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
}

/// One notification entry inside a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunNotification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_status: Option<RunStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_updated_at: Option<String>,
}

impl NotificationBatch {
    /// Iterate the run statuses present in this batch, in delivery order.
    pub fn statuses(&self) -> impl Iterator<Item = &RunStatus> {
        self.notifications
            .iter()
            .filter_map(|n| n.run_status.as_ref())
    }

    /// Whether any entry carries a run status at all.
    pub fn has_status(&self) -> bool {
        self.statuses().next().is_some()
    }
}
