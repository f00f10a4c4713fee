//! gantry-core — shared types for the Gantry autoscaler.
//!
//! Holds the domain vocabulary every other crate speaks: run-status
//! classification, the notification wire payload, and the immutable
//! per-process settings.

pub mod notification;
pub mod settings;
pub mod status;

pub use notification::{NotificationBatch, RunNotification};
pub use settings::Settings;
pub use status::{DemandEffect, RunStatus};
