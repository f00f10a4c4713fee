//! gantry-fleet — orchestrator client for the managed agent service.
//!
//! The container orchestrator owns the agent service; gantry only
//! proposes a new desired count. This crate defines the [`AgentFleet`]
//! trait the reconciler speaks plus two implementations:
//!
//! - [`HttpFleet`] — HTTP client against the orchestrator REST API,
//!   with a bounded per-call timeout.
//! - [`MemoryFleet`] — in-memory service table recording scale calls,
//!   for tests.

pub mod fleet;
pub mod http;
pub mod memory;

pub use fleet::{AgentFleet, FleetError, FleetResult, ServiceState};
pub use http::HttpFleet;
pub use memory::MemoryFleet;
