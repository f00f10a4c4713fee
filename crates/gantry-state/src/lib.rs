//! gantry-state — persisted parameters for Gantry.
//!
//! The autoscaler keeps two pieces of durable state in a string
//! key-value parameter store: the notification-signing secret
//! (read-only at runtime) and the demand counter (read-write). This
//! crate defines the [`ParamStore`] trait consumed by the rest of the
//! system plus two implementations:
//!
//! - [`RedbParamStore`] — embedded [redb](https://docs.rs/redb) database,
//!   on-disk or in-memory. redb serializes write transactions, which
//!   makes [`ParamStore::compare_and_swap`] exact.
//! - [`MemoryParamStore`] — a HashMap behind an async mutex, for tests
//!   and lightweight wiring.
//!
//! [`DemandCounter`] layers floor-at-zero counter semantics on top of
//! any store via a compare-and-swap retry loop, so concurrent webhook
//! deliveries cannot lose updates.

pub mod counter;
pub mod error;
pub mod memory;
pub mod store;

pub use counter::DemandCounter;
pub use error::{StateError, StateResult};
pub use memory::MemoryParamStore;
pub use store::{ParamStore, RedbParamStore};
