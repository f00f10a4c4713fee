//! Demand counter — the persisted queued-run count.
//!
//! The counter tracks how many upstream runs are queued or active. It is
//! deliberately *not* clamped to the agent ceiling here: demand above
//! capacity stays recorded so the fleet can grow into it later. The only
//! invariant this module owns is that the value never goes below zero.

use std::sync::Arc;

use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::store::ParamStore;

/// Retries before a contended update gives up.
const CAS_ATTEMPTS: u32 = 8;

/// A non-negative counter persisted as a string parameter.
///
/// Updates are read-modify-write through [`ParamStore::compare_and_swap`],
/// retried on conflict, so two concurrent webhook deliveries each land
/// exactly once. An absent parameter reads as zero and is materialized on
/// the first update.
#[derive(Clone)]
pub struct DemandCounter {
    store: Arc<dyn ParamStore>,
    param: String,
}

impl DemandCounter {
    pub fn new(store: Arc<dyn ParamStore>, param: impl Into<String>) -> Self {
        Self {
            store,
            param: param.into(),
        }
    }

    /// Name of the backing parameter.
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Current demand. Absent parameter reads as zero.
    pub async fn value(&self) -> StateResult<u64> {
        let raw = self.store.get(&self.param).await?;
        self.parse(raw.as_deref())
    }

    /// Add one queued run. Unbounded: demand may exceed the agent ceiling.
    pub async fn increment(&self) -> StateResult<u64> {
        self.adjust(|n| n.saturating_add(1)).await
    }

    /// Release one queued run, flooring at zero.
    pub async fn decrement(&self) -> StateResult<u64> {
        self.adjust(|n| n.saturating_sub(1)).await
    }

    async fn adjust<F>(&self, apply: F) -> StateResult<u64>
    where
        F: Fn(u64) -> u64 + Send,
    {
        for _ in 0..CAS_ATTEMPTS {
            let raw = self.store.get(&self.param).await?;
            let current = self.parse(raw.as_deref())?;
            let next = apply(current);
            let swapped = self
                .store
                .compare_and_swap(&self.param, raw.as_deref(), &next.to_string())
                .await?;
            if swapped {
                debug!(param = %self.param, from = current, to = next, "demand counter updated");
                return Ok(next);
            }
        }
        Err(StateError::Contended(self.param.clone()))
    }

    fn parse(&self, raw: Option<&str>) -> StateResult<u64> {
        match raw {
            None => Ok(0),
            Some(s) => s.trim().parse().map_err(|_| StateError::Parse {
                param: self.param.clone(),
                value: s.to_string(),
            }),
        }
    }
}
