//! In-memory fleet.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::fleet::{AgentFleet, FleetError, FleetResult, ServiceState};

#[derive(Default)]
struct Inner {
    services: HashMap<(String, String), ServiceState>,
    updates: Vec<u32>,
}

/// [`AgentFleet`] backed by an in-memory service table.
///
/// Records every desired count it is asked to apply, so tests can
/// assert on the exact sequence of scale calls.
#[derive(Clone, Default)]
pub struct MemoryFleet {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryFleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a service with an initial desired count.
    pub async fn insert_service(&self, cluster: &str, service: &str, desired: u32) {
        let mut inner = self.inner.lock().await;
        inner.services.insert(
            (cluster.to_string(), service.to_string()),
            ServiceState {
                cluster: cluster.to_string(),
                service: service.to_string(),
                desired_count: desired,
                running_count: desired,
            },
        );
    }

    /// Desired counts applied so far, in call order.
    pub async fn updates(&self) -> Vec<u32> {
        self.inner.lock().await.updates.clone()
    }

    /// Current desired count of a seeded service.
    pub async fn desired(&self, cluster: &str, service: &str) -> Option<u32> {
        let inner = self.inner.lock().await;
        inner
            .services
            .get(&(cluster.to_string(), service.to_string()))
            .map(|s| s.desired_count)
    }
}

#[async_trait]
impl AgentFleet for MemoryFleet {
    async fn describe_service(&self, cluster: &str, service: &str) -> FleetResult<ServiceState> {
        let inner = self.inner.lock().await;
        inner
            .services
            .get(&(cluster.to_string(), service.to_string()))
            .cloned()
            .ok_or_else(|| FleetError::UnknownService {
                cluster: cluster.to_string(),
                service: service.to_string(),
            })
    }

    async fn update_service(&self, cluster: &str, service: &str, desired: u32) -> FleetResult<()> {
        let mut inner = self.inner.lock().await;
        let state = inner
            .services
            .get_mut(&(cluster.to_string(), service.to_string()))
            .ok_or_else(|| FleetError::UnknownService {
                cluster: cluster.to_string(),
                service: service.to_string(),
            })?;
        state.desired_count = desired;
        inner.updates.push(desired);
        Ok(())
    }
}
