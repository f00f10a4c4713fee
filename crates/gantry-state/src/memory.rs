//! In-memory parameter store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StateResult;
use crate::store::ParamStore;

/// HashMap-backed [`ParamStore`] for tests and lightweight wiring.
///
/// The whole map sits behind one async mutex, so `compare_and_swap` is
/// trivially exact.
#[derive(Clone, Default)]
pub struct MemoryParamStore {
    params: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryParamStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParamStore for MemoryParamStore {
    async fn get(&self, name: &str) -> StateResult<Option<String>> {
        Ok(self.params.lock().await.get(name).cloned())
    }

    async fn put(&self, name: &str, value: &str) -> StateResult<()> {
        self.params
            .lock()
            .await
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<&str>,
        value: &str,
    ) -> StateResult<bool> {
        let mut params = self.params.lock().await;
        if params.get(name).map(String::as_str) == expected {
            params.insert(name.to_string(), value.to_string());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn behaves_like_a_store() {
        let store = MemoryParamStore::new();
        assert_eq!(store.get("/k").await.unwrap(), None);

        store.put("/k", "1").await.unwrap();
        assert_eq!(store.get("/k").await.unwrap(), Some("1".to_string()));

        assert!(!store.compare_and_swap("/k", None, "2").await.unwrap());
        assert!(store.compare_and_swap("/k", Some("1"), "2").await.unwrap());
        assert_eq!(store.get("/k").await.unwrap(), Some("2".to_string()));
    }
}
