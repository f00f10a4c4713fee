//! ParamStore trait and the redb-backed implementation.
//!
//! Parameters are plain strings keyed by name (`/gantry/demand`,
//! `/gantry/notification-token`). The trait is the seam between the
//! autoscaler and whatever holds its durable state; the redb backend
//! keeps everything in a single table of `&str → &str`.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use tracing::debug;

use crate::error::{StateError, StateResult};

/// Parameters keyed by name.
const PARAMS: TableDefinition<&str, &str> = TableDefinition::new("params");

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// A durable string key-value parameter store.
///
/// `compare_and_swap` is the only conditional primitive the autoscaler
/// needs: the demand counter's read-modify-write goes through it so that
/// concurrent updates cannot be lost.
#[async_trait]
pub trait ParamStore: Send + Sync {
    /// Read a parameter. `Ok(None)` if it has never been written.
    async fn get(&self, name: &str) -> StateResult<Option<String>>;

    /// Write a parameter unconditionally, creating it if absent.
    async fn put(&self, name: &str, value: &str) -> StateResult<()>;

    /// Write `value` only if the parameter currently equals `expected`
    /// (`None` meaning absent). Returns whether the swap applied.
    async fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<&str>,
        value: &str,
    ) -> StateResult<bool>;
}

/// Thread-safe parameter store backed by redb.
#[derive(Clone)]
pub struct RedbParamStore {
    db: Arc<Database>,
}

impl RedbParamStore {
    /// Open (or create) a persistent parameter store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "parameter store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory parameter store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory parameter store opened");
        Ok(store)
    }

    /// Create the params table if it doesn't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(PARAMS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }
}

#[async_trait]
impl ParamStore for RedbParamStore {
    async fn get(&self, name: &str) -> StateResult<Option<String>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(PARAMS).map_err(map_err!(Table))?;
        let value = table
            .get(name)
            .map_err(map_err!(Read))?
            .map(|guard| guard.value().to_string());
        Ok(value)
    }

    async fn put(&self, name: &str, value: &str) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(PARAMS).map_err(map_err!(Table))?;
            table.insert(name, value).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%name, "parameter stored");
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<&str>,
        value: &str,
    ) -> StateResult<bool> {
        // redb serializes write transactions, so read-compare-insert inside
        // one write transaction is an exact compare-and-swap.
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let swapped;
        {
            let mut table = txn.open_table(PARAMS).map_err(map_err!(Table))?;
            let current = table
                .get(name)
                .map_err(map_err!(Read))?
                .map(|guard| guard.value().to_string());
            if current.as_deref() == expected {
                table.insert(name, value).map_err(map_err!(Write))?;
                swapped = true;
            } else {
                swapped = false;
            }
        }
        if swapped {
            txn.commit().map_err(map_err!(Transaction))?;
        } else {
            txn.abort().map_err(map_err!(Transaction))?;
        }
        Ok(swapped)
    }
}
