//! StateStore: redb-backed persistence of instance records.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, DatabaseError, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::INSTANCES;
use crate::types::{InstanceRecord, instance_prefix};

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Registry store backed by a single redb file.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) the registry at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(|e| match e {
            DatabaseError::DatabaseAlreadyOpen => StateError::Busy(path.to_path_buf()),
            other => StateError::Open {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "registry opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(|e| StateError::Open {
                path: ":memory:".into(),
                message: e.to_string(),
            })?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        Ok(store)
    }

    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(INSTANCES).map_err(map_err!(Storage))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Upsert records in one transaction. Existing keys are replaced.
    pub fn put_records(&self, records: &[InstanceRecord]) -> StateResult<()> {
        let encoded = records
            .iter()
            .map(|record| {
                serde_json::to_vec(record)
                    .map(|value| (record.table_key(), value))
                    .map_err(map_err!(Encode))
            })
            .collect::<StateResult<Vec<_>>>()?;

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(INSTANCES).map_err(map_err!(Storage))?;
            for (key, value) in &encoded {
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Storage))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(count = encoded.len(), "records stored");
        Ok(())
    }

    /// All records of one instance, ordered by container name.
    pub fn list_for_instance(&self, instance_name: &str) -> StateResult<Vec<InstanceRecord>> {
        let prefix = instance_prefix(instance_name);
        let mut records = self.scan(|key| key.starts_with(&prefix))?;
        records.sort_by(|a, b| a.container_name.cmp(&b.container_name));
        Ok(records)
    }

    /// Every record, ordered by instance then container name.
    pub fn list_all(&self) -> StateResult<Vec<InstanceRecord>> {
        let mut records = self.scan(|_| true)?;
        records.sort_by(|a, b| {
            a.instance_name
                .cmp(&b.instance_name)
                .then_with(|| a.container_name.cmp(&b.container_name))
        });
        Ok(records)
    }

    fn scan(&self, mut keep: impl FnMut(&str) -> bool) -> StateResult<Vec<InstanceRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(INSTANCES).map_err(map_err!(Storage))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Storage))? {
            let (key, value) = entry.map_err(map_err!(Storage))?;
            if keep(key.value()) {
                results.push(decode(key.value(), value.value())?);
            }
        }
        Ok(results)
    }

    /// Delete every record of an instance. Returns how many were removed.
    pub fn delete_instance(&self, instance_name: &str) -> StateResult<u32> {
        let prefix = instance_prefix(instance_name);
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let count;
        {
            let mut table = txn.open_table(INSTANCES).map_err(map_err!(Storage))?;
            let mut keys = Vec::new();
            for entry in table.iter().map_err(map_err!(Storage))? {
                let (key, _) = entry.map_err(map_err!(Storage))?;
                if key.value().starts_with(&prefix) {
                    keys.push(key.value().to_string());
                }
            }
            for key in &keys {
                table.remove(key.as_str()).map_err(map_err!(Storage))?;
            }
            count = keys.len() as u32;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(instance = instance_name, count, "records deleted");
        Ok(count)
    }
}

fn decode(key: &str, bytes: &[u8]) -> StateResult<InstanceRecord> {
    serde_json::from_slice(bytes).map_err(|e| StateError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })
}
