//! The process-wide collection cache.

use crate::error::CoreResult;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use sodium_codec::{Collection, Database, Record};
use sodium_store::{Backend, BackendConfig};
use tracing::debug;

/// In-memory cache over the active durability backend.
///
/// One `Store` exists per process, owned by the composition root and handed
/// to request handlers by reference. Reads are pure in-memory scans; every
/// mutation updates the cache first and then writes through — a full
/// container rewrite on the file backend, a single-row statement on a
/// relational one.
///
/// Two concurrent mutations against a relational backend are not fenced
/// against each other; the panel's single-operator usage accepts that race.
pub struct Store {
    backend: Backend,
    cache: RwLock<Database>,
}

impl Store {
    /// Selects a backend from the configuration, loads the full dataset,
    /// and returns the ready store.
    ///
    /// Backend selection happens exactly once: the configured external
    /// backend is tried, and any failure falls back to the file container.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected backend fails to load.
    pub async fn open(config: &BackendConfig) -> CoreResult<Self> {
        let backend = Backend::select(config).await;
        Self::with_backend(backend).await
    }

    /// Builds a store over an already-selected backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial load fails.
    pub async fn with_backend(backend: Backend) -> CoreResult<Self> {
        let database = backend.load().await?;
        debug!(
            backend = backend.kind(),
            records = database.record_count(),
            "store loaded"
        );
        Ok(Self {
            backend,
            cache: RwLock::new(database),
        })
    }

    /// Short name of the active backend.
    #[must_use]
    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    /// Returns a copy of every record in a collection.
    #[must_use]
    pub fn get_all(&self, collection: Collection) -> Vec<Record> {
        self.cache.read().records(collection).to_vec()
    }

    /// Number of records in a collection.
    #[must_use]
    pub fn count(&self, collection: Collection) -> usize {
        self.cache.read().records(collection).len()
    }

    /// Finds a record by its `id` field. Linear scan.
    #[must_use]
    pub fn find_by_id(&self, collection: Collection, id: &str) -> Option<Record> {
        self.cache
            .read()
            .records(collection)
            .iter()
            .find(|r| r.id() == Some(id))
            .cloned()
    }

    /// Returns every record whose `field` equals `value`. Linear scan.
    #[must_use]
    pub fn find_by_field(&self, collection: Collection, field: &str, value: &Value) -> Vec<Record> {
        self.cache
            .read()
            .records(collection)
            .iter()
            .filter(|r| r.get(field) == Some(value))
            .cloned()
            .collect()
    }

    /// Appends a record and writes through.
    ///
    /// Identifier uniqueness is the caller's contract; the store does not
    /// check for duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error if durability fails; the cache keeps the record
    /// either way.
    pub async fn insert(&self, collection: Collection, record: Record) -> CoreResult<Record> {
        let snapshot = {
            let mut cache = self.cache.write();
            cache.records_mut(collection).push(record.clone());
            cache.clone()
        };
        self.backend
            .persist_record(&snapshot, collection, &record)
            .await?;
        Ok(record)
    }

    /// Shallow-merges `updates` into the record with the given id.
    ///
    /// Fields in `updates` overwrite existing values; fields not mentioned
    /// are preserved. Returns the updated record, or `None` if no record
    /// has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if durability fails.
    pub async fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        updates: Map<String, Value>,
    ) -> CoreResult<Option<Record>> {
        let (snapshot, updated) = {
            let mut cache = self.cache.write();
            let records = cache.records_mut(collection);
            let Some(record) = records.iter_mut().find(|r| r.id() == Some(id)) else {
                return Ok(None);
            };
            record.merge(updates);
            let updated = record.clone();
            (cache.clone(), updated)
        };
        self.backend
            .persist_record(&snapshot, collection, &updated)
            .await?;
        Ok(Some(updated))
    }

    /// Removes the record with the given id.
    ///
    /// Returns `false` if no record had that id (and nothing is persisted).
    ///
    /// # Errors
    ///
    /// Returns an error if durability fails.
    pub async fn delete_by_id(&self, collection: Collection, id: &str) -> CoreResult<bool> {
        let snapshot = {
            let mut cache = self.cache.write();
            let records = cache.records_mut(collection);
            let Some(index) = records.iter().position(|r| r.id() == Some(id)) else {
                return Ok(false);
            };
            records.remove(index);
            cache.clone()
        };
        self.backend.remove_record(&snapshot, collection, id).await?;
        Ok(true)
    }

    /// Replaces a collection wholesale.
    ///
    /// This is the bulk path used after imports and admin-side rebuilds: a
    /// full container rewrite on the file backend, a delete-and-reinsert
    /// sync on a relational one.
    ///
    /// # Errors
    ///
    /// Returns an error if durability fails.
    pub async fn replace_all(&self, collection: Collection, records: Vec<Record>) -> CoreResult<()> {
        let snapshot = {
            let mut cache = self.cache.write();
            cache.set_records(collection, records);
            cache.clone()
        };
        self.backend.sync_collection(&snapshot, collection).await?;
        Ok(())
    }
}
