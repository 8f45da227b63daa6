//! Backend selection and the unified durability surface.

use crate::config::{BackendConfig, BackendKind};
use crate::error::StoreResult;
use crate::file::FileStore;
use crate::sql::SqlStore;
use sodium_codec::{Collection, Database, Record};
use tracing::{info, warn};

/// The durability target active for a process.
///
/// Selected once at startup and never changed afterwards. The two variants
/// persist mutations differently: the file store rewrites the whole
/// container, the SQL store touches individual rows.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Single-file container.
    File(FileStore),
    /// External SQL engine.
    Sql(SqlStore),
}

impl Backend {
    /// Selects a backend per the configuration, with file fallback.
    ///
    /// The configured external backend is tried exactly once. Any
    /// connection or schema failure is logged and demoted to the file
    /// backend — the panel must always be able to start.
    pub async fn select(config: &BackendConfig) -> Backend {
        match config.kind {
            BackendKind::File => Backend::File(FileStore::open(&config.data_dir)),
            BackendKind::Sql(dialect) => match SqlStore::connect(dialect, config).await {
                Ok(store) => {
                    info!(dialect = dialect.name(), "connected to external database");
                    Backend::Sql(store)
                }
                Err(err) => {
                    warn!(
                        dialect = dialect.name(),
                        error = %err,
                        "external database unavailable, falling back to file backend"
                    );
                    Backend::File(FileStore::open(&config.data_dir))
                }
            },
        }
    }

    /// Connects strictly, without fallback.
    ///
    /// Batch tools use this: a migration that silently swapped its target
    /// for the file backend would be worse than failing.
    ///
    /// # Errors
    ///
    /// Returns the connection or schema error for SQL backends; the file
    /// variant cannot fail here.
    pub async fn connect(config: &BackendConfig) -> StoreResult<Backend> {
        match config.kind {
            BackendKind::File => Ok(Backend::File(FileStore::open(&config.data_dir))),
            BackendKind::Sql(dialect) => {
                Ok(Backend::Sql(SqlStore::connect(dialect, config).await?))
            }
        }
    }

    /// Short name of the active backend (`file`, `mysql`, `postgres`,
    /// `sqlite`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Backend::File(_) => "file",
            Backend::Sql(store) => store.dialect().name(),
        }
    }

    /// Whether the backend is relational.
    #[must_use]
    pub fn is_relational(&self) -> bool {
        matches!(self, Backend::Sql(_))
    }

    /// Loads the full dataset.
    ///
    /// # Errors
    ///
    /// Propagates the underlying backend's load error.
    pub async fn load(&self) -> StoreResult<Database> {
        match self {
            Backend::File(store) => store.load(),
            Backend::Sql(store) => store.load_all().await,
        }
    }

    /// Persists the entire dataset wholesale.
    ///
    /// File: one container rewrite. SQL: per-collection delete-and-reinsert.
    ///
    /// # Errors
    ///
    /// Propagates the underlying backend's write error.
    pub async fn save_all(&self, db: &Database) -> StoreResult<()> {
        match self {
            Backend::File(store) => store.save(db),
            Backend::Sql(store) => {
                for &collection in &Collection::ALL {
                    store.sync_collection(collection, db.records(collection)).await?;
                }
                Ok(())
            }
        }
    }

    /// Persists one record after an in-memory insert or update.
    ///
    /// File: full rewrite of `db`. SQL: single-row upsert.
    ///
    /// # Errors
    ///
    /// Propagates the underlying backend's write error.
    pub async fn persist_record(
        &self,
        db: &Database,
        collection: Collection,
        record: &Record,
    ) -> StoreResult<()> {
        match self {
            Backend::File(store) => store.save(db),
            Backend::Sql(store) => store.upsert(collection, record).await,
        }
    }

    /// Persists one record's removal.
    ///
    /// # Errors
    ///
    /// Propagates the underlying backend's write error.
    pub async fn remove_record(
        &self,
        db: &Database,
        collection: Collection,
        id: &str,
    ) -> StoreResult<()> {
        match self {
            Backend::File(store) => store.save(db),
            Backend::Sql(store) => store.delete(collection, id).await,
        }
    }

    /// Persists a bulk collection replacement.
    ///
    /// # Errors
    ///
    /// Propagates the underlying backend's write error.
    pub async fn sync_collection(&self, db: &Database, collection: Collection) -> StoreResult<()> {
        match self {
            Backend::File(store) => store.save(db),
            Backend::Sql(store) => {
                store.sync_collection(collection, db.records(collection)).await?;
                Ok(())
            }
        }
    }

    /// Closes any pooled connections.
    pub async fn close(&self) {
        if let Backend::Sql(store) = self {
            store.close().await;
        }
    }
}
