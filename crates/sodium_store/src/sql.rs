//! Relational backend adapter.
//!
//! Maps the collection model onto an external SQL engine: one table per
//! canonical collection, three logical columns — the record id as primary
//! key, an opaque JSON payload, and server-maintained timestamps. The id is
//! split out of the payload for indexing and merged back in on read.

use crate::config::BackendConfig;
use crate::error::{StoreError, StoreResult};
use sodium_codec::{Collection, Database, Record};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool};
use sqlx::postgres::{PgConnectOptions, PgPool};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

/// A supported SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// MySQL or MariaDB.
    MySql,
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    Sqlite,
}

impl Dialect {
    /// A short stable name for logs and selector matching.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// The dialect's conventional port.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Dialect::MySql => 3306,
            Dialect::Postgres => 5432,
            Dialect::Sqlite => 0,
        }
    }
}

impl FromStr for Dialect {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(StoreError::unknown_backend(other)),
        }
    }
}

#[derive(Debug, Clone)]
enum Pool {
    MySql(MySqlPool),
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// A connected relational backend.
#[derive(Debug, Clone)]
pub struct SqlStore {
    dialect: Dialect,
    pool: Pool,
}

impl SqlStore {
    /// Connects to the engine described by `config` and ensures the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema creation fails; at
    /// startup the caller treats that as a cue to fall back to the file
    /// backend.
    pub async fn connect(dialect: Dialect, config: &BackendConfig) -> StoreResult<Self> {
        let port = config.port.unwrap_or(dialect.default_port());
        let pool = match dialect {
            Dialect::MySql => {
                let options = MySqlConnectOptions::new()
                    .host(&config.host)
                    .port(port)
                    .username(&config.user)
                    .password(&config.password)
                    .database(&config.database);
                Pool::MySql(MySqlPool::connect_with(options).await?)
            }
            Dialect::Postgres => {
                let options = PgConnectOptions::new()
                    .host(&config.host)
                    .port(port)
                    .username(&config.user)
                    .password(&config.password)
                    .database(&config.database);
                Pool::Postgres(PgPool::connect_with(options).await?)
            }
            Dialect::Sqlite => {
                let options = SqliteConnectOptions::new()
                    .filename(config.sqlite_path())
                    .create_if_missing(true);
                Pool::Sqlite(SqlitePool::connect_with(options).await?)
            }
        };

        let store = Self { dialect, pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// The connected dialect.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Creates every collection table if it does not already exist.
    ///
    /// Idempotent; issued once at connect time and again by the migration
    /// tool before bulk writes.
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for &collection in &Collection::ALL {
            let table = collection.name();
            let ddl = match self.dialect {
                Dialect::MySql => format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id VARCHAR(255) PRIMARY KEY,
                        data JSON NOT NULL,
                        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
                    )"
                ),
                Dialect::Postgres => format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id VARCHAR(255) PRIMARY KEY,
                        data JSONB NOT NULL,
                        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                    )"
                ),
                Dialect::Sqlite => format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id TEXT PRIMARY KEY,
                        data TEXT NOT NULL,
                        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                        updated_at TEXT DEFAULT CURRENT_TIMESTAMP
                    )"
                ),
            };
            self.execute(&ddl, &[]).await?;
        }
        Ok(())
    }

    /// Loads every collection into a database image.
    ///
    /// A table that cannot be read (for example, not yet created on a
    /// pre-existing database) yields an empty collection; a row whose
    /// payload fails to parse is dropped with a warning.
    ///
    /// # Errors
    ///
    /// Infallible per table by design, but kept fallible for connection
    /// acquisition failures surfaced by the driver.
    pub async fn load_all(&self) -> StoreResult<Database> {
        let mut db = Database::new();

        for &collection in &Collection::ALL {
            let table = collection.name();
            let select = match self.dialect {
                Dialect::MySql => format!("SELECT id, CAST(data AS CHAR) AS data FROM {table}"),
                Dialect::Postgres => format!("SELECT id, data::text AS data FROM {table}"),
                Dialect::Sqlite => format!("SELECT id, data FROM {table}"),
            };

            let rows = match self.fetch_all(&select).await {
                Ok(rows) => rows,
                Err(err) => {
                    warn!(table, error = %err, "failed to read table, treating as empty");
                    db.set_records(collection, Vec::new());
                    continue;
                }
            };

            let mut records = Vec::with_capacity(rows.len());
            for (id, payload) in rows {
                match Record::from_row(&id, &payload) {
                    Ok(record) => records.push(record),
                    Err(err) => warn!(table, id, error = %err, "dropping unparsable row"),
                }
            }
            db.set_records(collection, records);
        }

        Ok(db)
    }

    /// Inserts or replaces a single record, keyed by its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingId`] if the record has no string `id`,
    /// or the driver's error if the statement fails.
    pub async fn upsert(&self, collection: Collection, record: &Record) -> StoreResult<()> {
        let (id, payload) = record
            .split_for_row()
            .ok_or_else(|| StoreError::missing_id(collection.name()))?;
        let table = collection.name();

        match self.dialect {
            Dialect::MySql => {
                let sql = format!(
                    "INSERT INTO {table} (id, data) VALUES (?, ?)
                     ON DUPLICATE KEY UPDATE data = ?, updated_at = CURRENT_TIMESTAMP"
                );
                self.execute(&sql, &[&id, &payload, &payload]).await?;
            }
            Dialect::Postgres => {
                let sql = format!(
                    "INSERT INTO {table} (id, data) VALUES ($1, $2::jsonb)
                     ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, updated_at = CURRENT_TIMESTAMP"
                );
                self.execute(&sql, &[&id, &payload]).await?;
            }
            Dialect::Sqlite => {
                let sql = format!(
                    "INSERT OR REPLACE INTO {table} (id, data, updated_at)
                     VALUES (?, ?, CURRENT_TIMESTAMP)"
                );
                self.execute(&sql, &[&id, &payload]).await?;
            }
        }
        Ok(())
    }

    /// Deletes a record by id. Deleting an absent id is not an error.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the statement fails.
    pub async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let table = collection.name();
        let sql = match self.dialect {
            Dialect::Postgres => format!("DELETE FROM {table} WHERE id = $1"),
            _ => format!("DELETE FROM {table} WHERE id = ?"),
        };
        self.execute(&sql, &[&id.to_string()]).await?;
        Ok(())
    }

    /// Replaces a table's contents with the given records.
    ///
    /// This is the relational equivalent of the file backend's full rewrite:
    /// delete everything, then re-insert. Records without an id are skipped
    /// with a warning; the returned count is the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if any statement fails; a partial sync is
    /// not rolled back (no multi-statement transactionality by design).
    pub async fn sync_collection(
        &self,
        collection: Collection,
        records: &[Record],
    ) -> StoreResult<usize> {
        let table = collection.name();
        self.execute(&format!("DELETE FROM {table}"), &[]).await?;

        let mut written = 0;
        for record in records {
            if record.split_for_row().is_none() {
                warn!(table, "skipping record without id during sync");
                continue;
            }
            self.upsert(collection, record).await?;
            written += 1;
        }
        Ok(written)
    }

    /// Closes the underlying pool.
    pub async fn close(&self) {
        match &self.pool {
            Pool::MySql(pool) => pool.close().await,
            Pool::Postgres(pool) => pool.close().await,
            Pool::Sqlite(pool) => pool.close().await,
        }
    }

    async fn execute(&self, sql: &str, params: &[&String]) -> StoreResult<()> {
        match &self.pool {
            Pool::MySql(pool) => {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = query.bind(param.as_str());
                }
                query.execute(pool).await?;
            }
            Pool::Postgres(pool) => {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = query.bind(param.as_str());
                }
                query.execute(pool).await?;
            }
            Pool::Sqlite(pool) => {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = query.bind(param.as_str());
                }
                query.execute(pool).await?;
            }
        }
        Ok(())
    }

    async fn fetch_all(&self, sql: &str) -> StoreResult<Vec<(String, String)>> {
        let rows = match &self.pool {
            Pool::MySql(pool) => sqlx::query(sql)
                .fetch_all(pool)
                .await?
                .into_iter()
                .map(|row| Ok((row.try_get("id")?, row.try_get("data")?)))
                .collect::<Result<Vec<_>, sqlx::Error>>()?,
            Pool::Postgres(pool) => sqlx::query(sql)
                .fetch_all(pool)
                .await?
                .into_iter()
                .map(|row| Ok((row.try_get("id")?, row.try_get("data")?)))
                .collect::<Result<Vec<_>, sqlx::Error>>()?,
            Pool::Sqlite(pool) => sqlx::query(sql)
                .fetch_all(pool)
                .await?
                .into_iter()
                .map(|row| Ok((row.try_get("id")?, row.try_get("data")?)))
                .collect::<Result<Vec<_>, sqlx::Error>>()?,
        };
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    async fn sqlite_store(dir: &std::path::Path) -> SqlStore {
        let config = BackendConfig::file(dir);
        SqlStore::connect(Dialect::Sqlite, &config).await.unwrap()
    }

    #[tokio::test]
    async fn upsert_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(dir.path()).await;

        let r = record(json!({"id": "a", "name": "x"}));
        store.upsert(Collection::Servers, &r).await.unwrap();

        let db = store.load_all().await.unwrap();
        assert_eq!(db.records(Collection::Servers), &[r]);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(dir.path()).await;

        store
            .upsert(Collection::Users, &record(json!({"id": "u1", "username": "old"})))
            .await
            .unwrap();
        store
            .upsert(Collection::Users, &record(json!({"id": "u1", "username": "new"})))
            .await
            .unwrap();

        let db = store.load_all().await.unwrap();
        let users = db.records(Collection::Users);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].get("username"), Some(&json!("new")));
    }

    #[tokio::test]
    async fn stored_payload_excludes_id() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(dir.path()).await;

        store
            .upsert(Collection::Nodes, &record(json!({"id": "n1", "fqdn": "a.example"})))
            .await
            .unwrap();

        let rows = store.fetch_all("SELECT id, data FROM nodes").await.unwrap();
        assert_eq!(rows.len(), 1);
        let payload: serde_json::Value = serde_json::from_str(&rows[0].1).unwrap();
        assert!(payload.get("id").is_none());
        assert_eq!(payload["fqdn"], json!("a.example"));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(dir.path()).await;

        store
            .upsert(Collection::Eggs, &record(json!({"id": "e1"})))
            .await
            .unwrap();
        store.delete(Collection::Eggs, "e1").await.unwrap();
        store.delete(Collection::Eggs, "never-existed").await.unwrap();

        let db = store.load_all().await.unwrap();
        assert!(db.records(Collection::Eggs).is_empty());
    }

    #[tokio::test]
    async fn sync_collection_replaces_contents() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(dir.path()).await;

        store
            .upsert(Collection::Locations, &record(json!({"id": "old"})))
            .await
            .unwrap();

        let replacement = vec![
            record(json!({"id": "l1", "short": "eu"})),
            record(json!({"id": "l2", "short": "us"})),
            record(json!({"short": "no-id"})),
        ];
        let written = store
            .sync_collection(Collection::Locations, &replacement)
            .await
            .unwrap();
        assert_eq!(written, 2);

        let db = store.load_all().await.unwrap();
        let ids: Vec<_> = db
            .records(Collection::Locations)
            .iter()
            .filter_map(Record::id)
            .collect();
        assert_eq!(ids, vec!["l1", "l2"]);
    }

    #[tokio::test]
    async fn upsert_without_id_is_an_error() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(dir.path()).await;

        let result = store
            .upsert(Collection::Users, &record(json!({"username": "ghost"})))
            .await;
        assert!(matches!(result, Err(StoreError::MissingId { .. })));
    }
}
