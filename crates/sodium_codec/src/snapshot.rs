//! Snapshot JSON format for backup, export, and import tooling.

use crate::collection::Collection;
use crate::database::Database;
use crate::error::{CodecError, CodecResult};
use crate::record::Record;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Snapshot format version written by this crate.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Which tool produced the snapshot.
///
/// The formats are identical apart from the timestamp key: backups write
/// `createdAt`, exports write `exportedAt`. Parsing accepts either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// A retention-managed backup (`createdAt`).
    Backup,
    /// A one-off export (`exportedAt`).
    Export,
}

impl SnapshotKind {
    fn timestamp_key(self) -> &'static str {
        match self {
            SnapshotKind::Backup => "createdAt",
            SnapshotKind::Export => "exportedAt",
        }
    }
}

/// A redacted, timestamped JSON image of a full dataset.
///
/// Layout: `{ version, createdAt|exportedAt, config?, <collection>: [...] }`
/// with every canonical collection present as a top-level array.
#[derive(Debug)]
pub struct Snapshot {
    /// Format version string.
    pub version: String,
    /// The collections.
    pub database: Database,
    /// The panel configuration document, if the tool captured it.
    pub config: Option<Value>,
}

impl Snapshot {
    /// Builds a snapshot around a dataset.
    ///
    /// Redaction is the caller's responsibility (see [`crate::redact_database`]);
    /// the snapshot itself is format only.
    #[must_use]
    pub fn new(database: Database, config: Option<Value>) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            database,
            config,
        }
    }

    /// Serializes the snapshot, stamping the current time.
    #[must_use]
    pub fn to_value(&self, kind: SnapshotKind) -> Value {
        let mut root = Map::new();
        root.insert("version".to_string(), Value::String(self.version.clone()));
        root.insert(
            kind.timestamp_key().to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        if let Some(config) = &self.config {
            root.insert("config".to_string(), config.clone());
        }
        for &collection in &Collection::ALL {
            let records: Vec<Value> = self
                .database
                .records(collection)
                .iter()
                .cloned()
                .map(Value::from)
                .collect();
            root.insert(collection.name().to_string(), Value::Array(records));
        }
        Value::Object(root)
    }

    /// Parses a snapshot document.
    ///
    /// Collections absent from the document read as empty; entries that are
    /// not JSON objects are dropped, mirroring the decoder's corrupt-record
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a JSON object.
    pub fn from_value(value: Value) -> CodecResult<Self> {
        let mut root = match value {
            Value::Object(map) => map,
            _ => return Err(CodecError::invalid_snapshot("document is not a JSON object")),
        };

        let version = match root.remove("version") {
            Some(Value::String(v)) => v,
            _ => SNAPSHOT_VERSION.to_string(),
        };
        let config = root.remove("config");

        let mut database = Database::new();
        for &collection in &Collection::ALL {
            if let Some(Value::Array(entries)) = root.remove(collection.name()) {
                let records = entries.into_iter().filter_map(Record::from_value).collect();
                database.set_records(collection, records);
            }
        }

        Ok(Self {
            version,
            database,
            config,
        })
    }
}
