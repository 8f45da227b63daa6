//! Single-file container backend.

use crate::error::StoreResult;
use sodium_codec::{decode_database, encode_database, CodecError, Collection, Database, Record};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the container file inside the data directory.
pub const DB_FILE_NAME: &str = "sodium.db";

/// Collections that existed before the binary container, each stored as a
/// standalone `<name>.json` file. Consumed once on first load, then deleted.
const LEGACY_COLLECTIONS: [Collection; 6] = [
    Collection::Users,
    Collection::Nodes,
    Collection::Servers,
    Collection::Nests,
    Collection::Eggs,
    Collection::Locations,
];

/// The file backend: one binary container holding every collection.
///
/// Writes are whole-file rewrites — every mutation re-encodes the entire
/// dataset, bounding write cost by database size rather than mutation size.
/// Saves go through a temp file in the same directory followed by a rename,
/// so a crash mid-write never truncates the previous container.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
    db_path: PathBuf,
}

impl FileStore {
    /// Creates a file store rooted at `data_dir`.
    ///
    /// The directory is created lazily on first save; opening never touches
    /// the filesystem.
    #[must_use]
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let db_path = data_dir.join(DB_FILE_NAME);
        Self { data_dir, db_path }
    }

    /// Path of the container file.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Loads the full dataset.
    ///
    /// If the container is missing or does not carry the magic signature,
    /// a one-time migration from the legacy per-collection JSON layout runs
    /// (absent legacy files mean an empty start), and the result is
    /// persisted as a fresh container. A valid container declaring fewer
    /// than the canonical ten collections is re-encoded on the spot to
    /// up-version the file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or a container truncated after a
    /// valid header.
    pub fn load(&self) -> StoreResult<Database> {
        let bytes = match fs::read(&self.db_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return self.migrate_legacy();
            }
            Err(err) => return Err(err.into()),
        };

        let report = match decode_database(&bytes) {
            Ok(report) => report,
            Err(CodecError::BadMagic) => return self.migrate_legacy(),
            Err(err) => return Err(err.into()),
        };

        if report.skipped_records > 0 {
            warn!(
                skipped = report.skipped_records,
                path = %self.db_path.display(),
                "dropped corrupt records while loading container"
            );
        }

        if usize::from(report.declared_collections) < Collection::ALL.len() {
            info!(
                declared = report.declared_collections,
                "container predates the full collection set, rewriting"
            );
            self.save(&report.database)?;
        }

        Ok(report.database)
    }

    /// Persists the full dataset, replacing the container file.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the file cannot be written.
    pub fn save(&self, db: &Database) -> StoreResult<()> {
        let bytes = encode_database(db)?;
        fs::create_dir_all(&self.data_dir)?;

        let tmp_path = self.db_path.with_extension("db.tmp");
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, &self.db_path)?;
        Ok(())
    }

    fn migrate_legacy(&self) -> StoreResult<Database> {
        let mut db = Database::new();
        let mut migrated = 0usize;

        for collection in LEGACY_COLLECTIONS {
            let path = self.data_dir.join(format!("{}.json", collection.name()));
            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };

            // A malformed legacy file loses its records rather than
            // blocking startup; the file is still consumed.
            let records = serde_json::from_str::<serde_json::Value>(&contents)
                .ok()
                .and_then(|mut root| root.get_mut(collection.name()).map(serde_json::Value::take))
                .and_then(|list| match list {
                    serde_json::Value::Array(entries) => Some(
                        entries
                            .into_iter()
                            .filter_map(Record::from_value)
                            .collect::<Vec<_>>(),
                    ),
                    _ => None,
                })
                .unwrap_or_default();

            db.set_records(collection, records);
            fs::remove_file(&path)?;
            migrated += 1;
        }

        if migrated > 0 {
            info!(files = migrated, "migrated legacy per-collection JSON files");
        }
        self.save(&db)?;
        Ok(db)
    }
}
