//! Snapshot restore into the container file.

use super::{confirm, print_counts};
use sodium_codec::{is_importable_user, Collection, Snapshot};
use sodium_store::FileStore;
use std::fs;
use std::path::Path;

/// Restores a JSON snapshot, replacing the container contents.
///
/// Users whose password was redacted at export time are dropped: importing
/// them would leave accounts nobody can log into. Everything else in the
/// snapshot is taken as-is.
pub fn run(data_dir: &Path, input: &Path, yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("Sodium Import from JSON");

    let contents = fs::read_to_string(input)
        .map_err(|err| format!("cannot read {}: {err}", input.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;
    let snapshot = Snapshot::from_value(value)?;
    let mut db = snapshot.database;

    let users = db.records_mut(Collection::Users);
    let before = users.len();
    users.retain(is_importable_user);
    let skipped = before - users.len();
    if skipped > 0 {
        println!("  Warning: Skipped {skipped} users with redacted passwords");
    }

    if !confirm("This will overwrite existing data. Continue?", yes)? {
        println!("Aborted.");
        return Ok(());
    }

    FileStore::open(data_dir).save(&db)?;

    print_counts(&db);
    println!("✓ Import complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sodium_codec::{decode_database, REDACTED};
    use sodium_store::DB_FILE_NAME;
    use tempfile::tempdir;

    #[test]
    fn import_writes_container_and_drops_redacted_users() {
        let data = tempdir().unwrap();
        let snapshot = serde_json::json!({
            "version": "1.0",
            "users": [
                {"id": "u1", "password": "$2b$real"},
                {"id": "u2", "password": REDACTED},
                {"id": "u3"},
            ],
            "servers": [{"id": "s1", "name": "game"}],
        });
        let input = data.path().join("snapshot.json");
        fs::write(&input, snapshot.to_string()).unwrap();

        run(data.path(), &input, true).unwrap();

        let bytes = fs::read(data.path().join(DB_FILE_NAME)).unwrap();
        let db = decode_database(&bytes).unwrap().database;
        let users = db.records(Collection::Users);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id(), Some("u1"));
        assert_eq!(db.records(Collection::Servers).len(), 1);
    }

    #[test]
    fn import_rejects_non_snapshot_documents() {
        let data = tempdir().unwrap();
        let input = data.path().join("bad.json");
        fs::write(&input, "[1, 2, 3]").unwrap();
        assert!(run(data.path(), &input, true).is_err());
    }

    #[test]
    fn import_of_missing_file_is_an_error() {
        let data = tempdir().unwrap();
        assert!(run(data.path(), &data.path().join("nope.json"), true).is_err());
    }
}
