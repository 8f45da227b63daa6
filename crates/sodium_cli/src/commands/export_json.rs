//! JSON export.

use super::read_container;
use sodium_codec::{redact_database, Snapshot, SnapshotKind};
use std::fs;
use std::path::Path;

/// Exports the full dataset as a redacted snapshot.
///
/// The payload goes to `output`, or to stdout when no path is given; status
/// and the per-collection summary go to stderr so piping stdout stays
/// clean.
pub fn run(
    data_dir: &Path,
    output: Option<&Path>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Exporting Sodium data to JSON...");

    let mut db = read_container(data_dir)?;
    redact_database(&mut db);

    let snapshot = Snapshot::new(db.clone(), None).to_value(SnapshotKind::Export);
    let json = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };

    match output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("✓ Exported to {}", path.display());
        }
        None => println!("{json}"),
    }

    let mut total = 0;
    for (collection, count) in db.counts() {
        if count > 0 {
            eprintln!("  {collection}: {count}");
            total += count;
        }
    }
    eprintln!("  Total: {total} records");

    Ok(())
}
