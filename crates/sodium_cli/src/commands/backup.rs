//! Timestamped backup snapshots with retention.

use super::{print_counts, read_container};
use chrono::Utc;
use sodium_codec::{redact_config, redact_database, Snapshot, SnapshotKind};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Creates a backup snapshot and prunes old ones.
///
/// The snapshot carries the redacted dataset plus the redacted panel
/// config. Filenames embed a sortable timestamp, so retention is a simple
/// name sort: everything beyond the newest `keep` files is deleted.
pub fn run(
    data_dir: &Path,
    backup_dir: &Path,
    keep: usize,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !quiet {
        println!("Sodium Backup");
    }

    let mut db = read_container(data_dir)?;
    redact_database(&mut db);

    let config = match fs::read_to_string(data_dir.join("config.json")) {
        Ok(contents) => serde_json::from_str(&contents).ok().map(|mut value| {
            redact_config(&mut value);
            value
        }),
        Err(_) => None,
    };

    let snapshot = Snapshot::new(db, config).to_value(SnapshotKind::Backup);

    fs::create_dir_all(backup_dir)?;
    let filename = format!("backup_{}.json", Utc::now().format("%Y-%m-%d_%H-%M-%S"));
    let filepath = backup_dir.join(&filename);
    fs::write(&filepath, serde_json::to_string_pretty(&snapshot)?)?;

    let deleted = prune(backup_dir, keep)?;

    if !quiet {
        let size_kb = fs::metadata(&filepath)?.len() as f64 / 1024.0;
        println!("\n✓ Backup created");
        println!("  File: {filename}");
        println!("  Size: {size_kb:.1} KB");
        println!("  Path: {}", filepath.display());
        if deleted > 0 {
            println!("  Cleaned: {deleted} old backup(s)");
        }
        print_counts(&read_container(data_dir)?);
    }

    Ok(())
}

/// Deletes all but the newest `keep` backup files. Returns how many were
/// removed.
fn prune(backup_dir: &Path, keep: usize) -> Result<usize, Box<dyn std::error::Error>> {
    let mut names: Vec<String> = fs::read_dir(backup_dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with("backup_") && name.ends_with(".json"))
        .collect();

    // Newest first; the timestamp in the name sorts lexicographically.
    names.sort();
    names.reverse();

    let mut deleted = 0;
    for name in names.iter().skip(keep) {
        debug!(file = name, "pruning old backup");
        fs::remove_file(backup_dir.join(name))?;
        deleted += 1;
    }
    Ok(deleted)
}
