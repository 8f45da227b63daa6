//! CLI command implementations.

pub mod backup;
pub mod export_json;
pub mod export_pterodactyl;
pub mod import_json;
pub mod migrate;

use sodium_codec::{decode_database, CodecError, Database};
use sodium_store::DB_FILE_NAME;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Reads the container without side effects.
///
/// Unlike the live file backend's load path, this never triggers legacy
/// migration or writes anything: a missing or non-container file reads as
/// an empty dataset. Truncation is still an error.
pub(crate) fn read_container(data_dir: &Path) -> Result<Database, Box<dyn std::error::Error>> {
    let path = data_dir.join(DB_FILE_NAME);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Database::new()),
        Err(err) => return Err(err.into()),
    };
    match decode_database(&bytes) {
        Ok(report) => Ok(report.database),
        Err(CodecError::BadMagic) => Ok(Database::new()),
        Err(err) => Err(err.into()),
    }
}

/// Asks the operator to confirm a destructive write.
///
/// Returns `true` immediately when `yes` was passed on the command line.
pub(crate) fn confirm(question: &str, yes: bool) -> io::Result<bool> {
    if yes {
        return Ok(true);
    }
    print!("{question} (y/N) ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Prints a per-collection record-count summary, skipping empty collections.
pub(crate) fn print_counts(db: &Database) {
    let mut total = 0;
    for (collection, count) in db.counts() {
        if count > 0 {
            println!("  {collection}: {count}");
            total += count;
        }
    }
    println!("  Total: {total} records");
}
