//! Cross-backend dataset migration.

use super::{confirm, print_counts};
use sodium_store::{Backend, BackendConfig, BackendKind};
use std::path::Path;
use tracing::debug;

/// Copies every collection from one backend to another.
///
/// Both ends are connected strictly before anything is read: a target that
/// cannot be reached aborts the run with nothing written, rather than
/// silently falling back to the file backend the way panel startup does.
/// Target connection settings come from `TARGET_DB_*` variables, falling
/// back to the unprefixed `DB_*` values.
pub async fn run(
    data_dir: &Path,
    from: &str,
    to: &str,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let from_kind: BackendKind = from.parse()?;
    let to_kind: BackendKind = to.parse()?;

    if from_kind == to_kind {
        println!("Source and target are the same. Nothing to do.");
        return Ok(());
    }

    println!("Sodium Database Migration");
    println!("  {} -> {}", from_kind.name(), to_kind.name());

    if !confirm("This will overwrite data in the target. Continue?", yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let mut source_config = BackendConfig::from_env();
    source_config.kind = from_kind;
    source_config.data_dir = data_dir.to_path_buf();

    let mut target_config = BackendConfig::target_from_env();
    target_config.kind = to_kind;
    target_config.data_dir = data_dir.to_path_buf();

    debug!(
        source = source_config.kind.name(),
        target = target_config.kind.name(),
        "connecting"
    );
    let source = Backend::connect(&source_config).await?;
    let target = Backend::connect(&target_config).await?;

    let db = source.load().await?;
    print_counts(&db);

    target.save_all(&db).await?;

    source.close().await;
    target.close().await;

    println!("✓ Migration complete");
    Ok(())
}
