//! Environment-driven backend configuration.

use crate::error::StoreError;
use crate::sql::Dialect;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which backend a configuration points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The single-file container backend.
    File,
    /// An external SQL engine.
    Sql(Dialect),
}

impl BackendKind {
    /// A short stable name, matching the `DB_TYPE` selector values.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BackendKind::File => "file",
            BackendKind::Sql(dialect) => dialect.name(),
        }
    }
}

impl FromStr for BackendKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(BackendKind::File),
            other => Dialect::from_str(other).map(BackendKind::Sql),
        }
    }
}

/// Connection settings for a backend.
///
/// Normally built from the environment: `DB_TYPE` selects the backend,
/// `DB_HOST`/`DB_PORT`/`DB_NAME`/`DB_USER`/`DB_PASS` configure SQL engines,
/// `DB_FILE` overrides the SQLite path, and `DATA_DIR` locates the file
/// backend's data directory.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Selected backend.
    pub kind: BackendKind,
    /// Directory holding `sodium.db` and, by default, the SQLite file.
    pub data_dir: PathBuf,
    /// SQL host.
    pub host: String,
    /// SQL port; `None` means the dialect default (3306 / 5432).
    pub port: Option<u16>,
    /// SQL database name.
    pub database: String,
    /// SQL user.
    pub user: String,
    /// SQL password.
    pub password: String,
    /// SQLite database file; defaults to `<data_dir>/sodium.sqlite`.
    pub sqlite_file: Option<PathBuf>,
}

impl BackendConfig {
    /// A file-backend configuration rooted at `data_dir`.
    #[must_use]
    pub fn file(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            kind: BackendKind::File,
            data_dir: data_dir.into(),
            host: "localhost".to_string(),
            port: None,
            database: "sodium".to_string(),
            user: "sodium".to_string(),
            password: String::new(),
            sqlite_file: None,
        }
    }

    /// Reads configuration from the standard environment variables.
    ///
    /// An unrecognized `DB_TYPE` logs a warning and selects the file
    /// backend, preserving the panel's always-starts guarantee.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_ns("")
    }

    /// Reads the `TARGET_`-prefixed variable namespace, falling back to the
    /// unprefixed variables field by field.
    ///
    /// The migration tool uses this so source and target can point at
    /// different hosts and credentials.
    #[must_use]
    pub fn target_from_env() -> Self {
        Self::from_env_ns("TARGET_")
    }

    fn from_env_ns(prefix: &str) -> Self {
        let var = |name: &str| {
            env::var(format!("{prefix}{name}"))
                .or_else(|_| env::var(name))
                .ok()
        };

        let kind = match var("DB_TYPE").as_deref() {
            None => BackendKind::File,
            Some(raw) => BackendKind::from_str(raw).unwrap_or_else(|_| {
                tracing::warn!(db_type = raw, "unknown DB_TYPE, using file backend");
                BackendKind::File
            }),
        };

        Self {
            kind,
            data_dir: var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| "data".into()),
            host: var("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: var("DB_PORT").and_then(|p| p.parse().ok()),
            database: var("DB_NAME").unwrap_or_else(|| "sodium".to_string()),
            user: var("DB_USER").unwrap_or_else(|| "sodium".to_string()),
            password: var("DB_PASS").unwrap_or_default(),
            sqlite_file: var("DB_FILE").map(PathBuf::from),
        }
    }

    /// The SQLite file path this configuration resolves to.
    #[must_use]
    pub fn sqlite_path(&self) -> PathBuf {
        self.sqlite_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("sodium.sqlite"))
    }
}
