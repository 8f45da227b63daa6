//! # Sodium Store
//!
//! Durability backends for the Sodium panel database.
//!
//! Two backends implement the same collection model:
//!
//! - [`FileStore`] — the single-file deployment mode. The whole dataset
//!   lives in one `sodium.db` container; every save is a full-file rewrite
//!   through a temp-file-plus-rename step.
//! - [`SqlStore`] — an external SQL engine (MySQL, PostgreSQL, or SQLite),
//!   one table per collection, each row holding the record id and an opaque
//!   JSON payload.
//!
//! [`Backend::select`] performs the startup choice: the configured external
//! backend is tried once, and any failure falls back to the file store so
//! the panel can always start.
//!
//! Batch tooling connects to these backends directly, bypassing the live
//! cache; see the `sodium_cli` crate.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod error;
mod file;
mod sql;

pub use backend::Backend;
pub use config::{BackendConfig, BackendKind};
pub use error::{StoreError, StoreResult};
pub use file::{FileStore, DB_FILE_NAME};
pub use sql::{Dialect, SqlStore};
