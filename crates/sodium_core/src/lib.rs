//! # Sodium Core
//!
//! The in-memory collection cache — the only persistence interface the rest
//! of the panel talks to.
//!
//! A [`Store`] is constructed once per process at startup: it selects a
//! durability backend (file container or external SQL engine, with file
//! fallback), loads everything into memory, and from then on answers reads
//! from memory and writes through to the backend.
//!
//! The panel configuration document lives outside the collections as a
//! single JSON file; see [`PanelConfig`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod panel_config;
mod store;

pub use error::{CoreError, CoreResult};
pub use panel_config::PanelConfig;
pub use store::Store;

pub use sodium_codec::{Collection, Database, Record};
pub use sodium_store::{Backend, BackendConfig, BackendKind};
