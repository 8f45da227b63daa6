//! # Sodium Codec
//!
//! Format contracts for the Sodium panel's persistence layer.
//!
//! This crate owns everything other components must agree on byte-for-byte:
//! - The single-file binary container (`SODIUM01` magic, one block per
//!   canonical collection, length-prefixed JSON records)
//! - The fixed collection name ↔ numeric ID table
//! - The snapshot JSON format used by backup/export/import tooling
//! - The redaction policy applied before data leaves the live backend
//!
//! ## Container layout (little-endian)
//!
//! ```text
//! magic      8 bytes   ASCII "SODIUM01"
//! count      1 byte    number of collection blocks
//! per block:
//!   id       1 byte    collection numeric ID
//!   records  4 bytes   u32 record count
//!   per record:
//!     len    4 bytes   u32 byte length
//!     body   len bytes UTF-8 JSON object
//! ```
//!
//! Decoding is forward-compatible: blocks with an unknown collection ID are
//! skipped using their declared record count, and individual records whose
//! bytes fail JSON parsing are dropped and counted rather than aborting the
//! load.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod database;
mod decode;
mod encode;
mod error;
mod record;
mod redact;
mod snapshot;

pub use collection::Collection;
pub use database::Database;
pub use decode::{decode_database, DecodeReport};
pub use encode::{encode_database, MAGIC};
pub use error::{CodecError, CodecResult};
pub use record::Record;
pub use redact::{is_importable_user, redact_config, redact_database, REDACTED};
pub use snapshot::{Snapshot, SnapshotKind, SNAPSHOT_VERSION};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roundtrip_empty_database() {
        let db = Database::new();
        let bytes = encode_database(&db).unwrap();
        let report = decode_database(&bytes).unwrap();
        assert_eq!(report.declared_collections, 10);
        assert_eq!(report.skipped_records, 0);
        assert_eq!(report.database.record_count(), 0);
    }

    #[test]
    fn roundtrip_populated_database() {
        let mut db = Database::new();
        db.records_mut(Collection::Users).push(
            Record::from_value(json!({"id": "u1", "username": "alice", "isAdmin": true}))
                .unwrap(),
        );
        db.records_mut(Collection::Servers).push(
            Record::from_value(json!({"id": "s1", "name": "mc", "limits": {"memory": 2048}}))
                .unwrap(),
        );

        let bytes = encode_database(&db).unwrap();
        let decoded = decode_database(&bytes).unwrap().database;

        assert_eq!(decoded.records(Collection::Users), db.records(Collection::Users));
        assert_eq!(
            decoded.records(Collection::Servers),
            db.records(Collection::Servers)
        );
        assert_eq!(decoded.records(Collection::Eggs).len(), 0);
    }
}
