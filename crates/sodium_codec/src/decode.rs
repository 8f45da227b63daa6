//! Container decoder.

use crate::collection::Collection;
use crate::database::Database;
use crate::encode::MAGIC;
use crate::error::{CodecError, CodecResult};
use crate::record::Record;

/// The outcome of decoding a container.
///
/// Besides the data itself, the report carries what the loader needs to
/// decide on follow-up work: a container declaring fewer collections than
/// the canonical ten is an older format and should be rewritten, and a
/// non-zero skip count means corrupt records were dropped.
#[derive(Debug)]
pub struct DecodeReport {
    /// The decoded collections.
    pub database: Database,
    /// Number of collection blocks the container declared.
    pub declared_collections: u8,
    /// Records dropped because their bytes did not parse as a JSON object.
    pub skipped_records: usize,
}

/// Decodes container bytes into a database.
///
/// Unknown collection IDs are skipped using their declared record count so
/// files written by newer versions still load. Records that fail JSON
/// parsing are dropped and counted; they never abort the load.
///
/// # Errors
///
/// - [`CodecError::BadMagic`] if the buffer is shorter than 9 bytes or does
///   not start with `SODIUM01` — callers fall back to migration/empty-init.
/// - [`CodecError::Truncated`] if the buffer ends inside a declared
///   structure.
pub fn decode_database(bytes: &[u8]) -> CodecResult<DecodeReport> {
    if bytes.len() < 9 || bytes[..8] != MAGIC {
        return Err(CodecError::BadMagic);
    }

    let mut reader = Reader::new(bytes, 8);
    let declared_collections = reader.read_u8()?;

    let mut database = Database::new();
    let mut skipped_records = 0;

    for _ in 0..declared_collections {
        let collection_id = reader.read_u8()?;
        let record_count = reader.read_u32_le()?;
        let collection = Collection::from_id(collection_id);

        let mut records = Vec::new();
        for _ in 0..record_count {
            let len = reader.read_u32_le()? as usize;
            let body = reader.read_slice(len)?;
            if collection.is_none() {
                continue;
            }
            match serde_json::from_slice(body).ok().and_then(Record::from_value) {
                Some(record) => records.push(record),
                None => skipped_records += 1,
            }
        }

        if let Some(collection) = collection {
            database.set_records(collection, records);
        }
    }

    Ok(DecodeReport {
        database,
        declared_collections,
        skipped_records,
    })
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    #[inline]
    fn read_u8(&mut self) -> CodecResult<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(CodecError::Truncated { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_u32_le(&mut self) -> CodecResult<u32> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    #[inline]
    fn read_slice(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(CodecError::Truncated { offset: self.pos })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_database;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn push_record(out: &mut Vec<u8>, json: &str) {
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(json.as_bytes());
    }

    #[test]
    fn bad_magic_is_not_a_container() {
        assert!(matches!(decode_database(b""), Err(CodecError::BadMagic)));
        assert!(matches!(decode_database(b"SODIUM0"), Err(CodecError::BadMagic)));
        assert!(matches!(
            decode_database(b"NOTADB99\x00"),
            Err(CodecError::BadMagic)
        ));
    }

    #[test]
    fn zero_collections_is_empty() {
        let mut bytes = MAGIC.to_vec();
        bytes.push(0);
        let report = decode_database(&bytes).unwrap();
        assert_eq!(report.declared_collections, 0);
        assert_eq!(report.database.record_count(), 0);
    }

    #[test]
    fn unknown_collection_id_is_skipped() {
        let mut bytes = MAGIC.to_vec();
        bytes.push(2);

        // Unknown collection 200 with one record.
        bytes.push(200);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        push_record(&mut bytes, r#"{"id":"ghost"}"#);

        // Known users collection after it.
        bytes.push(Collection::Users.id());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        push_record(&mut bytes, r#"{"id":"u1"}"#);

        let report = decode_database(&bytes).unwrap();
        assert_eq!(report.skipped_records, 0);
        assert_eq!(
            report.database.records(Collection::Users),
            &[record(json!({"id": "u1"}))]
        );
    }

    #[test]
    fn corrupt_record_is_dropped_not_fatal() {
        let mut bytes = MAGIC.to_vec();
        bytes.push(1);
        bytes.push(Collection::Servers.id());
        bytes.extend_from_slice(&3u32.to_le_bytes());
        push_record(&mut bytes, r#"{"id":"s1"}"#);
        push_record(&mut bytes, r#"{"id": broken"#);
        push_record(&mut bytes, r#"{"id":"s3"}"#);

        let report = decode_database(&bytes).unwrap();
        assert_eq!(report.skipped_records, 1);
        assert_eq!(
            report.database.records(Collection::Servers),
            &[record(json!({"id": "s1"})), record(json!({"id": "s3"}))]
        );
    }

    #[test]
    fn non_object_record_is_dropped() {
        let mut bytes = MAGIC.to_vec();
        bytes.push(1);
        bytes.push(Collection::Users.id());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        push_record(&mut bytes, r#"[1,2,3]"#);

        let report = decode_database(&bytes).unwrap();
        assert_eq!(report.skipped_records, 1);
        assert!(report.database.records(Collection::Users).is_empty());
    }

    #[test]
    fn truncated_length_prefix_is_an_error() {
        let mut bytes = MAGIC.to_vec();
        bytes.push(1);
        bytes.push(Collection::Users.id());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&[5, 0]); // half a length prefix

        assert!(matches!(
            decode_database(&bytes),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn truncated_record_body_is_an_error() {
        let mut bytes = MAGIC.to_vec();
        bytes.push(1);
        bytes.push(Collection::Users.id());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(b"{\"id\":"); // far fewer than 100 bytes

        assert!(matches!(
            decode_database(&bytes),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn short_container_reports_declared_count() {
        // Old-format container declaring only the first six collections.
        let mut bytes = MAGIC.to_vec();
        bytes.push(6);
        for &collection in &Collection::ALL[..6] {
            bytes.push(collection.id());
            bytes.extend_from_slice(&0u32.to_le_bytes());
        }

        let report = decode_database(&bytes).unwrap();
        assert_eq!(report.declared_collections, 6);
        assert!(usize::from(report.declared_collections) < Collection::ALL.len());
    }

    proptest! {
        #[test]
        fn roundtrip_arbitrary_records(
            names in proptest::collection::vec("[a-z0-9 ]{0,24}", 0..20),
            flags in proptest::collection::vec(any::<bool>(), 0..20),
            counts in proptest::collection::vec(0i64..100_000, 0..20),
        ) {
            let mut db = Database::new();
            for (i, name) in names.iter().enumerate() {
                db.records_mut(Collection::Users).push(record(json!({
                    "id": format!("u{i}"),
                    "username": name,
                })));
            }
            for (i, flag) in flags.iter().enumerate() {
                db.records_mut(Collection::Nodes).push(record(json!({
                    "id": format!("n{i}"),
                    "maintenance_mode": flag,
                })));
            }
            for (i, count) in counts.iter().enumerate() {
                db.records_mut(Collection::ActivityLogs).push(record(json!({
                    "id": format!("l{i}"),
                    "count": count,
                })));
            }

            let bytes = encode_database(&db).unwrap();
            let report = decode_database(&bytes).unwrap();

            prop_assert_eq!(report.declared_collections, 10);
            prop_assert_eq!(report.skipped_records, 0);
            prop_assert_eq!(report.database, db);
        }
    }
}
