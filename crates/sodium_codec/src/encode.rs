//! Container encoder.

use crate::collection::Collection;
use crate::database::Database;
use crate::error::{CodecError, CodecResult};
use crate::record::Record;

/// The container file's magic signature.
pub const MAGIC: [u8; 8] = *b"SODIUM01";

/// Encodes a full database into container bytes.
///
/// The output always declares all ten canonical collections in numeric-ID
/// order; empty collections are emitted with a record count of 0 so the
/// container's declared set is the full canonical table.
///
/// # Errors
///
/// Returns an error if a record fails JSON serialization, or if a record
/// count or record body does not fit the format's 32-bit length fields.
pub fn encode_database(db: &Database) -> CodecResult<Vec<u8>> {
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(&MAGIC);
    out.push(Collection::ALL.len() as u8);

    for &collection in &Collection::ALL {
        encode_collection(&mut out, collection, db.records(collection))?;
    }

    Ok(out)
}

fn encode_collection(out: &mut Vec<u8>, collection: Collection, records: &[Record]) -> CodecResult<()> {
    out.push(collection.id());
    out.extend_from_slice(&wire_len("record count", records.len())?.to_le_bytes());
    for record in records {
        let body = serde_json::to_vec(record)?;
        out.extend_from_slice(&wire_len("record body", body.len())?.to_le_bytes());
        out.extend_from_slice(&body);
    }
    Ok(())
}

/// Checked conversion into the format's u32 length fields. A wrapped length
/// would write a prefix the decoder cannot reconcile with the bytes that
/// follow.
fn wire_len(what: &'static str, len: usize) -> CodecResult<u32> {
    u32::try_from(len).map_err(|_| CodecError::Oversize { what, len })
}
