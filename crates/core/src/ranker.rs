use crate::digest::{Digest, Digester};
use crate::error::{Result, ShuffleError};
use serde_json::Value;

/// One input record's place in the salted order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedItem {
    /// Index of the record in the input array
    pub original_index: usize,
    pub digest: Digest,
}

/// Unwrap the top-level JSON value into the metadata array.
pub fn metadata_array(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(records) => Ok(records),
        _ => Err(ShuffleError::parse("The array of metadata is not an array")),
    }
}

/// Compute `H(json(record) || salt)` for every record and sort ascending by digest.
///
/// Records are serialized compactly with their fields in the order they were
/// read. Two arrays holding the same records with different key order rank
/// differently; normalize upstream if that matters.
///
/// Equal digests keep input order.
pub fn rank(records: &[Value], salt: &str, digester: &dyn Digester) -> Result<Vec<RankedItem>> {
    if salt.is_empty() {
        return Err(ShuffleError::configuration("No salt specified"));
    }

    let mut ranked = records
        .iter()
        .enumerate()
        .map(|(original_index, record)| -> Result<RankedItem> {
            let bytes = serde_json::to_vec(record)?;
            Ok(RankedItem {
                original_index,
                digest: digester.digest(&bytes, salt),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    ranked.sort_by(|a, b| a.digest.cmp(&b.digest));

    log::debug!(
        "Ranked {} records with {}",
        ranked.len(),
        digester.algorithm()
    );
    Ok(ranked)
}
