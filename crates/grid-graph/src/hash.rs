//! Canonical serialization and content hash for a [`SpatialSummary`], so two
//! analyzer runs over the same primitive set produce byte-identical output.

use ciborium::ser::into_writer;

use crate::types::SpatialSummary;

/// Serializes `summary` via its natural field order (already stable: the
/// analyzer builds `structures`/`nodes` in union-find root order and
/// `name_nodes` breaks ties deterministically, so no additional sort is
/// needed here).
pub fn to_canonical_bytes(summary: &SpatialSummary) -> Result<Vec<u8>, ciborium::ser::Error<std::io::Error>> {
    let mut bytes = Vec::new();
    into_writer(summary, &mut bytes)?;
    Ok(bytes)
}

/// Content hash of a summary's canonical encoding.
pub fn compute_hash(summary: &SpatialSummary) -> Result<blake3::Hash, ciborium::ser::Error<std::io::Error>> {
    Ok(blake3::hash(&to_canonical_bytes(summary)?))
}
