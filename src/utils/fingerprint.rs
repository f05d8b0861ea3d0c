use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

use crate::error::AppResult;
use crate::models::schedule::ScheduleBlock;

/// Deterministic digest of a block list.
///
/// Hashes the canonical JSON encoding, so two allocations with identical
/// inputs always yield the same fingerprint.
pub fn schedule_fingerprint(blocks: &[ScheduleBlock]) -> AppResult<String> {
    let mut hasher = Sha256::new();
    let serialized = serde_json::to_vec(blocks)?;
    hasher.update(&serialized);

    let digest = hasher.finalize();
    Ok(STANDARD_NO_PAD.encode(digest))
}
