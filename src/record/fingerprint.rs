//! Content fingerprinting for change detection.
//!
//! The fingerprint decides whether a refreshed record is archived or merely
//! touched, so the participating fields are a contract, not an
//! implementation detail. [`FingerprintFields`] is that contract: registry
//! id, current name, and the full business profile. Bookkeeping
//! (`checked_at`, the fingerprint itself) never participates — a record can
//! be re-checked forever without its digest moving. Because the name is
//! included, a pure rename always routes through the archive path.

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::company::CompanyProfile;

/// Failure computing a content fingerprint.
#[derive(Debug, Error)]
#[error("could not serialize fingerprint fields: {source}")]
pub struct FingerprintError {
    #[from]
    source: serde_json::Error,
}

/// The declared set of fields the digest covers, in fixed order.
#[derive(Serialize)]
struct FingerprintFields<'a> {
    registry_id: i64,
    name: &'a str,
    profile: &'a CompanyProfile,
}

/// Computes the SHA-256 hex digest over the declared fingerprint fields.
///
/// Serialization order is the struct declaration order, so equal inputs
/// always produce equal digests.
///
/// # Errors
///
/// Returns an error if the fields cannot be serialized to JSON.
pub fn compute(
    registry_id: i64,
    name: &str,
    profile: &CompanyProfile,
) -> Result<String, FingerprintError> {
    let fields = FingerprintFields { registry_id, name, profile };
    let bytes = serde_json::to_vec(&fields)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
