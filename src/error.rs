//! Error taxonomy for the reconcile workflow.

use std::error::Error;

use thiserror::Error as ThisError;

use crate::ports::SourceError;
use crate::record::FingerprintError;
use crate::store::StoreError;

/// Everything that can go wrong inside a single `fetch` call.
///
/// Validation and not-found failures are user-correctable and kept
/// distinct from infrastructure failures so calling layers can decide
/// which to show to end users and which to log or alert on. Retries are a
/// caller concern; nothing here is retried internally.
#[derive(Debug, ThisError)]
pub enum FetchError {
    /// The lookup name was empty. Rejected before any I/O.
    #[error("company name must not be empty")]
    EmptyName,
    /// The registry reports no company under the queried name.
    #[error("the registry has no company under this name")]
    NotFound,
    /// The registry answered with an error code other than not-found.
    #[error("registry rejected the lookup (code {code}): {reason}")]
    Remote {
        /// The registry's error code.
        code: i64,
        /// The registry's stated reason.
        reason: String,
    },
    /// Network or transport failure calling the registry, including a
    /// lookup timeout. No writes happen on this path.
    #[error("could not reach the registry: {0}")]
    Transport(#[source] Box<dyn Error + Send + Sync>),
    /// The registry response body could not be decoded.
    #[error("malformed registry response: {0}")]
    Decode(#[source] Box<dyn Error + Send + Sync>),
    /// A persistence operation failed; the wrapped error names it.
    #[error(transparent)]
    Storage(#[from] StoreError),
    /// The content fingerprint could not be computed. Fatal for the call.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    /// A used-name mapping points at a registry id with no live record —
    /// an internal invariant violation, not a user-facing condition.
    #[error("used name {name:?} maps to registry id {registry_id}, but no live record exists")]
    Consistency {
        /// The name that resolved through the mapping.
        name: String,
        /// The dangling registry id.
        registry_id: i64,
    },
}

impl FetchError {
    /// Whether this failure is something the end user can act on
    /// (as opposed to an infrastructure problem worth alerting on).
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::EmptyName | Self::NotFound)
    }
}

impl From<SourceError> for FetchError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound => Self::NotFound,
            SourceError::Remote { code, reason } => Self::Remote { code, reason },
            SourceError::Transport(source) => Self::Transport(source),
            SourceError::Decode(source) => Self::Decode(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_split() {
        assert!(FetchError::EmptyName.is_user_facing());
        assert!(FetchError::NotFound.is_user_facing());
        assert!(!FetchError::Remote { code: 500, reason: "oops".into() }.is_user_facing());
        assert!(!FetchError::Consistency { name: "Acme".into(), registry_id: 7 }.is_user_facing());
    }

    #[test]
    fn source_errors_map_onto_the_taxonomy() {
        assert!(matches!(FetchError::from(SourceError::NotFound), FetchError::NotFound));

        let err = FetchError::from(SourceError::Remote { code: 300_001, reason: "quota".into() });
        match err {
            FetchError::Remote { code, reason } => {
                assert_eq!(code, 300_001);
                assert_eq!(reason, "quota");
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[test]
    fn storage_errors_carry_the_operation_label() {
        let err = FetchError::from(StoreError::new("touch", "disk full"));
        assert!(err.to_string().contains("touch"));
    }
}
