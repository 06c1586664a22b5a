//! Registry source port for remote company lookups.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error as ThisError;

use crate::record::SourceRecord;

/// Boxed future type alias used by [`RegistrySource`] to keep the trait
/// dyn-compatible.
pub type LookupFuture<'a> =
    Pin<Box<dyn Future<Output = Result<SourceRecord, SourceError>> + Send + 'a>>;

/// Performs the single external lookup call for a company name.
///
/// Implementations are expected to return a fully normalized record:
/// nested classification flattened, millisecond-epoch timestamps converted,
/// numeric flags decoded. No retries happen at this boundary.
pub trait RegistrySource: Send + Sync {
    /// Looks up the company currently registered under `name`.
    fn lookup(&self, name: &str) -> LookupFuture<'_>;
}

/// Structured failure from a registry lookup.
#[derive(Debug, ThisError)]
pub enum SourceError {
    /// The registry reports no company under the queried name.
    #[error("the registry has no company under this name")]
    NotFound,
    /// The registry answered with a non-zero error code other than
    /// not-found.
    #[error("registry rejected the lookup (code {code}): {reason}")]
    Remote {
        /// The registry's error code.
        code: i64,
        /// The registry's stated reason.
        reason: String,
    },
    /// Network or transport failure, including timeouts.
    #[error("could not reach the registry: {0}")]
    Transport(#[source] Box<dyn Error + Send + Sync>),
    /// The response body could not be decoded.
    #[error("malformed registry response: {0}")]
    Decode(#[source] Box<dyn Error + Send + Sync>),
}
