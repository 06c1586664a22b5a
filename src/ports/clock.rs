//! Clock port for obtaining the current time.

use chrono::{DateTime, Utc};

/// Provides the current time.
///
/// Freshness decisions and `checked_at` stamps go through this trait so
/// tests can pin the clock and exercise staleness boundaries exactly.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
