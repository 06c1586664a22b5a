//! Environment-backed configuration.
//!
//! Recognized variables (a `.env` file is honored when present):
//!
//! | Variable                 | Meaning                                  | Default         |
//! |--------------------------|------------------------------------------|-----------------|
//! | `REGMIRROR_ENDPOINT`     | registry lookup URL                      | — (required to fetch) |
//! | `REGMIRROR_TOKEN`        | bearer token for the registry            | — (required to fetch) |
//! | `REGMIRROR_DB`           | SQLite database path                     | `regmirror.db`  |
//! | `REGMIRROR_STALE_DAYS`   | days before a cached record is re-checked| `30`            |
//! | `REGMIRROR_TIMEOUT_SECS` | per-lookup HTTP timeout                  | `10`            |
//! | `REGMIRROR_WEBHOOK`      | chat webhook for rename alerts           | — (log only)    |

use std::env;
use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;

const DEFAULT_DB_PATH: &str = "regmirror.db";
const DEFAULT_STALE_DAYS: u32 = 30;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration for the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Registry lookup endpoint; required only for `fetch`.
    pub endpoint: Option<String>,
    /// Credential forwarded to the registry; required only for `fetch`.
    pub auth_token: Option<String>,
    /// Path of the SQLite store.
    pub db_path: PathBuf,
    /// Days before a cached record is considered stale.
    pub staleness_days: u32,
    /// Per-lookup HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Optional webhook URL for rename alerts.
    pub webhook: Option<String>,
}

impl Config {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error string when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through an arbitrary lookup function, so tests
    /// can feed values without touching process state.
    ///
    /// # Errors
    ///
    /// Returns an error string when a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let staleness_days = parse_or(&lookup, "REGMIRROR_STALE_DAYS", DEFAULT_STALE_DAYS)?;
        let timeout_secs = parse_or(&lookup, "REGMIRROR_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        Ok(Self {
            endpoint: lookup("REGMIRROR_ENDPOINT"),
            auth_token: lookup("REGMIRROR_TOKEN"),
            db_path: lookup("REGMIRROR_DB")
                .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from),
            staleness_days,
            timeout_secs,
            webhook: lookup("REGMIRROR_WEBHOOK"),
        })
    }

    /// The staleness window as a duration.
    #[must_use]
    pub fn staleness_window(&self) -> Duration {
        Duration::days(i64::from(self.staleness_days))
    }

    /// The per-lookup HTTP timeout as a duration.
    #[must_use]
    pub fn timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.timeout_secs)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, String> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| format!("{key} must be a number, got {raw:?}")),
    }
}
