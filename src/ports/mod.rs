//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the reconcile engine and an
//! external system (time, the remote registry, the anomaly channel).
//! Live implementations live in `src/adapters/`; the persistence port has
//! its own module at `src/store/`.

pub mod clock;
pub mod notify;
pub mod source;

pub use clock::Clock;
pub use notify::NotificationSink;
pub use source::{LookupFuture, RegistrySource, SourceError};
