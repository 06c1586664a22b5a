//! Live adapter implementations for the port traits.

pub mod clock;
pub mod http;
pub mod notify;

pub use clock::SystemClock;
pub use http::HttpRegistrySource;
pub use notify::{LogSink, WebhookSink};
