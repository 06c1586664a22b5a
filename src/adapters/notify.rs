//! Notification sink adapters.
//!
//! Rename alerts are operator-facing and best effort by contract, so both
//! adapters swallow their own failures.

use reqwest::Client;
use tracing::warn;

use crate::ports::NotificationSink;

/// Sink that surfaces alerts through the process log.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, message: &str) {
        warn!(target: "regmirror::alerts", "{message}");
    }
}

/// Sink that posts alerts to a chat webhook as `{"text": ...}`.
///
/// Delivery is spawned onto the current async runtime and never awaited;
/// an alert can be lost if the process shuts down mid-send, which the
/// fire-and-forget contract allows.
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    /// Builds a sink posting to the given webhook URL.
    #[must_use]
    pub fn new(url: String) -> Self {
        Self { client: Client::new(), url }
    }
}

impl NotificationSink for WebhookSink {
    fn notify(&self, message: &str) {
        let client = self.client.clone();
        let url = self.url.clone();
        let body = serde_json::json!({ "text": message });
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                // Detached: the send outlives this call and is never joined.
                let _task = handle.spawn(async move {
                    if let Err(err) = client.post(&url).json(&body).send().await {
                        warn!("alert delivery to webhook failed: {err}");
                    }
                });
            }
            Err(_) => warn!("no async runtime available, dropping alert: {message}"),
        }
    }
}
