//! `fetch` — run the reconcile workflow for one name.

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{HttpRegistrySource, LogSink, SystemClock, WebhookSink};
use crate::config::Config;
use crate::engine::ReconcileEngine;
use crate::ports::NotificationSink;

/// Fetches a company record, printing a summary or JSON.
///
/// # Errors
///
/// Returns an error string when configuration is incomplete, the runtime
/// cannot start, or the reconcile workflow fails.
pub fn run(config: &Config, name: &str, json: bool) -> Result<(), String> {
    let endpoint =
        config.endpoint.clone().ok_or("REGMIRROR_ENDPOINT is not set; cannot reach the registry")?;
    let token =
        config.auth_token.clone().ok_or("REGMIRROR_TOKEN is not set; cannot reach the registry")?;

    let store = Arc::new(super::open_store(config)?);
    let source = Arc::new(
        HttpRegistrySource::new(endpoint, token, config.timeout()).map_err(|e| e.to_string())?,
    );
    let sink: Arc<dyn NotificationSink> = match &config.webhook {
        Some(url) => Arc::new(WebhookSink::new(url.clone())),
        None => Arc::new(LogSink),
    };
    let engine =
        ReconcileEngine::new(store, source, sink, Arc::new(SystemClock), config.staleness_window());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .map_err(|e| format!("could not start async runtime: {e}"))?;
    let result = runtime.block_on(engine.fetch(name));
    // Give a spawned webhook alert a moment to flush before exiting.
    runtime.shutdown_timeout(Duration::from_secs(2));
    let company = result.map_err(|e| e.to_string())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&company).map_err(|e| e.to_string())?);
    } else {
        println!("{}", super::format_company(&company));
    }
    Ok(())
}
