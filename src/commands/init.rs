//! `init` — create the store schema.
//!
//! Schema creation is a deliberate, separately invoked step; opening the
//! store never applies it implicitly.

use crate::config::Config;

/// Creates the schema at the configured database path.
///
/// # Errors
///
/// Returns an error string if the store cannot be opened or the schema
/// cannot be applied.
pub fn run(config: &Config) -> Result<(), String> {
    let store = super::open_store(config)?;
    store.init_schema().map_err(|e| e.to_string())?;
    println!("Initialized store at {}", config.db_path.display());
    Ok(())
}
