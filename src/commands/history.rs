//! `history` — list archived snapshots for a name.

use crate::config::Config;
use crate::store::RecordStore;

/// Prints one line per archived snapshot, newest first.
///
/// # Errors
///
/// Returns an error string if the store cannot be read.
pub fn run(config: &Config, name: &str) -> Result<(), String> {
    let store = super::open_store(config)?;
    let Some(registry_id) = store.resolve_used_name(name).map_err(|e| e.to_string())? else {
        println!("{name:?} is not in the local mirror; run `regmirror fetch` first.");
        return Ok(());
    };
    let snapshots = store.snapshots_for(registry_id).map_err(|e| e.to_string())?;
    if snapshots.is_empty() {
        println!("No archived snapshots for {name:?} (registry id {registry_id}).");
        return Ok(());
    }
    println!("Archived snapshots for registry id {registry_id}, newest first:");
    for snapshot in snapshots {
        println!(
            "  {}  {}  {}",
            snapshot.archived_at.to_rfc3339(),
            snapshot.name,
            super::dash_if_empty(&snapshot.profile.reg_status),
        );
    }
    Ok(())
}
