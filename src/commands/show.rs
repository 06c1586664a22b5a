//! `show` — inspect the local mirror without contacting the registry.

use crate::config::Config;

/// Prints the cached record for a name, if the mirror has one.
///
/// # Errors
///
/// Returns an error string if the store cannot be read.
pub fn run(config: &Config, name: &str) -> Result<(), String> {
    let store = super::open_store(config)?;
    match super::load_cached(&store, name)? {
        Some(company) => println!("{}", super::format_company(&company)),
        None => println!("{name:?} is not in the local mirror; run `regmirror fetch` first."),
    }
    Ok(())
}
