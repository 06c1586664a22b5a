//! Command dispatch and handlers.

pub mod fetch;
pub mod history;
pub mod init;
pub mod show;

use crate::cli::Command;
use crate::config::Config;
use crate::record::Company;
use crate::store::{RecordStore, SqliteStore};

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if configuration loading or the selected
/// command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let config = Config::from_env()?;
    match command {
        Command::Init => init::run(&config),
        Command::Fetch { name, json } => fetch::run(&config, name, *json),
        Command::Show { name } => show::run(&config, name),
        Command::History { name } => history::run(&config, name),
    }
}

/// Opens the SQLite store at the configured path.
fn open_store(config: &Config) -> Result<SqliteStore, String> {
    SqliteStore::open(&config.db_path)
        .map_err(|e| format!("could not open store at {}: {e}", config.db_path.display()))
}

/// Resolves a name through the used-name mapping and loads the live
/// record, if the mirror has one.
fn load_cached(store: &SqliteStore, name: &str) -> Result<Option<Company>, String> {
    let Some(registry_id) = store.resolve_used_name(name).map_err(|e| e.to_string())? else {
        return Ok(None);
    };
    store.find_by_registry_id(registry_id).map_err(|e| e.to_string())
}

/// Formats a company record as a short human-readable summary.
fn format_company(company: &Company) -> String {
    let profile = &company.profile;
    let mut lines = Vec::new();
    lines.push(format!("{} (registry id {})", company.name, company.registry_id));
    lines.push(format!("  status:       {}", dash_if_empty(&profile.reg_status)));
    lines.push(format!("  credit code:  {}", dash_if_empty(&profile.credit_code)));
    lines.push(format!("  legal rep:    {}", dash_if_empty(&profile.legal_rep_name)));
    lines.push(format!("  org type:     {}", dash_if_empty(&profile.org_type)));
    lines.push(format!("  industry:     {}", dash_if_empty(&profile.industry)));
    lines.push(format!("  capital:      {}", dash_if_empty(&profile.reg_capital)));
    lines.push(format!("  location:     {}", dash_if_empty(&profile.reg_location)));
    lines.push(format!(
        "  founded:      {}",
        profile.founded_at.map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d").to_string())
    ));
    lines.push(format!("  last checked: {}", company.checked_at.to_rfc3339()));
    lines.join("\n")
}

fn dash_if_empty(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CompanyProfile, SourceRecord};
    use chrono::{TimeZone, Utc};

    #[test]
    fn format_company_includes_name_and_status() {
        let record = SourceRecord {
            registry_id: 42,
            name: "Acme Widgets Ltd".to_string(),
            profile: CompanyProfile {
                reg_status: "in business".to_string(),
                ..CompanyProfile::default()
            },
        };
        let company =
            Company::from_source(record, Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap())
                .unwrap();

        let text = format_company(&company);

        assert!(text.contains("Acme Widgets Ltd"));
        assert!(text.contains("registry id 42"));
        assert!(text.contains("in business"));
        // Unknown fields render as dashes, not empty cells.
        assert!(text.contains("credit code:  -"));
    }
}
