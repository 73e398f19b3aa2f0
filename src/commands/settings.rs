use serde::Serialize;

use crate::api::{check_connection, GitHubApi};
use crate::cli::SettingsSetArgs;
use crate::commands::{confirm, connect};
use crate::config::Config;
use crate::error::{IssueCreatorError, Result};
use crate::output;
use crate::store::SettingsStore;
use crate::types::{Settings, SettingsUpdate, Theme};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsView {
    organization: String,
    token: String,
    project_id: Option<String>,
    selected_repo: Option<String>,
    is_valid: bool,
    is_configured: bool,
    theme: Theme,
    token_from_env: bool,
    state_file: String,
}

impl SettingsView {
    fn new(store: &SettingsStore, config: &Config) -> Self {
        let settings = store.settings();
        let resolved = config.resolve_token(&settings.token);
        Self {
            organization: settings.organization.clone(),
            token: settings.masked_token(),
            project_id: settings.project_id.clone(),
            selected_repo: settings.selected_repo.clone(),
            is_valid: settings.is_valid,
            is_configured: store.is_configured(),
            theme: settings.theme,
            token_from_env: resolved.is_some_and(|t| t != settings.token),
            state_file: store.path().display().to_string(),
        }
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

pub fn show(store: &SettingsStore, config: &Config) -> Result<()> {
    let view = SettingsView::new(store, config);

    output::print_item(&view, |v| {
        println!("Organization:  {}", or_dash(&v.organization));
        let source = if v.token_from_env { " (overridden by GITHUB_TOKEN)" } else { "" };
        println!("Token:         {}{source}", v.token);
        println!("Project:       {}", or_dash(v.project_id.as_deref().unwrap_or_default()));
        println!("Repository:    {}", or_dash(v.selected_repo.as_deref().unwrap_or_default()));
        println!("Theme:         {}", v.theme);
        let status = if v.is_valid {
            output::success("valid")
        } else {
            output::dimmed("not validated")
        };
        println!("Connection:    {status}");
        println!("State file:    {}", output::dimmed(&v.state_file));
    });

    Ok(())
}

pub async fn set(store: &mut SettingsStore, config: &Config, args: SettingsSetArgs) -> Result<()> {
    let update = SettingsUpdate {
        organization: args.org,
        token: args.token,
        project_id: args.project,
        selected_repo: args.repo,
        theme: args.theme,
    };

    if update.is_empty() {
        output::print_message("Nothing to change.");
        return Ok(());
    }

    let valid = if update.changes_credentials() {
        let mut candidate: Settings = store.settings().clone();
        candidate.merge(update.clone());
        let valid = match connect(config, &candidate) {
            Ok(client) => check_connection(&client).await,
            Err(_) => false,
        };
        Some(valid)
    } else {
        None
    };

    store.update_settings(update, valid)?;

    match valid {
        Some(false) => output::print_message(&output::failure(
            "Settings saved, but the connection could not be validated.",
        )),
        Some(true) => output::print_message(&output::success("Settings saved. Connection valid.")),
        None => output::print_message("Settings saved."),
    }

    Ok(())
}

/// Check the stored credentials and record the result
pub async fn test(store: &mut SettingsStore, config: &Config) -> Result<()> {
    let client = connect(config, store.settings())?;
    let result = client.test_connection().await;
    let valid = matches!(result, Ok(true));

    store.update_settings(SettingsUpdate::default(), Some(valid))?;

    match result {
        Ok(true) => {
            output::print_message(&output::success(&format!(
                "Connected to organization {}.",
                client.organization()
            )));
            Ok(())
        }
        Ok(false) => Err(IssueCreatorError::NotFound),
        Err(e) => Err(e),
    }
}

pub fn clear(store: &mut SettingsStore, yes: bool) -> Result<()> {
    if !yes && !confirm("Clear settings, drafts and remembered values?")? {
        println!("Aborted.");
        return Ok(());
    }

    store.clear_settings()?;
    output::print_message("Settings cleared.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_masks_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::load(dir.path().join("state.json")).unwrap();
        store
            .update_settings(
                SettingsUpdate {
                    organization: Some("acme".to_string()),
                    token: Some("ghp_secret1234".to_string()),
                    ..SettingsUpdate::default()
                },
                Some(true),
            )
            .unwrap();

        let view = SettingsView::new(&store, &Config::default());
        assert_eq!(view.organization, "acme");
        assert!(view.token.ends_with("1234"));
        assert!(!view.token.contains("secret"));
        assert!(view.is_configured);
    }

    #[test]
    fn test_clear_with_yes_resets_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::load(dir.path().join("state.json")).unwrap();
        store
            .update_settings(
                SettingsUpdate {
                    organization: Some("acme".to_string()),
                    ..SettingsUpdate::default()
                },
                None,
            )
            .unwrap();

        clear(&mut store, true).unwrap();
        assert_eq!(store.settings(), &Settings::default());
        assert!(!store.is_configured());
    }
}
