use crate::api::{check_connection, GitHubApi};
use crate::commands::{confirm, connect, prompt};
use crate::config::Config;
use crate::error::{IssueCreatorError, Result};
use crate::output;
use crate::store::SettingsStore;
use crate::types::SettingsUpdate;

pub async fn run(store: &mut SettingsStore, config: &Config) -> Result<()> {
    if store.is_configured()
        && !confirm(&format!(
            "Settings already exist at {}. Overwrite?",
            store.path().display()
        ))?
    {
        println!("Aborted.");
        return Ok(());
    }

    println!("GitHub Issue Creator Configuration");
    println!("==================================\n");

    let organization = prompt("Organization login: ")?;
    if organization.is_empty() {
        return Err(IssueCreatorError::MissingCredentials);
    }

    let token = prompt(
        "Personal access token (scopes: repo, admin:org, project; leave empty to use GITHUB_TOKEN): ",
    )?;
    if token.is_empty() && config.resolve_token("").is_none() {
        return Err(IssueCreatorError::MissingCredentials);
    }

    let update = SettingsUpdate {
        organization: Some(organization),
        token: Some(token),
        ..SettingsUpdate::default()
    };

    let mut candidate = store.settings().clone();
    candidate.merge(update.clone());
    let client = connect(config, &candidate)?;

    println!("\nTesting connection...");
    let valid = check_connection(&client).await;
    store.update_settings(update, Some(valid))?;

    if !valid {
        println!(
            "{}",
            output::failure("Connection failed. Settings saved; run `ghic settings test` to retry.")
        );
        return Ok(());
    }
    println!("{}", output::success("Connected."));

    select_project(store, &client).await?;

    println!("\nSettings saved to {}", store.path().display());
    println!("You can now add drafts with `ghic draft add`.");

    Ok(())
}

/// Offer the open projects and their repositories as defaults
async fn select_project(store: &mut SettingsStore, api: &dyn GitHubApi) -> Result<()> {
    let projects = api.fetch_projects(None).await?;
    if projects.is_empty() {
        return Ok(());
    }

    println!("\nOpen projects:");
    for (index, project) in projects.iter().enumerate() {
        println!("  {}. {} (#{})", index + 1, project.name, project.number);
    }

    let Some(project) = pick(&projects, "Default project number [optional]: ")? else {
        return Ok(());
    };

    let mut update = SettingsUpdate {
        project_id: Some(project.id.clone()),
        ..SettingsUpdate::default()
    };

    if !project.repositories.is_empty() {
        println!("\nRepositories linked to {}:", project.name);
        for (index, repo) in project.repositories.iter().enumerate() {
            println!("  {}. {}", index + 1, repo.name);
        }
        if let Some(repo) = pick(&project.repositories, "Default repository number [optional]: ")? {
            update.selected_repo = Some(repo.name.clone());
        }
    }

    store.update_settings(update, None)
}

fn pick<'a, T>(items: &'a [T], message: &str) -> Result<Option<&'a T>> {
    let answer = prompt(message)?;
    Ok(answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| items.get(i)))
}
