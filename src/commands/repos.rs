use serde::Serialize;
use tabled::Tabled;

use crate::api::GitHubApi;
use crate::error::{IssueCreatorError, Result};
use crate::output;
use crate::types::{Repository, Settings};

/// Repository as listed for selection, from either source
#[derive(Serialize, Debug, PartialEq)]
struct RepoEntry {
    name: String,
    description: Option<String>,
    selected: bool,
}

#[derive(Tabled)]
struct RepoRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&RepoEntry> for RepoRow {
    fn from(entry: &RepoEntry) -> Self {
        Self {
            marker: if entry.selected { "*".to_string() } else { String::new() },
            name: entry.name.clone(),
            description: output::truncate(entry.description.as_deref().unwrap_or("-"), 50),
        }
    }
}

fn from_organization(repos: Vec<Repository>, selected: Option<&str>) -> Vec<RepoEntry> {
    repos
        .into_iter()
        .filter(|r| !r.archived)
        .map(|r| RepoEntry {
            selected: selected == Some(r.name.as_str()),
            name: r.name,
            description: r.description,
        })
        .collect()
}

pub async fn list(api: &dyn GitHubApi, settings: &Settings, all: bool) -> Result<()> {
    let selected = settings.selected_repo.as_deref();

    let entries = match settings.project_id.as_deref().filter(|_| !all) {
        Some(project_id) => {
            let projects = api.fetch_projects(None).await?;
            let project = projects
                .into_iter()
                .find(|p| p.id == project_id)
                .ok_or_else(|| IssueCreatorError::ProjectNotFound(project_id.to_string()))?;

            project
                .repositories
                .into_iter()
                .map(|r| RepoEntry {
                    selected: selected == Some(r.name.as_str()),
                    name: r.name,
                    description: None,
                })
                .collect()
        }
        None => from_organization(api.fetch_organization_repositories().await?, selected),
    };

    if entries.is_empty() && !output::is_json_output() {
        output::print_message("No repositories found.");
        return Ok(());
    }

    output::print_table(&entries, |e| RepoRow::from(e), |e| {
        let marker = if e.selected { "* " } else { "  " };
        format!("{marker}{}", e.name)
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, archived: bool) -> Repository {
        Repository {
            id: 1,
            name: name.to_string(),
            full_name: Some(format!("acme/{name}")),
            description: None,
            archived,
        }
    }

    #[test]
    fn test_archived_repositories_are_hidden() {
        let entries = from_organization(vec![repo("web", false), repo("old", true)], Some("web"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "web");
        assert!(entries[0].selected);
    }
}
