use std::collections::HashSet;

use tabled::Tabled;

use crate::api::GitHubApi;
use crate::batch::{submit_batch, BatchTarget, SubmissionResult};
use crate::cli::SubmitArgs;
use crate::commands::confirm;
use crate::error::{IssueCreatorError, Result};
use crate::output;
use crate::store::SettingsStore;
use crate::types::{IssueRow, Settings};

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Error")]
    error: String,
}

/// Resolved target with owned ids, borrowed into a [`BatchTarget`]
#[derive(Debug, PartialEq)]
enum Destination {
    Repository {
        repo: String,
        project_id: Option<String>,
    },
    ProjectDrafts {
        project_id: String,
    },
}

impl Destination {
    fn resolve(args: &SubmitArgs, settings: &Settings) -> Result<Self> {
        let project_id = args.project.clone().or_else(|| settings.project_id.clone());

        if args.drafts {
            return Ok(Self::ProjectDrafts {
                project_id: project_id.ok_or(IssueCreatorError::NoProject)?,
            });
        }

        let repo = args
            .repo
            .clone()
            .or_else(|| settings.selected_repo.clone())
            .ok_or(IssueCreatorError::NoRepository)?;

        Ok(Self::Repository {
            repo,
            project_id: if args.no_project { None } else { project_id },
        })
    }

    fn as_target(&self) -> BatchTarget<'_> {
        match self {
            Self::Repository { repo, project_id } => BatchTarget::Repository {
                repo,
                project_id: project_id.as_deref(),
            },
            Self::ProjectDrafts { project_id } => BatchTarget::ProjectDrafts { project_id },
        }
    }

    fn describe(&self, organization: &str) -> String {
        match self {
            Self::Repository { repo, project_id: Some(project_id) } => {
                format!("{organization}/{repo} and add them to project {project_id}")
            }
            Self::Repository { repo, project_id: None } => format!("{organization}/{repo}"),
            Self::ProjectDrafts { project_id } => format!("project {project_id} as draft issues"),
        }
    }
}

/// Drafts left after a batch: failed ones plus anything never attempted
fn remaining_drafts(drafts: &[IssueRow], results: &[SubmissionResult]) -> Vec<IssueRow> {
    let succeeded: HashSet<&str> = results
        .iter()
        .filter(|r| r.is_success())
        .map(|r| r.draft_id())
        .collect();

    drafts
        .iter()
        .filter(|d| !succeeded.contains(d.id.as_str()))
        .cloned()
        .collect()
}

pub async fn run(store: &mut SettingsStore, api: &dyn GitHubApi, args: SubmitArgs) -> Result<()> {
    let drafts = store.draft_issues().to_vec();
    if drafts.is_empty() {
        output::print_message("No draft issues to submit.");
        return Ok(());
    }

    let settings = store.settings();
    let destination = Destination::resolve(&args, settings)?;

    if !args.yes
        && !confirm(&format!(
            "Create {} issue(s) in {}?",
            drafts.len(),
            destination.describe(&settings.organization)
        ))?
    {
        println!("Aborted.");
        return Ok(());
    }

    let results = submit_batch(api, destination.as_target(), &drafts, |done, total, result| {
        output::print_progress(done, total, result.title(), result.is_success());
    })
    .await?;

    store.set_draft_issues(remaining_drafts(&drafts, &results))?;

    let total = results.len();
    let failed: Vec<&SubmissionResult> = results.iter().filter(|r| !r.is_success()).collect();

    if output::is_json_output() {
        output::print_json(&results);
    } else {
        output::print_message(&format!("Created {} of {total} issues", total - failed.len()));

        for result in &results {
            if let SubmissionResult::Created { url: Some(url), .. } = result {
                output::print_message(&output::dimmed(url));
            }
        }

        if !failed.is_empty() {
            output::print_table(
                &failed,
                |r| FailureRow {
                    id: r.draft_id().get(..8).unwrap_or(r.draft_id()).to_string(),
                    title: output::truncate(r.title(), 40),
                    error: match r {
                        SubmissionResult::Failed { error, .. } => error.clone(),
                        SubmissionResult::Created { .. } => String::new(),
                    },
                },
                |r| format!("{} {}", output::failure("failed"), r.title()),
            );
            println!("Failed drafts were kept; fix them and run `ghic submit` again.");
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(IssueCreatorError::BatchIncomplete {
            failed: failed.len(),
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SubmitArgs {
        SubmitArgs {
            repo: None,
            project: None,
            no_project: false,
            drafts: false,
            yes: true,
        }
    }

    fn settings() -> Settings {
        Settings {
            organization: "acme".to_string(),
            project_id: Some("PVT_1".to_string()),
            selected_repo: Some("web".to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn test_destination_uses_selected_defaults() {
        assert_eq!(
            Destination::resolve(&args(), &settings()).unwrap(),
            Destination::Repository {
                repo: "web".to_string(),
                project_id: Some("PVT_1".to_string()),
            }
        );
    }

    #[test]
    fn test_destination_flags_override_defaults() {
        let args = SubmitArgs {
            repo: Some("api".to_string()),
            no_project: true,
            ..args()
        };
        assert_eq!(
            Destination::resolve(&args, &settings()).unwrap(),
            Destination::Repository {
                repo: "api".to_string(),
                project_id: None,
            }
        );
    }

    #[test]
    fn test_destination_requires_repository() {
        let settings = Settings {
            selected_repo: None,
            ..settings()
        };
        assert!(matches!(
            Destination::resolve(&args(), &settings),
            Err(IssueCreatorError::NoRepository)
        ));
    }

    #[test]
    fn test_project_drafts_require_project() {
        let args = SubmitArgs {
            drafts: true,
            ..args()
        };
        assert!(matches!(
            Destination::resolve(&args, &Settings::default()),
            Err(IssueCreatorError::NoProject)
        ));
    }

    #[test]
    fn test_remaining_drafts_keep_failures() {
        let drafts = vec![
            IssueRow::new("A", ""),
            IssueRow::new("B", ""),
            IssueRow::new("C", ""),
        ];
        let results = vec![
            SubmissionResult::Created {
                draft_id: drafts[0].id.clone(),
                title: "A".to_string(),
                number: Some(1),
                url: None,
                item_id: None,
            },
            SubmissionResult::Failed {
                draft_id: drafts[1].id.clone(),
                title: "B".to_string(),
                error: "boom".to_string(),
            },
            SubmissionResult::Created {
                draft_id: drafts[2].id.clone(),
                title: "C".to_string(),
                number: Some(2),
                url: None,
                item_id: None,
            },
        ];

        let remaining = remaining_drafts(&drafts, &results);
        assert_eq!(remaining, vec![drafts[1].clone()]);
    }
}
