//! Sequential batch submission with per-item failure collection.
//!
//! Items are processed one at a time in input order. A failing step marks
//! that item as failed and the batch moves on; completed steps are not
//! rolled back and nothing is retried.

use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::api::GitHubApi;
use crate::error::Result;
use crate::types::{FieldLookup, IssueRow, ProjectFieldValue};

/// Where a batch goes.
#[derive(Debug, Clone, Copy)]
pub enum BatchTarget<'a> {
    /// Repository issues, optionally added to a project.
    Repository {
        repo: &'a str,
        project_id: Option<&'a str>,
    },
    /// Draft issues created directly on a project.
    ProjectDrafts { project_id: &'a str },
}

impl BatchTarget<'_> {
    fn project_id(&self) -> Option<&str> {
        match self {
            Self::Repository { project_id, .. } => *project_id,
            Self::ProjectDrafts { project_id } => Some(project_id),
        }
    }
}

/// Outcome of one draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmissionResult {
    Created {
        draft_id: String,
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        number: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        item_id: Option<String>,
    },
    Failed {
        draft_id: String,
        title: String,
        error: String,
    },
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    pub fn draft_id(&self) -> &str {
        match self {
            Self::Created { draft_id, .. } | Self::Failed { draft_id, .. } => draft_id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Created { title, .. } | Self::Failed { title, .. } => title,
        }
    }
}

struct Created {
    number: Option<u64>,
    url: Option<String>,
    item_id: Option<String>,
}

/// Submit `issues` to `target`, calling `on_progress(completed, total, result)`
/// after each item.
///
/// Only the up-front project field fetch can fail the whole call.
pub async fn submit_batch<F>(
    api: &dyn GitHubApi,
    target: BatchTarget<'_>,
    issues: &[IssueRow],
    mut on_progress: F,
) -> Result<Vec<SubmissionResult>>
where
    F: FnMut(usize, usize, &SubmissionResult),
{
    let total = issues.len();

    let lookup = match target.project_id() {
        Some(project_id) => FieldLookup::new(api.fetch_project_fields(project_id).await?),
        None => FieldLookup::default(),
    };

    info!(total, ?target, "Submitting batch");

    let mut results = Vec::with_capacity(total);
    for (index, issue) in issues.iter().enumerate() {
        let span = info_span!("submit_item", index, title = %issue.title);
        let outcome = submit_one(api, target, &lookup, issue).instrument(span).await;

        let result = match outcome {
            Ok(created) => SubmissionResult::Created {
                draft_id: issue.id.clone(),
                title: issue.title.clone(),
                number: created.number,
                url: created.url,
                item_id: created.item_id,
            },
            Err(e) => {
                warn!(title = %issue.title, error = %e, "Failed to submit issue");
                SubmissionResult::Failed {
                    draft_id: issue.id.clone(),
                    title: issue.title.clone(),
                    error: e.to_string(),
                }
            }
        };

        on_progress(index + 1, total, &result);
        results.push(result);
    }

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    info!(succeeded, total, "Batch finished");

    Ok(results)
}

async fn submit_one(
    api: &dyn GitHubApi,
    target: BatchTarget<'_>,
    lookup: &FieldLookup,
    issue: &IssueRow,
) -> Result<Created> {
    let (created, project_item) = match target {
        BatchTarget::Repository { repo, project_id } => {
            let created = api
                .create_repo_issue(repo, &issue.title, &issue.description)
                .await?;
            debug!(number = created.number, "Created issue");

            let item = match project_id {
                Some(project_id) => {
                    let item_id = api.link_issue_to_project(project_id, &created.node_id).await?;
                    Some((project_id, item_id))
                }
                None => None,
            };

            (
                Created {
                    number: Some(created.number),
                    url: Some(created.url),
                    item_id: item.as_ref().map(|(_, id)| id.clone()),
                },
                item,
            )
        }
        BatchTarget::ProjectDrafts { project_id } => {
            let item_id = api
                .add_project_draft_issue(project_id, &issue.title, &issue.description)
                .await?;

            (
                Created {
                    number: None,
                    url: None,
                    item_id: Some(item_id.clone()),
                },
                Some((project_id, item_id)),
            )
        }
    };

    if !issue.images.is_empty() {
        warn!(count = issue.images.len(), "Image attachments are kept locally and not uploaded");
    }

    if let Some((project_id, item_id)) = project_item {
        for (key, raw) in issue.fields.iter().filter(|(_, v)| !v.is_blank()) {
            let field = lookup.get(key);
            let value = ProjectFieldValue::coerce(field, raw)?;
            let field_id = field.map_or(key.as_str(), |f| f.id.as_str());

            api.set_project_item_field(project_id, &item_id, field_id, &value)
                .await?;
        }
    }

    Ok(created)
}
