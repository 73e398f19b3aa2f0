use tabled::Tabled;

use crate::api::GitHubApi;
use crate::error::{IssueCreatorError, Result};
use crate::output;
use crate::templates::parse_issue_templates;
use crate::types::IssueTemplate;

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&IssueTemplate> for TemplateRow {
    fn from(template: &IssueTemplate) -> Self {
        let description = template
            .parsed
            .as_ref()
            .and_then(|form| form.description.as_deref())
            .unwrap_or("-");

        Self {
            name: template.name.clone(),
            kind: template.kind().to_string(),
            description: output::truncate(description, 40),
            path: template.path.clone(),
        }
    }
}

pub async fn list(
    api: &dyn GitHubApi,
    repo: Option<String>,
    default_repo: Option<&str>,
) -> Result<()> {
    let repo = repo
        .as_deref()
        .or(default_repo)
        .ok_or(IssueCreatorError::NoRepository)?;

    let templates = parse_issue_templates(api.fetch_issue_templates(repo).await?);

    if templates.is_empty() && !output::is_json_output() {
        output::print_message(&format!("No issue templates in {repo}."));
        return Ok(());
    }

    output::print_table(&templates, |t| TemplateRow::from(t), |t| {
        format!("{} ({})", t.name, t.kind())
    });

    Ok(())
}
