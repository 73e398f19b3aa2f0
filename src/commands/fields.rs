use tabled::Tabled;

use crate::api::GitHubApi;
use crate::error::{IssueCreatorError, Result};
use crate::output;
use crate::types::ProjectField;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    field_type: String,
    #[tabled(rename = "Options")]
    options: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&ProjectField> for FieldRow {
    fn from(field: &ProjectField) -> Self {
        let options = if field.options.is_empty() {
            "-".to_string()
        } else {
            field
                .options
                .iter()
                .map(|o| o.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            name: field.name.clone(),
            field_type: field.field_type.to_string(),
            options: output::truncate(&options, 50),
            id: field.id.clone(),
        }
    }
}

pub async fn list(
    api: &dyn GitHubApi,
    project: Option<String>,
    default_project: Option<&str>,
) -> Result<()> {
    let project_id = project
        .as_deref()
        .or(default_project)
        .ok_or(IssueCreatorError::NoProject)?;

    let fields = api.fetch_project_fields(project_id).await?;

    output::print_table(&fields, |f| FieldRow::from(f), |f| {
        format!("{} ({}) {}", f.name, f.field_type, output::dimmed(&f.id))
    });

    Ok(())
}
