use tabled::Tabled;

use crate::api::GitHubApi;
use crate::error::Result;
use crate::output;
use crate::types::Project;

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "#")]
    number: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Repositories")]
    repositories: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Project> for ProjectRow {
    fn from(project: &Project) -> Self {
        let repositories = if project.repositories.is_empty() {
            "-".to_string()
        } else {
            project
                .repositories
                .iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            number: project.number,
            name: output::truncate(&project.name, 40),
            repositories: output::truncate(&repositories, 40),
            id: project.id.clone(),
        }
    }
}

pub async fn list(api: &dyn GitHubApi, search: Option<String>) -> Result<()> {
    let projects = api.fetch_projects(search.as_deref()).await?;

    if projects.is_empty() && !output::is_json_output() {
        output::print_message("No open projects found.");
        return Ok(());
    }

    output::print_table(&projects, |p| ProjectRow::from(p), |p| {
        format!("#{} {} {}", p.number, p.name, output::dimmed(&p.id))
    });

    Ok(())
}
