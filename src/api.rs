//! GitHub operations used by the commands and the batch routine.

use std::sync::LazyLock;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::client::GitHubClient;
use crate::error::{IssueCreatorError, Result};
use crate::responses::{
    AddDraftIssueResponse, AddItemResponse, ContentEntry, FieldNode, FileContent,
    OrganizationIdResponse, ProjectFieldsResponse, ProjectNode, ProjectsResponse, RestIssue,
    UpdateFieldResponse,
};
use crate::types::{
    FieldOption, FieldType, Project, ProjectField, ProjectFieldValue, ProjectRepository,
    Repository, TemplateFile,
};

const TEMPLATE_DIR: &str = ".github/ISSUE_TEMPLATE";
const REPOS_PER_PAGE: usize = 100;

static TEMPLATE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(md|yaml|yml)$").expect("valid regex"));

const TEST_CONNECTION_QUERY: &str = r#"
query TestConnection($org: String!) {
    organization(login: $org) {
        id
    }
}
"#;

const LIST_PROJECTS_QUERY: &str = r#"
query ListProjects($org: String!, $searchQuery: String) {
    organization(login: $org) {
        projectsV2(first: 100, query: $searchQuery, orderBy: {field: UPDATED_AT, direction: DESC}) {
            nodes {
                id
                number
                title
                closed
                repositories(first: 100) {
                    nodes {
                        id
                        name
                    }
                }
            }
        }
    }
}
"#;

const PROJECT_FIELDS_QUERY: &str = r#"
query ProjectFields($projectId: ID!) {
    node(id: $projectId) {
        ... on ProjectV2 {
            fields(first: 100) {
                nodes {
                    ... on ProjectV2FieldCommon {
                        id
                        name
                        dataType
                    }
                    ... on ProjectV2SingleSelectField {
                        options {
                            id
                            name
                        }
                    }
                }
            }
        }
    }
}
"#;

const ADD_ITEM_MUTATION: &str = r#"
mutation AddProjectItem($projectId: ID!, $contentId: ID!) {
    addProjectV2ItemById(input: { projectId: $projectId, contentId: $contentId }) {
        item {
            id
        }
    }
}
"#;

const ADD_DRAFT_ISSUE_MUTATION: &str = r#"
mutation AddDraftIssue($projectId: ID!, $title: String!, $body: String) {
    addProjectV2DraftIssue(input: { projectId: $projectId, title: $title, body: $body }) {
        projectItem {
            id
        }
    }
}
"#;

const UPDATE_FIELD_MUTATION: &str = r#"
mutation UpdateItemField($projectId: ID!, $itemId: ID!, $fieldId: ID!, $value: ProjectV2FieldValue!) {
    updateProjectV2ItemFieldValue(
        input: { projectId: $projectId, itemId: $itemId, fieldId: $fieldId, value: $value }
    ) {
        projectV2Item {
            id
        }
    }
}
"#;

/// Issue created through the REST API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub url: String,
    pub node_id: String,
}

#[derive(Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    body: &'a str,
}

/// GitHub operations for the configured organization.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Whether the organization resolves with the current token.
    async fn test_connection(&self) -> Result<bool>;

    /// Open projects, most recently updated first.
    async fn fetch_projects(&self, search: Option<&str>) -> Result<Vec<Project>>;

    async fn fetch_organization_repositories(&self) -> Result<Vec<Repository>>;

    /// Project fields, without the built-in title.
    async fn fetch_project_fields(&self, project_id: &str) -> Result<Vec<ProjectField>>;

    /// Markdown and YAML files under `.github/ISSUE_TEMPLATE`, empty when missing.
    async fn fetch_issue_templates(&self, repo: &str) -> Result<Vec<TemplateFile>>;

    async fn create_repo_issue(&self, repo: &str, title: &str, body: &str) -> Result<CreatedIssue>;

    /// Add existing content (by node id) to a project, returning the item id.
    async fn link_issue_to_project(&self, project_id: &str, content_id: &str) -> Result<String>;

    async fn set_project_item_field(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        value: &ProjectFieldValue,
    ) -> Result<()>;

    /// Create a draft issue directly on a project, returning the item id.
    async fn add_project_draft_issue(
        &self,
        project_id: &str,
        title: &str,
        body: &str,
    ) -> Result<String>;
}

/// Check the connection, treating any failure as "not valid".
pub async fn check_connection(api: &dyn GitHubApi) -> bool {
    match api.test_connection().await {
        Ok(valid) => valid,
        Err(e) => {
            warn!(error = %e, "GitHub connection test failed");
            false
        }
    }
}

fn normalize_projects(nodes: impl Iterator<Item = ProjectNode>) -> Vec<Project> {
    nodes
        .filter(|p| !p.closed)
        .filter_map(|p| {
            let repositories = p
                .repositories
                .map(|c| {
                    c.into_nodes()
                        .filter_map(|r| match (r.id, r.name) {
                            (Some(id), Some(name)) if !id.is_empty() && !name.is_empty() => {
                                Some(ProjectRepository { id, name })
                            }
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default();

            match (p.id, p.number, p.title) {
                (Some(id), Some(number), Some(name))
                    if !id.is_empty() && number > 0 && !name.is_empty() =>
                {
                    Some(Project {
                        id,
                        number,
                        name,
                        repositories,
                    })
                }
                _ => None,
            }
        })
        .collect()
}

fn normalize_fields(nodes: impl Iterator<Item = FieldNode>) -> Vec<ProjectField> {
    nodes
        .filter_map(|f| {
            let (id, name, data_type) = (f.id?, f.name?, f.data_type?);
            if id.is_empty() || name.is_empty() || data_type.is_empty() {
                return None;
            }

            let field_type = FieldType::from(data_type);
            if field_type == FieldType::Title {
                return None;
            }

            let options = f
                .options
                .unwrap_or_default()
                .into_iter()
                .map(|o| FieldOption {
                    id: o.id,
                    name: o.name,
                })
                .collect();

            Some(ProjectField {
                id,
                name,
                field_type,
                options,
            })
        })
        .collect()
}

fn decode_content(file: FileContent) -> Result<String> {
    if file.encoding.as_deref().is_some_and(|e| e != "base64") {
        return Ok(file.content);
    }

    let compact: String = file.content.split_whitespace().collect();
    let bytes = STANDARD.decode(compact).map_err(|e| IssueCreatorError::ApiError {
        status: 200,
        message: format!("invalid base64 content: {e}"),
    })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// A missing template directory means the repository has no templates
fn template_listing(listing: Result<Vec<ContentEntry>>) -> Result<Vec<ContentEntry>> {
    match listing {
        Err(IssueCreatorError::NotFound) => {
            debug!("Repository has no issue templates");
            Ok(Vec::new())
        }
        other => other,
    }
}

fn is_template_entry(entry: &ContentEntry) -> bool {
    entry.kind == "file" && TEMPLATE_EXTENSION.is_match(&entry.name)
}

#[async_trait]
impl GitHubApi for GitHubClient {
    #[instrument(skip(self))]
    async fn test_connection(&self) -> Result<bool> {
        let response: OrganizationIdResponse = self
            .query(
                TEST_CONNECTION_QUERY,
                Some(json!({ "org": self.organization() })),
            )
            .await?;

        let valid = response.organization.is_some();
        info!(valid, "GitHub connection tested");
        Ok(valid)
    }

    #[instrument(skip(self))]
    async fn fetch_projects(&self, search: Option<&str>) -> Result<Vec<Project>> {
        let variables = json!({
            "org": self.organization(),
            "searchQuery": search.filter(|s| !s.is_empty()),
        });

        let response: ProjectsResponse = self.query(LIST_PROJECTS_QUERY, Some(variables)).await?;

        let nodes = response
            .organization
            .and_then(|o| o.projects_v2)
            .map(|c| normalize_projects(c.into_nodes()))
            .unwrap_or_default();

        debug!(count = nodes.len(), "Fetched projects");
        Ok(nodes)
    }

    #[instrument(skip(self))]
    async fn fetch_organization_repositories(&self) -> Result<Vec<Repository>> {
        let mut repositories = Vec::new();
        let mut page = 1;

        loop {
            let path = format!(
                "/orgs/{}/repos?per_page={REPOS_PER_PAGE}&page={page}&sort=full_name",
                self.organization()
            );
            let batch: Vec<Repository> = self.get(&path).await?;
            let done = batch.len() < REPOS_PER_PAGE;
            repositories.extend(batch);

            if done {
                break;
            }
            page += 1;
        }

        debug!(count = repositories.len(), "Fetched organization repositories");
        Ok(repositories)
    }

    #[instrument(skip(self))]
    async fn fetch_project_fields(&self, project_id: &str) -> Result<Vec<ProjectField>> {
        let response: ProjectFieldsResponse = self
            .query(PROJECT_FIELDS_QUERY, Some(json!({ "projectId": project_id })))
            .await?;

        let node = response
            .node
            .ok_or_else(|| IssueCreatorError::ProjectNotFound(project_id.to_string()))?;

        Ok(node
            .fields
            .map(|c| normalize_fields(c.into_nodes()))
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn fetch_issue_templates(&self, repo: &str) -> Result<Vec<TemplateFile>> {
        let listing_path = format!("/repos/{}/{repo}/contents/{TEMPLATE_DIR}", self.organization());

        let entries = template_listing(self.get(&listing_path).await)?;

        let mut templates = Vec::new();
        for entry in entries.into_iter().filter(is_template_entry) {
            let file: FileContent = self
                .get(&format!("/repos/{}/{repo}/contents/{}", self.organization(), entry.path))
                .await?;

            templates.push(TemplateFile {
                name: TEMPLATE_EXTENSION.replace(&entry.name, "").into_owned(),
                path: entry.path,
                content: decode_content(file)?,
            });
        }

        Ok(templates)
    }

    #[instrument(skip(self, body))]
    async fn create_repo_issue(&self, repo: &str, title: &str, body: &str) -> Result<CreatedIssue> {
        let issue: RestIssue = self
            .post(
                &format!("/repos/{}/{repo}/issues", self.organization()),
                &NewIssue { title, body },
            )
            .await?;

        Ok(CreatedIssue {
            number: issue.number,
            url: issue.html_url,
            node_id: issue.node_id,
        })
    }

    #[instrument(skip(self))]
    async fn link_issue_to_project(&self, project_id: &str, content_id: &str) -> Result<String> {
        let variables = json!({ "projectId": project_id, "contentId": content_id });
        let response: AddItemResponse = self.query(ADD_ITEM_MUTATION, Some(variables)).await?;

        response
            .add_project_v2_item_by_id
            .and_then(|p| p.item)
            .map(|i| i.id)
            .ok_or(IssueCreatorError::EmptyResponse)
    }

    #[instrument(skip(self))]
    async fn set_project_item_field(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        value: &ProjectFieldValue,
    ) -> Result<()> {
        let variables = json!({
            "projectId": project_id,
            "itemId": item_id,
            "fieldId": field_id,
            "value": value.to_graphql(),
        });

        let response: UpdateFieldResponse =
            self.query(UPDATE_FIELD_MUTATION, Some(variables)).await?;

        response
            .update_project_v2_item_field_value
            .map(|_| ())
            .ok_or(IssueCreatorError::EmptyResponse)
    }

    #[instrument(skip(self, body))]
    async fn add_project_draft_issue(
        &self,
        project_id: &str,
        title: &str,
        body: &str,
    ) -> Result<String> {
        let variables = json!({ "projectId": project_id, "title": title, "body": body });
        let response: AddDraftIssueResponse =
            self.query(ADD_DRAFT_ISSUE_MUTATION, Some(variables)).await?;

        response
            .add_project_v2_draft_issue
            .and_then(|p| p.project_item)
            .map(|i| i.id)
            .ok_or(IssueCreatorError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::{Connection, ProjectFieldsResponse};

    #[test]
    fn test_normalize_projects_filters_closed_and_incomplete() {
        let response: ProjectsResponse = serde_json::from_value(json!({
            "organization": { "projectsV2": { "nodes": [
                { "id": "PVT_1", "number": 1, "title": "Roadmap", "closed": false,
                  "repositories": { "nodes": [
                      { "id": "R_1", "name": "web" },
                      { "id": "R_2", "name": null },
                      null
                  ] } },
                { "id": "PVT_2", "number": 2, "title": "Old", "closed": true },
                { "id": "PVT_3", "number": 3, "title": null, "closed": false },
                null
            ] } }
        }))
        .unwrap();

        let projects =
            normalize_projects(response.organization.unwrap().projects_v2.unwrap().into_nodes());
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Roadmap");
        assert_eq!(
            projects[0].repositories,
            vec![ProjectRepository {
                id: "R_1".to_string(),
                name: "web".to_string(),
            }]
        );
    }

    #[test]
    fn test_normalize_fields_excludes_title() {
        let response: ProjectFieldsResponse = serde_json::from_value(json!({
            "node": { "fields": { "nodes": [
                { "id": "F_T", "name": "Title", "dataType": "TITLE" },
                { "id": "F_P", "name": "Priority", "dataType": "SINGLE_SELECT",
                  "options": [{ "id": "o1", "name": "High" }] },
                { "id": "F_E", "name": "Estimate", "dataType": "NUMBER" },
                {}
            ] } }
        }))
        .unwrap();

        let fields: Connection<FieldNode> = response.node.unwrap().fields.unwrap();
        let fields = normalize_fields(fields.into_nodes());
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field_type, FieldType::SingleSelect);
        assert_eq!(fields[0].options[0].name, "High");
        assert_eq!(fields[1].field_type, FieldType::Number);
        assert!(fields[1].options.is_empty());
    }

    #[test]
    fn test_decode_content_with_line_breaks() {
        let file = FileContent {
            content: "LS0tCm5hbWU6\nIEJ1Zwo=\n".to_string(),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(decode_content(file).unwrap(), "---\nname: Bug\n");
    }

    #[test]
    fn test_template_entry_filter() {
        let entry = |name: &str, kind: &str| ContentEntry {
            name: name.to_string(),
            path: format!("{TEMPLATE_DIR}/{name}"),
            kind: kind.to_string(),
        };
        assert!(is_template_entry(&entry("bug.yml", "file")));
        assert!(is_template_entry(&entry("feature.md", "file")));
        assert!(!is_template_entry(&entry("notes.txt", "file")));
        assert!(!is_template_entry(&entry("nested.md", "dir")));
        assert_eq!(TEMPLATE_EXTENSION.replace("bug_report.yaml", ""), "bug_report");
    }

    #[test]
    fn test_missing_template_directory_is_empty() {
        assert!(template_listing(Err(IssueCreatorError::NotFound)).unwrap().is_empty());
        assert!(matches!(
            template_listing(Err(IssueCreatorError::Forbidden)),
            Err(IssueCreatorError::Forbidden)
        ));

        let entries = template_listing(Ok(vec![ContentEntry {
            name: "bug.yml".to_string(),
            path: format!("{TEMPLATE_DIR}/bug.yml"),
            kind: "file".to_string(),
        }]))
        .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_check_connection_unreachable_is_false() {
        let config = crate::config::Config {
            api_url: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        };
        let client = GitHubClient::new(
            crate::client::Credentials {
                organization: "acme".to_string(),
                token: "bad".to_string(),
            },
            &config,
        )
        .unwrap();

        assert!(!check_connection(&client).await);
    }
}
