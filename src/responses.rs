//! Shared GitHub response types.

use serde::de::IgnoredAny;
use serde::Deserialize;

/// GraphQL connection with `nodes`; null entries are possible.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Connection<T> {
    #[serde(default)]
    pub nodes: Vec<Option<T>>,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.nodes.into_iter().flatten()
    }
}

#[derive(Deserialize)]
pub struct OrganizationIdResponse {
    pub organization: Option<IgnoredAny>,
}

#[derive(Deserialize)]
pub struct ProjectsResponse {
    pub organization: Option<OrganizationProjects>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationProjects {
    pub projects_v2: Option<Connection<ProjectNode>>,
}

#[derive(Deserialize)]
pub struct ProjectNode {
    pub id: Option<String>,
    pub number: Option<u64>,
    pub title: Option<String>,
    #[serde(default)]
    pub closed: bool,
    pub repositories: Option<Connection<RepositoryNode>>,
}

#[derive(Deserialize)]
pub struct RepositoryNode {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct ProjectFieldsResponse {
    pub node: Option<ProjectFieldsNode>,
}

#[derive(Deserialize)]
pub struct ProjectFieldsNode {
    pub fields: Option<Connection<FieldNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    pub id: Option<String>,
    pub name: Option<String>,
    pub data_type: Option<String>,
    pub options: Option<Vec<FieldOptionNode>>,
}

#[derive(Deserialize)]
pub struct FieldOptionNode {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemResponse {
    pub add_project_v2_item_by_id: Option<AddItemPayload>,
}

#[derive(Deserialize)]
pub struct AddItemPayload {
    pub item: Option<ItemId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDraftIssueResponse {
    pub add_project_v2_draft_issue: Option<AddDraftIssuePayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDraftIssuePayload {
    pub project_item: Option<ItemId>,
}

#[derive(Deserialize)]
pub struct ItemId {
    pub id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldResponse {
    pub update_project_v2_item_field_value: Option<IgnoredAny>,
}

/// Entry of a REST contents directory listing.
#[derive(Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// REST contents of a single file.
#[derive(Deserialize)]
pub struct FileContent {
    pub content: String,
    pub encoding: Option<String>,
}

/// REST issue as returned by the create endpoint.
#[derive(Deserialize)]
pub struct RestIssue {
    pub number: u64,
    pub html_url: String,
    pub node_id: String,
}
