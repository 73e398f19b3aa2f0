use serde::{Deserialize, Deserializer, Serialize};

/// Raw issue template file fetched from `.github/ISSUE_TEMPLATE`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateFile {
    pub name: String,
    pub path: String,
    pub content: String,
}

/// Attributes of a structured issue form element.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct FormAttributes {
    pub label: Option<String>,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    pub value: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FormElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Option<String>,
    pub attributes: Option<FormAttributes>,
}

/// A YAML issue form.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct IssueForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub body: Vec<FormElement>,
}

/// Issue forms allow `labels: bug` as well as a list.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(label) => label
            .split(',')
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
        OneOrMany::Many(labels) => labels,
    })
}

/// Issue template normalized across Markdown and YAML formats.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IssueTemplate {
    pub name: String,
    pub path: String,
    pub content: String,
    pub parsed: Option<IssueForm>,
}

impl IssueTemplate {
    pub fn kind(&self) -> &'static str {
        if self.path.ends_with(".md") {
            "markdown"
        } else if self.parsed.is_some() {
            "form"
        } else {
            "yaml (unparsed)"
        }
    }
}
