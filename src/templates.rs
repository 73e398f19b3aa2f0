//! Normalizes Markdown and YAML issue templates into [`IssueTemplate`].

use tracing::warn;

use crate::types::{IssueForm, IssueTemplate, TemplateFile};

const CONFIG_PATHS: [&str; 2] = [
    ".github/ISSUE_TEMPLATE/config.yml",
    ".github/ISSUE_TEMPLATE/config.yaml",
];

fn is_yaml(path: &str) -> bool {
    path.ends_with(".yaml") || path.ends_with(".yml")
}

/// Parse fetched template files, dropping the chooser config file.
///
/// YAML that fails to parse is kept with `parsed: None`.
pub fn parse_issue_templates(files: Vec<TemplateFile>) -> Vec<IssueTemplate> {
    files
        .into_iter()
        .filter(|file| !CONFIG_PATHS.contains(&file.path.as_str()))
        .map(|file| {
            let parsed = if is_yaml(&file.path) {
                parse_form(&file)
            } else {
                None
            };

            IssueTemplate {
                name: file.name,
                path: file.path,
                content: file.content,
                parsed,
            }
        })
        .collect()
}

fn parse_form(file: &TemplateFile) -> Option<IssueForm> {
    match serde_yaml::from_str::<IssueForm>(&file.content) {
        Ok(form) => Some(form),
        Err(e) => {
            warn!(template = %file.name, error = %e, "Failed to parse YAML issue template");
            None
        }
    }
}

/// Body used to pre-fill a new issue from `template`.
pub fn seed_description(template: &IssueTemplate) -> String {
    template
        .parsed
        .as_ref()
        .and_then(|form| {
            form.body.iter().find_map(|element| {
                element
                    .attributes
                    .as_ref()
                    .and_then(|a| a.value.as_deref())
                    .filter(|v| !v.trim().is_empty())
            })
        })
        .unwrap_or(&template.content)
        .to_string()
}

/// Find a template by file name, form name (both case-insensitive) or path
pub fn find_template<'a>(templates: &'a [IssueTemplate], key: &str) -> Option<&'a IssueTemplate> {
    templates.iter().find(|t| {
        t.name.eq_ignore_ascii_case(key)
            || t.path == key
            || t.parsed
                .as_ref()
                .and_then(|form| form.name.as_deref())
                .is_some_and(|name| name.eq_ignore_ascii_case(key))
    })
}
