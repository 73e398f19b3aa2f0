use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::warn;

use crate::api::GitHubApi;
use crate::cli::{DraftAddArgs, DraftEditArgs};
use crate::commands::connect;
use crate::config::Config;
use crate::error::{IssueCreatorError, Result};
use crate::output;
use crate::store::SettingsStore;
use crate::templates::{find_template, parse_issue_templates, seed_description};
use crate::transfer;
use crate::types::{
    parse_field_assignment, FieldInput, FieldLookup, ImageAttachment, IssueRow, ProjectField,
};

/// Set `key` to `value`, reusing an existing key that differs only in case
fn set_field(fields: &mut BTreeMap<String, FieldInput>, key: String, value: FieldInput) {
    let existing = fields
        .keys()
        .find(|k| k.eq_ignore_ascii_case(&key))
        .cloned();
    fields.insert(existing.unwrap_or(key), value);
}

fn apply_assignments(fields: &mut BTreeMap<String, FieldInput>, raw: &[String]) -> Result<()> {
    for assignment in raw {
        let (key, value) = parse_field_assignment(assignment)?;
        set_field(fields, key, value);
    }
    Ok(())
}

/// Index of the draft whose id equals `key` or uniquely starts with it
fn find_draft(drafts: &[IssueRow], key: &str) -> Result<usize> {
    if let Some(index) = drafts.iter().position(|d| d.id == key) {
        return Ok(index);
    }

    let mut matches = drafts
        .iter()
        .enumerate()
        .filter(|(_, d)| !key.is_empty() && d.id.starts_with(key))
        .map(|(i, _)| i);

    match (matches.next(), matches.next()) {
        (Some(index), None) => Ok(index),
        (Some(_), Some(_)) => Err(IssueCreatorError::AmbiguousDraft(key.to_string())),
        (None, _) => Err(IssueCreatorError::DraftNotFound(key.to_string())),
    }
}

/// Fetch `key` from the selected repository and return its seed body
async fn template_body(api: &dyn GitHubApi, repo: &str, key: &str) -> Result<String> {
    let templates = parse_issue_templates(api.fetch_issue_templates(repo).await?);
    find_template(&templates, key)
        .map(seed_description)
        .ok_or_else(|| IssueCreatorError::TemplateNotFound(key.to_string()))
}

async fn seed_from_template(store: &SettingsStore, config: &Config, key: &str) -> Result<String> {
    let settings = store.settings();
    let repo = settings
        .selected_repo
        .as_deref()
        .ok_or(IssueCreatorError::NoRepository)?;
    let client = connect(config, settings)?;
    template_body(&client, repo, key).await
}

pub async fn add(store: &mut SettingsStore, config: &Config, args: DraftAddArgs) -> Result<()> {
    let explicit_template = args.template.is_some();
    let template = args.template.clone().or_else(|| {
        (!args.no_defaults)
            .then(|| store.last_used_template().map(str::to_string))
            .flatten()
    });

    let description = match (args.description, template.as_deref()) {
        (Some(description), _) => description,
        (None, Some(key)) if explicit_template => seed_from_template(store, config, key).await?,
        (None, Some(key)) => seed_from_template(store, config, key)
            .await
            .unwrap_or_else(|e| {
                warn!(template = key, error = %e, "Could not seed description from last used template");
                String::new()
            }),
        (None, None) => String::new(),
    };

    let mut fields = if args.no_defaults {
        BTreeMap::new()
    } else {
        store.last_used_fields().clone()
    };
    apply_assignments(&mut fields, &args.fields)?;

    let images = args
        .images
        .iter()
        .map(|path| ImageAttachment::from_path(path))
        .collect::<Result<Vec<_>>>()?;

    let mut draft = IssueRow::new(args.title.trim(), description);
    draft.template = template.clone();
    draft.fields = fields.clone();
    draft.images = images;

    let mut message = format!("Added draft {}.", draft.short_id());
    if !draft.images.is_empty() {
        let bytes: usize = draft.images.iter().map(ImageAttachment::size).sum();
        message.push_str(&format!(
            " {} image(s), {} KB kept locally.",
            draft.images.len(),
            bytes.div_ceil(1024)
        ));
    }

    let mut drafts = store.draft_issues().to_vec();
    drafts.push(draft);
    store.set_draft_issues(drafts)?;
    store.set_last_used_template(template)?;
    store.set_last_used_fields(fields)?;

    output::print_message(&message);
    Ok(())
}

/// Header and rows for the draft table, one column per project field
fn draft_table(fields: &[ProjectField], drafts: &[IssueRow]) -> (Vec<String>, Vec<Vec<String>>) {
    let lookup = FieldLookup::new(fields.iter().filter(|f| f.is_editable()).cloned().collect());

    // Keys that match no project field still get a column
    let mut extra_keys: Vec<&str> = Vec::new();
    for draft in drafts {
        for key in draft.fields.keys() {
            if lookup.get(key).is_none() && !extra_keys.contains(&key.as_str()) {
                extra_keys.push(key);
            }
        }
    }

    let mut header = vec!["ID".to_string(), "Title".to_string(), "Template".to_string()];
    header.extend(lookup.fields().iter().map(|f| f.name.clone()));
    header.extend(extra_keys.iter().map(|k| k.to_string()));
    header.push("Images".to_string());

    let rows = drafts
        .iter()
        .map(|draft| {
            let mut row = vec![
                draft.short_id().to_string(),
                output::truncate(&draft.title, 40),
                draft.template.clone().unwrap_or_else(|| "-".to_string()),
            ];

            for field in lookup.fields() {
                let value = draft
                    .fields
                    .iter()
                    .find(|(key, _)| lookup.get(key).is_some_and(|f| f.id == field.id))
                    .map(|(_, value)| value);
                row.push(field.display_value(value));
            }

            for key in &extra_keys {
                let value = draft
                    .fields
                    .get(*key)
                    .filter(|v| !v.is_blank())
                    .map(ToString::to_string);
                row.push(value.unwrap_or_else(|| "-".to_string()));
            }

            row.push(if draft.images.is_empty() {
                "-".to_string()
            } else {
                draft.images.len().to_string()
            });
            row
        })
        .collect();

    (header, rows)
}

/// Fields of the selected project, or none when offline or unconfigured
async fn selected_project_fields(store: &SettingsStore, config: &Config) -> Vec<ProjectField> {
    let settings = store.settings();
    let Some(project_id) = settings.project_id.as_deref() else {
        return Vec::new();
    };

    let fields = match connect(config, settings) {
        Ok(client) => client.fetch_project_fields(project_id).await,
        Err(e) => Err(e),
    };

    fields.unwrap_or_else(|e| {
        warn!(error = %e, "Could not load project fields; showing raw values");
        Vec::new()
    })
}

pub async fn list(store: &SettingsStore, config: &Config) -> Result<()> {
    let drafts = store.draft_issues();

    if output::is_json_output() {
        output::print_json(drafts);
        return Ok(());
    }

    if drafts.is_empty() {
        output::print_message("No draft issues. Add one with `ghic draft add`.");
        return Ok(());
    }

    let fields = selected_project_fields(store, config).await;
    let (header, rows) = draft_table(&fields, drafts);
    output::print_dynamic_table(header, rows);

    Ok(())
}

pub fn edit(store: &mut SettingsStore, args: DraftEditArgs) -> Result<()> {
    let mut drafts = store.draft_issues().to_vec();
    let index = find_draft(&drafts, &args.id)?;
    let draft = &mut drafts[index];

    if let Some(title) = args.title {
        draft.title = title.trim().to_string();
    }
    if let Some(description) = args.description {
        draft.description = description;
    }
    apply_assignments(&mut draft.fields, &args.fields)?;
    for key in &args.unset {
        draft.fields.retain(|k, _| !k.eq_ignore_ascii_case(key));
    }

    let short_id = draft.short_id().to_string();
    store.set_draft_issues(drafts)?;

    output::print_message(&format!("Updated draft {short_id}."));
    Ok(())
}

pub fn remove(store: &mut SettingsStore, id: &str) -> Result<()> {
    let mut drafts = store.draft_issues().to_vec();
    let index = find_draft(&drafts, id)?;
    let removed = drafts.remove(index);
    store.set_draft_issues(drafts)?;

    output::print_message(&format!("Removed draft {}.", removed.short_id()));
    Ok(())
}

pub fn clear(store: &mut SettingsStore) -> Result<()> {
    let count = store.draft_issues().len();
    store.set_draft_issues(Vec::new())?;
    output::print_message(&format!("Removed {count} draft(s)."));
    Ok(())
}

pub fn export(store: &SettingsStore, path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| {
        PathBuf::from(transfer::export_file_name(chrono::Local::now().date_naive()))
    });

    transfer::write_export(&path, store.draft_issues())?;
    output::print_message(&format!(
        "Exported {} draft(s) to {}",
        store.draft_issues().len(),
        path.display()
    ));
    Ok(())
}

/// Replace the draft list with the file contents; the old list is kept on a parse error
pub fn import(store: &mut SettingsStore, file: PathBuf) -> Result<()> {
    let drafts = transfer::read_import(&file)?;
    let count = drafts.len();
    store.set_draft_issues(drafts)?;

    output::print_message(&format!("Imported {count} draft(s) from {}", file.display()));
    Ok(())
}
