//! JSON import/export of the draft issue list.

use std::path::Path;

use chrono::NaiveDate;

use crate::error::{IssueCreatorError, Result};
use crate::types::IssueRow;

/// Default export file name for `date`, e.g. `github-issues-2024-03-01.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("github-issues-{}.json", date.format("%Y-%m-%d"))
}

pub fn export_drafts(issues: &[IssueRow]) -> Result<String> {
    serde_json::to_string_pretty(issues).map_err(|e| IssueCreatorError::Io(e.into()))
}

/// Parse an exported draft list. Only JSON well-formedness is checked.
pub fn import_drafts(contents: &str) -> Result<Vec<IssueRow>> {
    serde_json::from_str(contents).map_err(IssueCreatorError::ImportParse)
}

pub fn write_export(path: &Path, issues: &[IssueRow]) -> Result<()> {
    let contents = export_drafts(issues)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn read_import(path: &Path) -> Result<Vec<IssueRow>> {
    let contents = std::fs::read_to_string(path).map_err(|e| IssueCreatorError::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    import_drafts(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldInput, ImageAttachment};

    fn sample() -> Vec<IssueRow> {
        let mut with_template = IssueRow::new("Bug A", "Steps:\n1. open")
            .with_field("F_PRIO", FieldInput::from("opt-high"))
            .with_field("F_EST", FieldInput::Number(3.into()));
        with_template.template = Some("bug".to_string());
        with_template.images.push(ImageAttachment {
            file_name: "shot.png".to_string(),
            content_type: "image/png".to_string(),
            data: "AAEC".to_string(),
        });

        vec![with_template, IssueRow::new("Bug B", "")]
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(export_file_name(date), "github-issues-2024-03-01.json");
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let issues = sample();
        let imported = import_drafts(&export_drafts(&issues).unwrap()).unwrap();
        assert_eq!(imported, issues);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_file_name(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
        let issues = sample();
        write_export(&path, &issues).unwrap();
        assert_eq!(read_import(&path).unwrap(), issues);
    }

    #[test]
    fn test_export_uses_camel_case() {
        let json = export_drafts(&sample()).unwrap();
        assert!(json.contains("\"fileName\""));
        assert!(json.contains("\"contentType\""));
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let err = import_drafts("[{\"id\": ").unwrap_err();
        assert!(matches!(err, IssueCreatorError::ImportParse(_)));
        assert!(err.to_string().starts_with("Failed to parse the imported file"));
    }

    #[test]
    fn test_import_accepts_minimal_rows() {
        let issues = import_drafts(r#"[{"id":"x","title":"T","fields":{"stale":"v"}}]"#).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].fields["stale"], FieldInput::from("v"));
    }

    #[test]
    fn test_import_accepts_any_well_formed_row() {
        let issues = import_drafts(
            r#"[
                {"title":"no id"},
                {"id":"b","title":"B","description":null,"fields":{"Done":true,"Assignee":null}}
            ]"#,
        )
        .unwrap();

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].title, "no id");
        assert!(!issues[0].id.is_empty());
        assert_eq!(issues[1].description, "");
        assert_eq!(issues[1].fields["Done"], FieldInput::Bool(true));
        assert_eq!(issues[1].fields["Assignee"], FieldInput::Null);
    }
}
