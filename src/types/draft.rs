use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{IssueCreatorError, Result};

/// A raw field value as typed by the user or found in an imported file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FieldInput {
    Number(serde_json::Number),
    Text(String),
    Bool(bool),
    Null,
}

impl FieldInput {
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Null => true,
            Self::Number(_) | Self::Bool(_) => false,
        }
    }
}

impl fmt::Display for FieldInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// An image carried along with a draft, base64 encoded.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: String,
}

impl ImageAttachment {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| IssueCreatorError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        Ok(Self {
            content_type: guess_content_type(&file_name).to_string(),
            file_name,
            data: STANDARD.encode(bytes),
        })
    }

    /// Decoded size in bytes
    pub fn size(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|b| *b == b'=').count();
        (self.data.len() / 4 * 3).saturating_sub(padding)
    }
}

fn guess_content_type(filename: &str) -> &'static str {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// A locally composed, not yet submitted issue.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueRow {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: BTreeMap<String, FieldInput>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub images: Vec<ImageAttachment>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Read `null` the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl IssueRow {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: description.into(),
            template: None,
            fields: BTreeMap::new(),
            images: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_field(mut self, key: impl Into<String>, value: FieldInput) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Short id used in tables
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

/// Parse a `KEY=VALUE` field assignment from the command line.
pub fn parse_field_assignment(raw: &str) -> Result<(String, FieldInput)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| IssueCreatorError::InvalidFieldAssignment(raw.to_string()))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(IssueCreatorError::InvalidFieldAssignment(raw.to_string()));
    }

    Ok((key.to_string(), FieldInput::Text(value.trim().to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assigns_unique_ids() {
        let a = IssueRow::new("A", "");
        let b = IssueRow::new("B", "");
        assert_ne!(a.id, b.id);
        assert_eq!(a.short_id().len(), 8);
    }

    #[test]
    fn test_field_input_untagged() {
        let row: IssueRow = serde_json::from_str(
            r#"{"id":"1","title":"T","fields":{"Priority":"High","Estimate":3}}"#,
        )
        .unwrap();
        assert_eq!(row.fields["Priority"], FieldInput::Text("High".to_string()));
        assert!(matches!(row.fields["Estimate"], FieldInput::Number(_)));
        assert_eq!(row.fields["Estimate"].to_string(), "3");
        assert_eq!(row.description, "");
    }

    #[test]
    fn test_parse_field_assignment() {
        let (key, value) = parse_field_assignment("Priority = High").unwrap();
        assert_eq!(key, "Priority");
        assert_eq!(value, FieldInput::Text("High".to_string()));

        let (_, value) = parse_field_assignment("Notes=a=b").unwrap();
        assert_eq!(value, FieldInput::Text("a=b".to_string()));

        assert!(parse_field_assignment("Priority").is_err());
        assert!(parse_field_assignment("=High").is_err());
    }

    #[test]
    fn test_blank_field_input() {
        assert!(FieldInput::from("  ").is_blank());
        assert!(!FieldInput::from("x").is_blank());
        assert!(!FieldInput::Number(0.into()).is_blank());
        assert!(!FieldInput::Bool(false).is_blank());
        assert!(FieldInput::Null.is_blank());
    }

    #[test]
    fn test_row_tolerates_missing_and_null_values() {
        let row: IssueRow = serde_json::from_str(
            r#"{"title":null,"description":null,"fields":{"Done":true,"Assignee":null},"images":null}"#,
        )
        .unwrap();
        assert_eq!(row.id.len(), 36);
        assert_eq!(row.title, "");
        assert_eq!(row.description, "");
        assert_eq!(row.fields["Done"], FieldInput::Bool(true));
        assert_eq!(row.fields["Done"].to_string(), "true");
        assert_eq!(row.fields["Assignee"], FieldInput::Null);
        assert!(row.images.is_empty());
    }

    #[test]
    fn test_scalar_field_inputs_serialize_unchanged() {
        let json = serde_json::to_string(&vec![FieldInput::Bool(true), FieldInput::Null]).unwrap();
        assert_eq!(json, "[true,null]");
    }

    #[test]
    fn test_image_attachment_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, [0u8, 1, 2, 3, 4, 5]).unwrap();

        let image = ImageAttachment::from_path(&path).unwrap();
        assert_eq!(image.file_name, "shot.png");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.data, "AAECAwQF");
        assert_eq!(image.size(), 6);
    }
}
