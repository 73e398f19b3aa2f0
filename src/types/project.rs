use std::fmt;

use serde::{Deserialize, Serialize};

use super::FieldInput;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ProjectRepository {
    pub id: String,
    pub name: String,
}

/// An open Projects (v2) board.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub number: u64,
    pub name: String,
    pub repositories: Vec<ProjectRepository>,
}

/// Organization repository from the REST listing.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

/// Data type of a project field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Number,
    SingleSelect,
    Date,
    Iteration,
    Title,
    Other(String),
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "TEXT" => Self::Text,
            "NUMBER" => Self::Number,
            "SINGLE_SELECT" => Self::SingleSelect,
            "DATE" => Self::Date,
            "ITERATION" => Self::Iteration,
            "TITLE" => Self::Title,
            _ => Self::Other(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "TEXT"),
            Self::Number => write!(f, "NUMBER"),
            Self::SingleSelect => write!(f, "SINGLE_SELECT"),
            Self::Date => write!(f, "DATE"),
            Self::Iteration => write!(f, "ITERATION"),
            Self::Title => write!(f, "TITLE"),
            Self::Other(other) => write!(f, "{other}"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FieldOption {
    pub id: String,
    pub name: String,
}

/// A typed column on a project board.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ProjectField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

impl ProjectField {
    /// Find a select option by id, then by case-insensitive name
    pub fn find_option(&self, value: &str) -> Option<&FieldOption> {
        self.options
            .iter()
            .find(|o| o.id == value)
            .or_else(|| self.options.iter().find(|o| o.name.eq_ignore_ascii_case(value)))
    }

    /// Display text for a stored value: option names for selects, raw value otherwise
    pub fn display_value(&self, raw: Option<&FieldInput>) -> String {
        let Some(raw) = raw.filter(|r| !r.is_blank()) else {
            return "-".to_string();
        };

        if self.field_type == FieldType::SingleSelect {
            if let Some(option) = self.find_option(&raw.to_string()) {
                return option.name.clone();
            }
        }

        raw.to_string()
    }

    /// Field types a draft can carry a value for
    pub fn is_editable(&self) -> bool {
        matches!(
            self.field_type,
            FieldType::Text | FieldType::Number | FieldType::SingleSelect | FieldType::Date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_from_data_type() {
        assert_eq!(FieldType::from("SINGLE_SELECT".to_string()), FieldType::SingleSelect);
        assert_eq!(
            FieldType::from("ASSIGNEES".to_string()),
            FieldType::Other("ASSIGNEES".to_string())
        );
        assert_eq!(FieldType::Other("LABELS".to_string()).to_string(), "LABELS");
    }

    #[test]
    fn test_field_type_serde() {
        let field: ProjectField =
            serde_json::from_str(r#"{"id":"F1","name":"Due","type":"DATE"}"#).unwrap();
        assert_eq!(field.field_type, FieldType::Date);
        assert!(field.options.is_empty());
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "DATE");
    }

    #[test]
    fn test_find_option() {
        let field = ProjectField {
            id: "F1".to_string(),
            name: "Priority".to_string(),
            field_type: FieldType::SingleSelect,
            options: vec![
                FieldOption {
                    id: "opt-high".to_string(),
                    name: "High".to_string(),
                },
                FieldOption {
                    id: "opt-low".to_string(),
                    name: "Low".to_string(),
                },
            ],
        };
        assert_eq!(field.find_option("opt-low").map(|o| o.name.as_str()), Some("Low"));
        assert_eq!(field.find_option("high").map(|o| o.id.as_str()), Some("opt-high"));
        assert!(field.find_option("Medium").is_none());

        assert_eq!(field.display_value(Some(&"opt-low".into())), "Low");
        assert_eq!(field.display_value(Some(&"stale".into())), "stale");
        assert_eq!(field.display_value(None), "-");
        assert_eq!(field.display_value(Some(&"".into())), "-");
    }
}
