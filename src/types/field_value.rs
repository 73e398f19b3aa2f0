use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::{json, Value};

use super::{FieldInput, FieldType, ProjectField};
use crate::error::{IssueCreatorError, Result};

/// A project field value in the shape `updateProjectV2ItemFieldValue` expects.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectFieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    SingleSelectOptionId(String),
}

impl ProjectFieldValue {
    /// Coerce a raw draft value to the typed value for `field`.
    ///
    /// Without a known field the value is sent as text.
    pub fn coerce(field: Option<&ProjectField>, raw: &FieldInput) -> Result<Self> {
        let Some(field) = field else {
            return Ok(Self::Text(raw.to_string()));
        };

        let invalid = |reason: String| IssueCreatorError::InvalidFieldValue {
            field: field.name.clone(),
            reason,
        };

        match field.field_type {
            FieldType::SingleSelect => {
                let wanted = raw.to_string();
                field
                    .find_option(wanted.trim())
                    .map(|o| Self::SingleSelectOptionId(o.id.clone()))
                    .ok_or_else(|| {
                        let names: Vec<&str> =
                            field.options.iter().map(|o| o.name.as_str()).collect();
                        invalid(format!(
                            "'{wanted}' is not an option (expected one of: {})",
                            names.join(", ")
                        ))
                    })
            }
            FieldType::Number => {
                let number = match raw {
                    FieldInput::Number(n) => n.as_f64(),
                    other => other.to_string().trim().parse::<f64>().ok(),
                };
                number
                    .filter(|n| n.is_finite())
                    .map(Self::Number)
                    .ok_or_else(|| invalid(format!("'{raw}' is not a number")))
            }
            FieldType::Date => {
                let text = raw.to_string();
                NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                    .map(Self::Date)
                    .map_err(|_| invalid(format!("'{text}' is not a YYYY-MM-DD date")))
            }
            _ => Ok(Self::Text(raw.to_string())),
        }
    }

    /// GraphQL `ProjectV2FieldValue` input object
    pub fn to_graphql(&self) -> Value {
        match self {
            Self::Text(text) => json!({ "text": text }),
            Self::Number(number) => json!({ "number": number }),
            Self::Date(date) => json!({ "date": date.format("%Y-%m-%d").to_string() }),
            Self::SingleSelectOptionId(id) => json!({ "singleSelectOptionId": id }),
        }
    }
}

/// Field definitions keyed by id, with case-insensitive name fallback.
#[derive(Debug, Default)]
pub struct FieldLookup {
    fields: Vec<ProjectField>,
    by_id: HashMap<String, usize>,
}

impl FieldLookup {
    pub fn new(fields: Vec<ProjectField>) -> Self {
        let by_id = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id.clone(), i))
            .collect();
        Self { fields, by_id }
    }

    pub fn get(&self, key: &str) -> Option<&ProjectField> {
        self.by_id
            .get(key)
            .map(|&i| &self.fields[i])
            .or_else(|| self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(key)))
    }

    pub fn fields(&self) -> &[ProjectField] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldOption;

    fn field(id: &str, name: &str, field_type: FieldType) -> ProjectField {
        ProjectField {
            id: id.to_string(),
            name: name.to_string(),
            field_type,
            options: Vec::new(),
        }
    }

    fn priority() -> ProjectField {
        ProjectField {
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
            ..field("F_PRIO", "Priority", FieldType::SingleSelect)
        }
    }

    #[test]
    fn test_single_select_by_name_and_id() {
        let f = priority();
        let by_name = ProjectFieldValue::coerce(Some(&f), &"High".into()).unwrap();
        assert_eq!(by_name.to_graphql(), json!({ "singleSelectOptionId": "opt-high" }));

        let by_id = ProjectFieldValue::coerce(Some(&f), &"opt-low".into()).unwrap();
        assert_eq!(by_id, ProjectFieldValue::SingleSelectOptionId("opt-low".to_string()));
    }

    #[test]
    fn test_single_select_unknown_option() {
        let err = ProjectFieldValue::coerce(Some(&priority()), &"Urgent".into()).unwrap_err();
        assert!(err.to_string().contains("High, Low"));
    }

    #[test]
    fn test_number_coercion() {
        let f = field("F_EST", "Estimate", FieldType::Number);
        let value = ProjectFieldValue::coerce(Some(&f), &" 2.5 ".into()).unwrap();
        assert_eq!(value.to_graphql(), json!({ "number": 2.5 }));

        let from_number =
            ProjectFieldValue::coerce(Some(&f), &FieldInput::Number(3.into())).unwrap();
        assert_eq!(from_number, ProjectFieldValue::Number(3.0));

        assert!(ProjectFieldValue::coerce(Some(&f), &"lots".into()).is_err());
        assert!(ProjectFieldValue::coerce(Some(&f), &FieldInput::Bool(true)).is_err());
    }

    #[test]
    fn test_date_coercion() {
        let f = field("F_DUE", "Due", FieldType::Date);
        let value = ProjectFieldValue::coerce(Some(&f), &"2024-03-01".into()).unwrap();
        assert_eq!(value.to_graphql(), json!({ "date": "2024-03-01" }));
        assert!(ProjectFieldValue::coerce(Some(&f), &"03/01/2024".into()).is_err());
    }

    #[test]
    fn test_text_and_unknown_default_to_text() {
        let f = field("F_NOTE", "Notes", FieldType::Text);
        let value = ProjectFieldValue::coerce(Some(&f), &"hello".into()).unwrap();
        assert_eq!(value.to_graphql(), json!({ "text": "hello" }));

        let stale = ProjectFieldValue::coerce(None, &FieldInput::Number(7.into())).unwrap();
        assert_eq!(stale.to_graphql(), json!({ "text": "7" }));

        let flag = ProjectFieldValue::coerce(Some(&f), &FieldInput::Bool(true)).unwrap();
        assert_eq!(flag.to_graphql(), json!({ "text": "true" }));
    }

    #[test]
    fn test_lookup_by_id_then_name() {
        let lookup = FieldLookup::new(vec![priority(), field("F_DUE", "Due", FieldType::Date)]);
        assert_eq!(lookup.get("F_PRIO").map(|f| f.name.as_str()), Some("Priority"));
        assert_eq!(lookup.get("priority").map(|f| f.id.as_str()), Some("F_PRIO"));
        assert!(lookup.get("Status").is_none());
    }
}
