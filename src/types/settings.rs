use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Color theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Also used for unrecognized values in older state files
    #[default]
    #[serde(other)]
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// GitHub connection parameters.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(deserialize_with = "null_as_default")]
    pub organization: String,
    #[serde(deserialize_with = "null_as_default")]
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_repo: Option<String>,
    pub is_valid: bool,
    pub theme: Theme,
}

/// Partial settings update; `None` leaves a field untouched.
///
/// For `project_id` and `selected_repo`, `Some("")` clears the value.
#[derive(Debug, Default, Clone)]
pub struct SettingsUpdate {
    pub organization: Option<String>,
    pub token: Option<String>,
    pub project_id: Option<String>,
    pub selected_repo: Option<String>,
    pub theme: Option<Theme>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.organization.is_none()
            && self.token.is_none()
            && self.project_id.is_none()
            && self.selected_repo.is_none()
            && self.theme.is_none()
    }

    /// Whether the update touches the credentials, requiring a new connection check
    pub fn changes_credentials(&self) -> bool {
        self.organization.is_some() || self.token.is_some()
    }
}

impl Settings {
    pub fn merge(&mut self, update: SettingsUpdate) {
        if let Some(organization) = update.organization {
            self.organization = organization.trim().to_string();
        }
        if let Some(token) = update.token {
            self.token = token.trim().to_string();
        }
        if let Some(project_id) = update.project_id {
            self.project_id = non_empty(project_id);
        }
        if let Some(repo) = update.selected_repo {
            self.selected_repo = non_empty(repo);
        }
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
    }

    /// Token with all but the last four characters hidden
    pub fn masked_token(&self) -> String {
        let count = self.token.chars().count();
        if count == 0 {
            return "-".to_string();
        }
        if count <= 4 {
            return "*".repeat(count);
        }
        let tail: String = self.token.chars().skip(count - 4).collect();
        format!("{}{}", "*".repeat(count - 4), tail)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let mut settings = Settings {
            organization: "acme".to_string(),
            token: "ghp_secret".to_string(),
            ..Default::default()
        };
        settings.merge(SettingsUpdate {
            selected_repo: Some("web".to_string()),
            ..Default::default()
        });
        assert_eq!(settings.organization, "acme");
        assert_eq!(settings.token, "ghp_secret");
        assert_eq!(settings.selected_repo.as_deref(), Some("web"));
    }

    #[test]
    fn test_merge_empty_string_clears_optional() {
        let mut settings = Settings {
            project_id: Some("PVT_1".to_string()),
            ..Default::default()
        };
        settings.merge(SettingsUpdate {
            project_id: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(settings.project_id, None);
    }

    #[test]
    fn test_masked_token() {
        let settings = Settings {
            token: "ghp_abcdef1234".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.masked_token(), "**********1234");
        assert_eq!(Settings::default().masked_token(), "-");
    }

    #[test]
    fn test_missing_keys_deserialize_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"organization":"acme"}"#).unwrap();
        assert_eq!(settings.organization, "acme");
        assert!(!settings.is_valid);
        assert_eq!(settings.theme, Theme::System);
    }

    #[test]
    fn test_unknown_theme_and_null_strings_fall_back() {
        let settings: Settings =
            serde_json::from_str(r#"{"organization":"acme","token":null,"theme":"blue"}"#)
                .unwrap();
        assert_eq!(settings.organization, "acme");
        assert_eq!(settings.token, "");
        assert_eq!(settings.theme, Theme::System);
    }
}
