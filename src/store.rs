use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IssueCreatorError, Result};
use crate::types::{null_as_default, FieldInput, IssueRow, Settings, SettingsUpdate};

/// Persisted record, one JSON document on disk.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    #[serde(deserialize_with = "null_as_default")]
    pub settings: Settings,
    pub is_configured: bool,
    pub last_used_template: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub last_used_fields: BTreeMap<String, FieldInput>,
    #[serde(deserialize_with = "null_as_default")]
    pub draft_issues: Vec<IssueRow>,
}

/// Settings and draft issues, written through to disk on every change.
pub struct SettingsStore {
    path: PathBuf,
    state: PersistedState,
}

impl SettingsStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            debug!(path = %path.display(), "No state file, starting empty");
            return Ok(Self {
                path,
                state: PersistedState::default(),
            });
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| IssueCreatorError::StateRead {
            path: path.clone(),
            source: e,
        })?;

        let state: PersistedState =
            serde_json::from_str(&contents).map_err(|e| IssueCreatorError::StateParse {
                path: path.clone(),
                source: e,
            })?;

        Ok(Self { path, state })
    }

    /// Load, starting empty when the file cannot be read or parsed
    pub fn load_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::load(path.clone()).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable state file");
            Self {
                path,
                state: PersistedState::default(),
            }
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn draft_issues(&self) -> &[IssueRow] {
        &self.state.draft_issues
    }

    pub fn last_used_template(&self) -> Option<&str> {
        self.state.last_used_template.as_deref()
    }

    pub fn last_used_fields(&self) -> &BTreeMap<String, FieldInput> {
        &self.state.last_used_fields
    }

    /// Organization present, or a token whose connection has been validated.
    pub fn is_configured(&self) -> bool {
        let settings = &self.state.settings;
        !settings.organization.is_empty() || (!settings.token.is_empty() && settings.is_valid)
    }

    /// Merge `update` into the settings. `valid_connection` replaces the
    /// validity flag when given.
    pub fn update_settings(
        &mut self,
        update: SettingsUpdate,
        valid_connection: Option<bool>,
    ) -> Result<()> {
        self.state.settings.merge(update);
        if let Some(valid) = valid_connection {
            self.state.settings.is_valid = valid;
        }
        self.save()
    }

    pub fn clear_settings(&mut self) -> Result<()> {
        self.state = PersistedState::default();
        self.save()
    }

    pub fn set_last_used_template(&mut self, template: Option<String>) -> Result<()> {
        self.state.last_used_template = template;
        self.save()
    }

    pub fn set_last_used_fields(&mut self, fields: BTreeMap<String, FieldInput>) -> Result<()> {
        self.state.last_used_fields = fields;
        self.save()
    }

    pub fn set_draft_issues(&mut self, issues: Vec<IssueRow>) -> Result<()> {
        self.state.draft_issues = issues;
        self.save()
    }

    fn save(&mut self) -> Result<()> {
        self.state.is_configured = self.is_configured();

        let write_err = |source| IssueCreatorError::StateWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let contents = serde_json::to_string_pretty(&self.state).map_err(std::io::Error::from)?;
        std::fs::write(&self.path, contents).map_err(write_err)?;

        // The token is stored in plain text; keep it private to the user
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;
        }

        debug!(path = %self.path.display(), drafts = self.state.draft_issues.len(), "Saved state");
        Ok(())
    }
}
