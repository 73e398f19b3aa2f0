use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{IssueCreatorError, Result};

const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Deserialize, Default, Debug)]
pub struct Config {
    /// REST base URL, override for GitHub Enterprise
    pub api_url: Option<String>,
    /// GraphQL endpoint, defaults to `<api_url>/graphql`
    pub graphql_url: Option<String>,
    /// Location of the persisted settings and drafts
    pub state_file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| IssueCreatorError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        Self::parse(&contents).map_err(|e| IssueCreatorError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "github-issue-creator")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(IssueCreatorError::NoConfigDir)
    }

    /// State file path: GHIC_STATE_FILE, then config, then next to config.toml
    pub fn state_path(&self) -> Result<PathBuf> {
        if let Ok(path) = std::env::var("GHIC_STATE_FILE") {
            return Ok(PathBuf::from(path));
        }

        if let Some(path) = &self.state_file {
            return Ok(path.clone());
        }

        Self::config_path().map(|p| p.with_file_name("state.json"))
    }

    pub fn api_url(&self) -> String {
        self.api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn graphql_url(&self) -> String {
        self.graphql_url
            .clone()
            .unwrap_or_else(|| format!("{}/graphql", self.api_url()))
    }

    /// Get token with env var taking precedence over the stored settings
    pub fn resolve_token(&self, stored: &str) -> Option<String> {
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.is_empty() {
                return Some(token);
            }
        }

        (!stored.is_empty()).then(|| stored.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url(), "https://api.github.com");
        assert_eq!(config.graphql_url(), "https://api.github.com/graphql");
    }

    #[test]
    fn test_enterprise_urls() {
        let config = Config::parse("api_url = \"https://ghe.example.com/api/v3/\"\n").unwrap();
        assert_eq!(config.api_url(), "https://ghe.example.com/api/v3");
        assert_eq!(config.graphql_url(), "https://ghe.example.com/api/v3/graphql");
    }

    #[test]
    fn test_explicit_graphql_url() {
        let config = Config::parse(
            "api_url = \"https://ghe.example.com/api/v3\"\ngraphql_url = \"https://ghe.example.com/api/graphql\"\n",
        )
        .unwrap();
        assert_eq!(config.graphql_url(), "https://ghe.example.com/api/graphql");
    }

    #[test]
    fn test_wrong_value_type_is_error() {
        assert!(Config::parse("api_url = 3").is_err());
    }
}
