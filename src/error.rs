use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IssueCreatorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to reach GitHub API. Please check your internet connection.")]
    Connectivity(#[source] reqwest::Error),

    #[error("Invalid GitHub token. Please check your Personal Access Token.")]
    InvalidToken,

    #[error(
        "Access forbidden. Please check your token permissions (needs: repo, admin:org, project)."
    )]
    Forbidden,

    #[error("Organization or resource not found. Please check the organization name.")]
    NotFound,

    #[error("GitHub API error: {message}")]
    ApiError { status: u16, message: String },

    #[error("{0}")]
    GraphQL(String),

    #[error("Empty response from API")]
    EmptyResponse,

    #[error("No project found with ID: {0}")]
    ProjectNotFound(String),

    #[error("Failed to read {path}: {source}")]
    StateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse state file at {path}: {source}")]
    StateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error(
        "GitHub credentials not configured. Run `ghic init` or set GITHUB_TOKEN and `ghic settings set --org <org>`"
    )]
    MissingCredentials,

    #[error("No repository selected. Pass --repo or run `ghic settings set --repo <name>`")]
    NoRepository,

    #[error("No project selected. Pass --project or run `ghic settings set --project <id>`")]
    NoProject,

    #[error("Failed to parse the imported file: {0}")]
    ImportParse(#[source] serde_json::Error),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },

    #[error("Invalid field assignment '{0}'. Expected KEY=VALUE")]
    InvalidFieldAssignment(String),

    #[error("Draft issue not found: {0}")]
    DraftNotFound(String),

    #[error("Draft id prefix '{0}' matches more than one draft")]
    AmbiguousDraft(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{failed} of {total} issues failed to submit")]
    BatchIncomplete { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, IssueCreatorError>;
