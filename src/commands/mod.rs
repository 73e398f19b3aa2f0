pub mod drafts;
pub mod fields;
pub mod init;
pub mod projects;
pub mod repos;
pub mod settings;
pub mod submit;
pub mod templates;

use std::io::{self, BufRead, Write};

use crate::client::{Credentials, GitHubClient};
use crate::config::Config;
use crate::error::{IssueCreatorError, Result};
use crate::types::Settings;

/// Build a client from stored settings, with `GITHUB_TOKEN` taking precedence.
pub fn connect(config: &Config, settings: &Settings) -> Result<GitHubClient> {
    let token = config
        .resolve_token(&settings.token)
        .ok_or(IssueCreatorError::MissingCredentials)?;

    if settings.organization.is_empty() {
        return Err(IssueCreatorError::MissingCredentials);
    }

    GitHubClient::new(
        Credentials {
            organization: settings.organization.clone(),
            token,
        },
        config,
    )
}

/// Print `message` and read one trimmed line from stdin
pub fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Ask a yes/no question; anything but `y` is a no
pub fn confirm(message: &str) -> Result<bool> {
    let answer = prompt(&format!("{message} [y/N] "))?;
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
