use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::types::Theme;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

#[derive(Parser)]
#[command(name = "ghic")]
#[command(about = "Batch-create GitHub issues and add them to Projects", version)]
#[command(after_help = "EXAMPLES:
    ghic init                                  Configure organization and token
    ghic projects                              List open projects
    ghic draft add -t \"Bug A\" --field Priority=High
    ghic draft list                            Show the draft table
    ghic submit --repo web                     Create all drafts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, compact)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress success messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show debug logs and detailed error information
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure organization and token interactively
    #[command(after_help = "EXAMPLES:
    ghic init")]
    Init,
    /// Show or change connection settings
    #[command(after_help = "EXAMPLES:
    ghic settings show
    ghic settings set --org acme --token ghp_xxx
    ghic settings set --project PVT_kwDOABCD --repo web
    ghic settings test
    ghic settings clear")]
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
    /// List open projects in the organization
    #[command(
        alias = "p",
        after_help = "EXAMPLES:
    ghic projects
    ghic projects --search roadmap"
    )]
    Projects {
        /// Filter projects by search term
        #[arg(long, short)]
        search: Option<String>,
    },
    /// List repositories of the selected project, or of the organization
    #[command(
        alias = "r",
        after_help = "EXAMPLES:
    ghic repos
    ghic repos --all"
    )]
    Repos {
        /// List every organization repository, ignoring the selected project
        #[arg(long)]
        all: bool,
    },
    /// List fields of a project
    #[command(after_help = "EXAMPLES:
    ghic fields
    ghic fields --project PVT_kwDOABCD")]
    Fields {
        /// Project id (uses the selected project if not specified)
        #[arg(long)]
        project: Option<String>,
    },
    /// List issue templates of a repository
    #[command(after_help = "EXAMPLES:
    ghic templates
    ghic templates --repo web")]
    Templates {
        /// Repository name (uses the selected repository if not specified)
        #[arg(long)]
        repo: Option<String>,
    },
    /// Manage the draft issue table
    #[command(
        alias = "d",
        after_help = "EXAMPLES:
    ghic draft add -t \"Fix login\" --template bug --field Priority=High
    ghic draft list
    ghic draft edit 1a2b3c4d --field Estimate=3
    ghic draft export
    ghic draft import github-issues-2024-03-01.json"
    )]
    Draft {
        #[command(subcommand)]
        action: DraftCommands,
    },
    /// Create every draft on GitHub
    #[command(after_help = "EXAMPLES:
    ghic submit
    ghic submit --repo web --project PVT_kwDOABCD --yes
    ghic submit --drafts --project PVT_kwDOABCD")]
    Submit(SubmitArgs),
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    ghic completions bash > ~/.bash_completion.d/ghic
    ghic completions zsh > ~/.zfunc/_ghic")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings (token masked)
    Show,
    /// Update settings; checks the connection before saving
    Set(SettingsSetArgs),
    /// Test the stored credentials against GitHub
    Test,
    /// Reset settings, drafts and remembered values
    Clear {
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct SettingsSetArgs {
    /// Organization login
    #[arg(long)]
    pub org: Option<String>,

    /// Personal access token (needs: repo, admin:org, project)
    #[arg(long)]
    pub token: Option<String>,

    /// Project node id; empty string to unset
    #[arg(long)]
    pub project: Option<String>,

    /// Repository name; empty string to unset
    #[arg(long)]
    pub repo: Option<String>,

    /// Color theme
    #[arg(long, value_enum)]
    pub theme: Option<Theme>,
}

#[derive(Subcommand)]
pub enum DraftCommands {
    /// Add a draft issue
    #[command(alias = "a")]
    Add(DraftAddArgs),
    /// Show the draft table
    #[command(alias = "ls")]
    List,
    /// Edit a draft in place
    #[command(alias = "e")]
    Edit(DraftEditArgs),
    /// Remove a draft
    #[command(alias = "rm")]
    Remove {
        /// Draft id or unique prefix
        id: String,
    },
    /// Remove every draft
    Clear,
    /// Write drafts to a JSON file
    Export {
        /// Output path (default: github-issues-<date>.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace drafts with the contents of a JSON file
    Import {
        /// File produced by `ghic draft export`
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct DraftAddArgs {
    /// Issue title
    #[arg(long, short)]
    pub title: String,

    /// Issue body (seeded from the template if omitted)
    #[arg(long, short)]
    pub description: Option<String>,

    /// Issue template name (defaults to the last used template)
    #[arg(long)]
    pub template: Option<String>,

    /// Do not apply the last used template or field values
    #[arg(long)]
    pub no_defaults: bool,

    /// Project field value as KEY=VALUE (field id or name)
    #[arg(long = "field", short = 'f', value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// Image to keep with the draft
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,
}

#[derive(Args)]
pub struct DraftEditArgs {
    /// Draft id or unique prefix
    pub id: String,

    /// New title
    #[arg(long, short)]
    pub title: Option<String>,

    /// New body
    #[arg(long, short)]
    pub description: Option<String>,

    /// Set a field value as KEY=VALUE
    #[arg(long = "field", short = 'f', value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// Remove a field value
    #[arg(long = "unset", value_name = "KEY")]
    pub unset: Vec<String>,
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Target repository (uses the selected repository if not specified)
    #[arg(long)]
    pub repo: Option<String>,

    /// Project to add issues to (uses the selected project if not specified)
    #[arg(long, conflicts_with = "no_project")]
    pub project: Option<String>,

    /// Do not add issues to any project
    #[arg(long)]
    pub no_project: bool,

    /// Create project draft issues instead of repository issues
    #[arg(long, conflicts_with_all = ["repo", "no_project"])]
    pub drafts: bool,

    /// Do not ask for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_draft_add() {
        let cli = Cli::try_parse_from([
            "ghic", "draft", "add", "-t", "Bug A", "-f", "Priority=High", "-f", "Estimate=3",
        ])
        .unwrap();
        let Commands::Draft { action: DraftCommands::Add(args) } = cli.command else {
            panic!("expected draft add");
        };
        assert_eq!(args.title, "Bug A");
        assert_eq!(args.fields, vec!["Priority=High", "Estimate=3"]);
    }

    #[test]
    fn test_submit_drafts_conflicts_with_repo() {
        assert!(Cli::try_parse_from(["ghic", "submit", "--drafts", "--repo", "web"]).is_err());
    }

    #[test]
    fn test_json_alias() {
        let cli = Cli::try_parse_from(["ghic", "--json", "projects"]).unwrap();
        assert!(matches!(cli.output_format(), OutputFormat::Json));
    }
}
