mod api;
mod batch;
mod cli;
mod client;
mod commands;
mod config;
mod error;
mod output;
mod responses;
mod store;
mod templates;
mod transfer;
mod types;

use std::error::Error;
use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands, DraftCommands, SettingsCommands};
use config::Config;
use error::Result;
use store::SettingsStore;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if std::env::args().any(|arg| arg == "--verbose" || arg == "-v") {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` wins over the default level
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    // Set global output format
    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "ghic", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load()?;
    let state_path = config.state_path()?;
    debug!(path = %state_path.display(), "Loading state");
    let mut store = match &cli.command {
        // Clearing must work even when the state file no longer parses
        Commands::Settings {
            action: SettingsCommands::Clear { .. },
        } => SettingsStore::load_or_empty(state_path),
        _ => SettingsStore::load(state_path)?,
    };

    match cli.command {
        Commands::Init => {
            commands::init::run(&mut store, &config).await?;
        }
        Commands::Settings { action } => match action {
            SettingsCommands::Show => {
                commands::settings::show(&store, &config)?;
            }
            SettingsCommands::Set(args) => {
                commands::settings::set(&mut store, &config, args).await?;
            }
            SettingsCommands::Test => {
                commands::settings::test(&mut store, &config).await?;
            }
            SettingsCommands::Clear { yes } => {
                commands::settings::clear(&mut store, yes)?;
            }
        },
        Commands::Draft { action } => match action {
            DraftCommands::Add(args) => {
                commands::drafts::add(&mut store, &config, args).await?;
            }
            DraftCommands::List => {
                commands::drafts::list(&store, &config).await?;
            }
            DraftCommands::Edit(args) => {
                commands::drafts::edit(&mut store, args)?;
            }
            DraftCommands::Remove { id } => {
                commands::drafts::remove(&mut store, &id)?;
            }
            DraftCommands::Clear => {
                commands::drafts::clear(&mut store)?;
            }
            DraftCommands::Export { output } => {
                commands::drafts::export(&store, output)?;
            }
            DraftCommands::Import { file } => {
                commands::drafts::import(&mut store, file)?;
            }
        },
        // Commands that require a client
        command => {
            let client = commands::connect(&config, store.settings())?;
            let settings = store.settings().clone();

            match command {
                Commands::Projects { search } => {
                    commands::projects::list(&client, search).await?;
                }
                Commands::Repos { all } => {
                    commands::repos::list(&client, &settings, all).await?;
                }
                Commands::Fields { project } => {
                    commands::fields::list(&client, project, settings.project_id.as_deref())
                        .await?;
                }
                Commands::Templates { repo } => {
                    commands::templates::list(&client, repo, settings.selected_repo.as_deref())
                        .await?;
                }
                Commands::Submit(args) => {
                    commands::submit::run(&mut store, &client, args).await?;
                }
                Commands::Init
                | Commands::Settings { .. }
                | Commands::Draft { .. }
                | Commands::Completions { .. } => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
