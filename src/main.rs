mod app;
mod cache;
mod clone;
mod config;
mod error;
mod exec;
mod github;
mod hook;
mod listing;
mod logging;
mod picker;
mod preview;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use app::{App, ListingOptions};
use clap::{Parser, Subcommand};
use config::Config;
use error::{RepoManError, Result};
use exec::{CommandExecutor, SystemExecutor};
use listing::{RepoType, SortKey, build_repo_map, select_by_names};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "gh-repo-man",
    about = "A gh extension to manage your repositories"
)]
struct Cli {
    /// The user to fetch repositories for
    #[arg(long, short)]
    user: Option<String>,

    /// Path to configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Filter by repository type
    #[arg(long = "type", short = 't', value_enum)]
    repo_type: Option<RepoType>,

    /// Filter by primary language
    #[arg(long, short)]
    language: Option<String>,

    /// Sort repositories by
    #[arg(long, short, value_enum)]
    sort: Option<SortKey>,

    /// Log filter (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show details for a repository (used by the fzf preview pane)
    #[command(hide = true)]
    Preview {
        name: String,

        /// The user whose repositories to search
        #[arg(long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = match cli.command {
        Some(Command::Preview { .. }) => logging::PREVIEW_LEVEL,
        None => logging::DEFAULT_LEVEL,
    };
    logging::init(cli.log_level.as_deref(), default_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref());
    let executor: Arc<dyn CommandExecutor> = Arc::new(SystemExecutor);
    let app = App::new(config, executor)?;

    if let Some(Command::Preview { name, user }) = cli.command {
        let user = user.or(cli.user).unwrap_or_default();
        // Errors go to stdout so they show up in the preview pane.
        match app.preview(&name, &user).await {
            Ok(text) => print!("{text}"),
            Err(e) => println!("Error fetching repos for preview: {e}"),
        }
        return Ok(());
    }

    let user = cli.user.unwrap_or_default();
    let options = ListingOptions::from_config(&app.config().repos).with_overrides(
        cli.repo_type,
        cli.language,
        cli.sort,
    );

    let token = CancellationToken::new();
    tokio::spawn({
        let token = token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling");
                token.cancel();
            }
        }
    });

    let repos = app.list_repositories(&user, &options, token.clone()).await?;
    if repos.is_empty() {
        println!("No repositories found.");
        return Ok(());
    }

    let selected = match app.pick(&repos, &user).await {
        Ok(names) => names,
        Err(RepoManError::SelectionCancelled) => {
            println!("Selection cancelled.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let map = build_repo_map(&repos);
    let chosen = select_by_names(&map, &selected);
    if chosen.is_empty() {
        println!("No repositories selected.");
        return Ok(());
    }

    app.clone_selected(&chosen, token).await?;
    Ok(())
}
