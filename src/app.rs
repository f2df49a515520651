// Application context.
// Built once at startup from the loaded config; owns the fetcher, clone orchestrator, and hook runner.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cache::{Cache, CachePaths, CacheTtls};
use crate::clone::{BatchSummary, CloneOrchestrator};
use crate::config::{Config, ReposConfig};
use crate::error::Result;
use crate::exec::CommandExecutor;
use crate::github::{RemoteFetcher, Repository};
use crate::hook::HookRunner;
use crate::listing::{RepoType, SortKey, filter_repositories, sort_repositories};
use crate::picker::{self, PickerOptions};
use crate::preview;

/// Filters and ordering applied to a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingOptions {
    pub repo_type: Option<RepoType>,
    pub language: Option<String>,
    pub sort: Option<SortKey>,
}

impl ListingOptions {
    pub fn from_config(repos: &ReposConfig) -> Self {
        Self {
            repo_type: repos.repo_type,
            language: repos.language.clone(),
            sort: repos.sort_by,
        }
    }

    /// Command-line values take precedence over configured ones.
    pub fn with_overrides(
        self,
        repo_type: Option<RepoType>,
        language: Option<String>,
        sort: Option<SortKey>,
    ) -> Self {
        Self {
            repo_type: repo_type.or(self.repo_type),
            language: language.or(self.language),
            sort: sort.or(self.sort),
        }
    }
}

pub struct App {
    config: Config,
    executor: Arc<dyn CommandExecutor>,
    fetcher: RemoteFetcher,
    orchestrator: CloneOrchestrator,
    hooks: HookRunner,
}

impl App {
    pub fn new(config: Config, executor: Arc<dyn CommandExecutor>) -> Result<Self> {
        let paths = CachePaths::new(config.cache_dir()?);
        if let Err(e) = paths.ensure_dirs() {
            tracing::warn!(dir = %paths.root().display(), error = %e, "failed to create cache directory");
        }
        let cache = Cache::new(paths, CacheTtls::from_config(&config.cache));
        let mut fetcher = RemoteFetcher::new(Arc::clone(&executor), cache);
        if config.performance.listing_timeout_secs > 0 {
            fetcher = fetcher.with_timeout(Duration::from_secs(
                config.performance.listing_timeout_secs,
            ));
        }
        let orchestrator = CloneOrchestrator::from_config(Arc::clone(&executor), &config)?;
        let hooks = HookRunner::new(Arc::clone(&executor));

        Ok(Self {
            config,
            executor,
            fetcher,
            orchestrator,
            hooks,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch, filter, and sort the repositories of `user` (empty for the authenticated user).
    pub async fn list_repositories(
        &self,
        user: &str,
        options: &ListingOptions,
        token: CancellationToken,
    ) -> Result<Vec<Repository>> {
        let repos = self.fetcher.fetch_repositories_with_cancel(user, token).await?;
        let mut repos = filter_repositories(repos, options.repo_type, options.language.as_deref());
        if let Some(key) = options.sort {
            sort_repositories(&mut repos, key);
        }
        tracing::debug!(count = repos.len(), "repositories listed");
        Ok(repos)
    }

    /// Let the user choose among `repos`; returns the chosen names in fzf's order.
    pub async fn pick(&self, repos: &[Repository], user: &str) -> Result<Vec<String>> {
        let header = if user.is_empty() {
            match self.fetcher.current_username().await {
                Ok(login) => Some(login),
                Err(e) => {
                    tracing::debug!(error = %e, "could not resolve current username");
                    None
                }
            }
        } else {
            Some(user.to_string())
        };

        let invocation = picker::command_invocation(self.executor.as_ref());
        let options = PickerOptions {
            preview_command: picker::preview_command(&invocation, user),
            color: self.config.ui.color_output,
            header,
        };
        let names: Vec<String> = repos.iter().map(|r| r.name.clone()).collect();
        picker::select(self.executor.as_ref(), &names, &options).await
    }

    /// Preview text for repository `name` of `user`.
    pub async fn preview(&self, name: &str, user: &str) -> Result<String> {
        let repos = self.fetcher.fetch_repositories(user).await?;
        let Some(repo) = repos.iter().find(|r| r.name == name) else {
            return Ok(format!("Repository {name} not found.\n"));
        };

        let mut out = preview::render_card(repo);
        if self.config.ui.show_readme_in_preview {
            match self.fetcher.fetch_readme(&repo.full_name()).await {
                Ok(content) => out.push_str(&preview::render_readme(&content)),
                Err(e) => out.push_str(&format!("\n---\nError fetching README: {e}\n")),
            }
        }
        Ok(out)
    }

    /// Clone `repos`, then run the post-clone hook over them.
    pub async fn clone_selected(
        &self,
        repos: &[Repository],
        token: CancellationToken,
    ) -> Result<BatchSummary> {
        tracing::info!("Cloning selected repositories...");
        let summary = self.orchestrator.clone_all_with_cancel(repos, token).await?;
        tracing::info!(cloned = summary.cloned, skipped = summary.skipped, "Cloning complete.");

        let hooks = self
            .hooks
            .run(
                repos,
                self.orchestrator.layout(),
                &self.config.integrations.post_clone,
            )
            .await?;
        if hooks.failed > 0 {
            tracing::warn!(failed = hooks.failed, "some post-clone commands failed");
        }

        Ok(summary)
    }
}
