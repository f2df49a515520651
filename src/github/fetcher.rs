// Remote data fetcher.
// Resolves repository listings, READMEs, and the current username through `gh`, consulting the TTL cache first.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::cache::{Account, Cache, CacheKey};
use crate::error::{RepoManError, Result};
use crate::exec::{CommandExecutor, Deadline, Invocation, run_until};

use super::types::{LIST_FIELDS, Repository};
use super::validate::{parse_full_name, validate_username};

/// Upper bound on repositories requested per listing.
pub const DEFAULT_REPO_LIMIT: u32 = 1000;

/// Default timeout for a single `gh` call.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5 * 60);

const GH: &str = "gh";
const README_ACCEPT: &str = "Accept: application/vnd.github.v3.raw";

#[derive(Debug, Deserialize)]
struct AuthenticatedUser {
    login: String,
}

/// Fetches GitHub data via the `gh` CLI with a TTL cache in front.
pub struct RemoteFetcher {
    executor: Arc<dyn CommandExecutor>,
    cache: Cache,
    timeout: Duration,
}

impl RemoteFetcher {
    pub fn new(executor: Arc<dyn CommandExecutor>, cache: Cache) -> Self {
        Self {
            executor,
            cache,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// List repositories for `account` (empty for the authenticated user).
    pub async fn fetch_repositories(&self, account: &str) -> Result<Vec<Repository>> {
        self.fetch_repositories_with_cancel(account, CancellationToken::new())
            .await
    }

    /// List repositories, aborting and killing `gh` if `token` fires or the timeout elapses.
    pub async fn fetch_repositories_with_cancel(
        &self,
        account: &str,
        token: CancellationToken,
    ) -> Result<Vec<Repository>> {
        validate_username(account)?;
        let account = Account::from(account);
        let key = CacheKey::Repositories(account.clone());

        if let Some(repos) = self.cache.fresh_json::<Vec<Repository>>(&key) {
            tracing::debug!(%account, count = repos.len(), "repository listing served from cache");
            return Ok(repos);
        }

        let invocation = list_invocation(&account);
        let deadline = Deadline::with_timeout(token, self.timeout);
        let output = run_until(
            self.executor.as_ref(),
            &invocation,
            &deadline,
            "repository listing",
        )
        .await?;

        if !output.success() {
            return Err(RepoManError::CommandFailed {
                context: format!("failed to fetch repositories for {account}"),
                stderr: output.stderr,
            });
        }

        let repos: Vec<Repository> =
            serde_json::from_str(&output.stdout).map_err(|source| RepoManError::Parse {
                what: "GitHub API response",
                source,
            })?;

        if let Err(e) = self.cache.save_json(&key, &repos) {
            tracing::warn!(%account, error = %e, "failed to cache repository listing");
        }

        Ok(repos)
    }

    /// README for `owner/name`. A repository without a README yields an empty string.
    pub async fn fetch_readme(&self, full_name: &str) -> Result<String> {
        let (owner, repo) = parse_full_name(full_name)?;
        let key = CacheKey::readme(owner, repo);

        if let Some(content) = self.cache.fresh_text(&key) {
            return Ok(content);
        }

        let invocation = Invocation::new(GH)
            .arg("api")
            .arg(format!("repos/{owner}/{repo}/readme"))
            .args(["-H", README_ACCEPT]);
        let deadline = Deadline::with_timeout(CancellationToken::new(), self.timeout);
        let output = run_until(self.executor.as_ref(), &invocation, &deadline, "README fetch").await?;

        let content = if output.success() {
            output.stdout
        } else if is_not_found(output.exit_code, &output.stderr) {
            tracing::debug!(repo = full_name, "no README");
            String::new()
        } else {
            return Err(RepoManError::CommandFailed {
                context: "gh api failed".to_string(),
                stderr: output.stderr,
            });
        };

        if let Err(e) = self.cache.save_text(&key, &content) {
            tracing::warn!(repo = full_name, error = %e, "failed to cache README");
        }

        Ok(content)
    }

    /// Login of the authenticated user.
    pub async fn current_username(&self) -> Result<String> {
        if let Some(login) = self
            .cache
            .fresh_text(&CacheKey::Username)
            .filter(|login| !login.is_empty())
        {
            return Ok(login);
        }

        let invocation = Invocation::new(GH).args(["api", "user"]);
        let deadline = Deadline::with_timeout(CancellationToken::new(), self.timeout);
        let output = run_until(self.executor.as_ref(), &invocation, &deadline, "gh api user").await?;

        if !output.success() {
            return Err(RepoManError::CommandFailed {
                context: "gh api user failed".to_string(),
                stderr: output.stderr,
            });
        }

        let user: AuthenticatedUser =
            serde_json::from_str(&output.stdout).map_err(|source| RepoManError::Parse {
                what: "user API response",
                source,
            })?;
        let login = user.login.trim().to_string();

        if let Err(e) = self.cache.save_text(&CacheKey::Username, &login) {
            tracing::warn!(error = %e, "failed to cache username");
        }

        Ok(login)
    }
}

fn list_invocation(account: &Account) -> Invocation {
    let invocation = Invocation::new(GH)
        .args(["repo", "list", "--limit"])
        .arg(DEFAULT_REPO_LIMIT.to_string())
        .args(["--json", LIST_FIELDS]);
    match account.login() {
        Some(login) => invocation.arg(login),
        None => invocation,
    }
}

fn is_not_found(exit_code: Option<i32>, stderr: &str) -> bool {
    exit_code == Some(1) && (stderr.contains("Not Found") || stderr.contains("404"))
}
