// Concurrent clone orchestrator.
// Runs one task per repository behind a semaphore; a shared deadline stops admission and kills running clones.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{RepoManError, Result};
use crate::exec::{CommandExecutor, Deadline, wait_or_kill};
use crate::github::Repository;

use super::job::{BatchResult, BatchSummary, CloneJob, JobReport, JobState};
use super::layout::{GitCloneSettings, ProjectLayout, clone_invocation};

pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// Per-repository share of the batch deadline.
pub const DEFAULT_PER_REPO_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Clones batches of repositories with bounded concurrency.
pub struct CloneOrchestrator {
    executor: Arc<dyn CommandExecutor>,
    layout: ProjectLayout,
    git: GitCloneSettings,
    max_concurrent: usize,
    per_repo_timeout: Duration,
}

impl CloneOrchestrator {
    pub fn new(executor: Arc<dyn CommandExecutor>, layout: ProjectLayout) -> Self {
        Self {
            executor,
            layout,
            git: GitCloneSettings::default(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            per_repo_timeout: DEFAULT_PER_REPO_TIMEOUT,
        }
    }

    pub fn from_config(executor: Arc<dyn CommandExecutor>, config: &Config) -> Result<Self> {
        let per_repo_timeout = match config.performance.clone_timeout_minutes {
            0 => DEFAULT_PER_REPO_TIMEOUT,
            minutes => Duration::from_secs(minutes.saturating_mul(60)),
        };
        Ok(Self::new(executor, ProjectLayout::from_config(config)?)
            .with_max_concurrent(config.performance.max_concurrent_clones)
            .with_git_settings(GitCloneSettings::from(&config.integrations.git))
            .with_per_repo_timeout(per_repo_timeout))
    }

    /// Concurrency limit. 0 selects the default.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = if max_concurrent == 0 {
            DEFAULT_MAX_CONCURRENT
        } else {
            max_concurrent
        };
        self
    }

    pub fn with_git_settings(mut self, git: GitCloneSettings) -> Self {
        self.git = git;
        self
    }

    pub fn with_per_repo_timeout(mut self, timeout: Duration) -> Self {
        self.per_repo_timeout = timeout;
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Ceiling for a batch of `count` repositories.
    pub fn batch_timeout(&self, count: usize) -> Duration {
        self.per_repo_timeout
            .saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Clone `repos` under the default batch deadline.
    pub async fn clone_all(&self, repos: &[Repository]) -> Result<BatchSummary> {
        self.clone_all_with_cancel(repos, CancellationToken::new())
            .await
    }

    /// Clone `repos`, stopping early when `token` is cancelled.
    pub async fn clone_all_with_cancel(
        &self,
        repos: &[Repository],
        token: CancellationToken,
    ) -> Result<BatchSummary> {
        let deadline = Deadline::with_timeout(token, self.batch_timeout(repos.len()));
        self.clone_until(repos, deadline).await
    }

    /// Clone `repos` until `deadline` fires.
    ///
    /// Every job runs to a terminal state before this returns. The result is
    /// the first error in completion order; sibling jobs are not aborted by a
    /// failure, only by the deadline.
    pub async fn clone_until(
        &self,
        repos: &[Repository],
        deadline: Deadline,
    ) -> Result<BatchSummary> {
        if repos.is_empty() {
            return Ok(BatchSummary::default());
        }

        let total = repos.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let (tx, mut rx) = mpsc::channel::<JobReport>(total);

        for (i, repo) in repos.iter().enumerate() {
            let job = CloneJob::new(repo.clone(), self.layout.target_path(repo), i + 1, total);
            let worker = CloneWorker {
                executor: Arc::clone(&self.executor),
                git: self.git.clone(),
                semaphore: Arc::clone(&semaphore),
                deadline: deadline.clone(),
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                let report = worker.run(job).await;
                if tx.send(report).await.is_err() {
                    tracing::debug!("clone results channel closed");
                }
            });
        }
        drop(tx);

        let mut batch = BatchResult::new(total);
        while let Some(report) = rx.recv().await {
            match &report.error {
                Some(e) if e.is_cancelled() => tracing::warn!(repo = %report.name, "{e}"),
                Some(e) => tracing::error!(repo = %report.name, "{e}"),
                None => {}
            }
            batch.record(report);
        }

        if batch.unsuccessful() == 0 && batch.completed() == total {
            tracing::info!("All {total} repositories cloned successfully!");
        }
        batch.finish()
    }
}

/// Everything one job task needs, owned so the task is `'static`.
struct CloneWorker {
    executor: Arc<dyn CommandExecutor>,
    git: GitCloneSettings,
    semaphore: Arc<Semaphore>,
    deadline: Deadline,
}

impl CloneWorker {
    async fn run(self, mut job: CloneJob) -> JobReport {
        let outcome = self.clone_one(&mut job).await;
        JobReport::settle(job, outcome)
    }

    async fn clone_one(&self, job: &mut CloneJob) -> Result<()> {
        let name = job.repo.name.clone();
        let what = format!("clone of {name}");

        let _permit = tokio::select! {
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit
                .map_err(|_| RepoManError::Other("clone semaphore closed".to_string()))?,
            reason = self.deadline.fired() => return Err(RepoManError::cancelled(what, reason)),
        };
        if let Some(reason) = self.deadline.check() {
            return Err(RepoManError::cancelled(what, reason));
        }

        if let Some(parent) = job.target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RepoManError::Other(format!(
                    "failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        if job.target.exists() {
            tracing::info!(
                "{} {name} already exists at {}, skipping clone",
                job.progress(),
                job.target.display()
            );
            job.advance(JobState::Skipped);
            return Ok(());
        }

        let invocation = clone_invocation(&job.repo, &job.target, &self.git);

        // No await between this check and the spawn.
        if let Some(reason) = self.deadline.check() {
            return Err(RepoManError::cancelled(what, reason));
        }
        tracing::info!("{} Cloning {name}...", job.progress());
        tracing::debug!(command = %invocation.display(), "spawning");
        job.advance(JobState::Running);
        let mut handle = self.executor.spawn(&invocation)?;

        let outcome = match wait_or_kill(&mut handle, &self.deadline, &what).await {
            Ok(output) if output.success() => Ok(()),
            Ok(output) => Err(RepoManError::CommandFailed {
                context: format!("failed to clone {name}"),
                stderr: output.stderr.trim().to_string(),
            }),
            Err(e) => Err(e),
        };
        if outcome.is_err() {
            remove_partial_clone(&job.target).await;
        }
        outcome?;

        job.advance(JobState::Succeeded);
        Ok(())
    }
}

/// Remove whatever an unfinished `git clone` left at `target`, so the next run retries it.
/// The target did not exist before this job spawned git.
async fn remove_partial_clone(target: &Path) {
    if !target.exists() {
        return;
    }
    match tokio::fs::remove_dir_all(target).await {
        Ok(()) => tracing::debug!(path = %target.display(), "removed partial clone"),
        Err(e) => tracing::warn!(
            path = %target.display(),
            error = %e,
            "failed to remove partial clone; delete it before retrying"
        ),
    }
}
