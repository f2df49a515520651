// Clone job lifecycle and batch bookkeeping.

use std::fmt;
use std::path::PathBuf;

use crate::error::{RepoManError, Result};
use crate::github::Repository;

/// Lifecycle of one clone job. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    /// Target directory already existed; nothing was spawned.
    Skipped,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Skipped | JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }

    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Pending, Skipped | Running | Failed | Cancelled)
                | (Running, Succeeded | Failed | Cancelled)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Skipped => "skipped",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// One repository to clone, with its resolved destination.
#[derive(Debug, Clone)]
pub struct CloneJob {
    pub repo: Repository,
    pub target: PathBuf,
    /// 1-based position in the batch.
    pub position: usize,
    pub total: usize,
    state: JobState,
}

impl CloneJob {
    pub fn new(repo: Repository, target: PathBuf, position: usize, total: usize) -> Self {
        Self {
            repo,
            target,
            position,
            total,
            state: JobState::Pending,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Move to `next`. Backward or repeated transitions are ignored.
    pub fn advance(&mut self, next: JobState) {
        if self.state.can_transition_to(next) {
            self.state = next;
        } else {
            tracing::debug!(repo = %self.repo.name, from = %self.state, to = %next, "ignoring invalid job transition");
        }
    }

    /// `[i/n]` progress prefix.
    pub fn progress(&self) -> String {
        format!("[{}/{}]", self.position, self.total)
    }
}

/// Final outcome of one job, sent back to the orchestrator.
#[derive(Debug)]
pub struct JobReport {
    pub name: String,
    pub state: JobState,
    pub error: Option<RepoManError>,
}

impl JobReport {
    /// Settle `job` into a terminal state from the outcome of its work.
    pub fn settle(mut job: CloneJob, outcome: Result<()>) -> Self {
        let error = match outcome {
            Ok(()) => None,
            Err(e) => {
                job.advance(if e.is_cancelled() {
                    JobState::Cancelled
                } else {
                    JobState::Failed
                });
                Some(e)
            }
        };
        debug_assert!(job.state.is_terminal(), "job settled as {}", job.state);
        Self {
            name: job.repo.name,
            state: job.state,
            error,
        }
    }
}

/// Counts of a successful batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub cloned: usize,
    pub skipped: usize,
}

/// Aggregates job reports for one batch. Keeps the first error by completion order.
#[derive(Debug)]
pub struct BatchResult {
    expected: usize,
    completed: usize,
    cloned: usize,
    skipped: usize,
    failed: usize,
    cancelled: usize,
    first_error: Option<RepoManError>,
}

impl BatchResult {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            completed: 0,
            cloned: 0,
            skipped: 0,
            failed: 0,
            cancelled: 0,
            first_error: None,
        }
    }

    pub fn record(&mut self, report: JobReport) {
        self.completed += 1;
        match report.state {
            JobState::Succeeded => self.cloned += 1,
            JobState::Skipped => self.skipped += 1,
            JobState::Cancelled => self.cancelled += 1,
            _ => self.failed += 1,
        }
        if let Some(error) = report.error {
            if self.first_error.is_none() {
                self.first_error = Some(error);
            } else {
                tracing::debug!(repo = %report.name, error = %error, "additional clone failure");
            }
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Jobs that did not clone or skip.
    pub fn unsuccessful(&self) -> usize {
        self.failed + self.cancelled
    }

    /// The first error, or a summary when every job succeeded or skipped.
    pub fn finish(self) -> Result<BatchSummary> {
        if let Some(error) = self.first_error {
            return Err(error);
        }
        if self.completed < self.expected {
            return Err(RepoManError::Other(format!(
                "{} of {} clone jobs exited without reporting",
                self.expected - self.completed,
                self.expected
            )));
        }
        Ok(BatchSummary {
            cloned: self.cloned,
            skipped: self.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CancelReason;
    use crate::test_utils::make_repo;

    fn job(name: &str) -> CloneJob {
        CloneJob::new(make_repo(name, "me"), PathBuf::from(name), 1, 1)
    }

    #[test]
    fn test_transitions_only_move_forward() {
        let mut job = job("a");
        assert_eq!(job.state(), JobState::Pending);

        job.advance(JobState::Running);
        job.advance(JobState::Pending);
        assert_eq!(job.state(), JobState::Running);

        job.advance(JobState::Succeeded);
        job.advance(JobState::Failed);
        assert_eq!(job.state(), JobState::Succeeded);
        assert!(job.state().is_terminal());
    }

    #[test]
    fn test_skipped_is_terminal() {
        assert!(JobState::Pending.can_transition_to(JobState::Skipped));
        assert!(!JobState::Skipped.can_transition_to(JobState::Running));
        assert!(!JobState::Running.can_transition_to(JobState::Skipped));
    }

    #[test]
    fn test_progress_prefix() {
        let job = CloneJob::new(make_repo("a", "me"), PathBuf::from("a"), 2, 5);
        assert_eq!(job.progress(), "[2/5]");
    }

    #[test]
    fn test_settle_maps_errors_to_states() {
        let cancelled = JobReport::settle(
            job("a"),
            Err(RepoManError::cancelled("clone of a", CancelReason::Aborted)),
        );
        assert_eq!(cancelled.state, JobState::Cancelled);

        let mut running = job("b");
        running.advance(JobState::Running);
        let failed = JobReport::settle(running, Err(RepoManError::Other("boom".to_string())));
        assert_eq!(failed.state, JobState::Failed);
    }

    #[test]
    fn test_batch_keeps_first_error() {
        let mut batch = BatchResult::new(3);
        let mut ok = job("ok");
        ok.advance(JobState::Running);
        ok.advance(JobState::Succeeded);

        batch.record(JobReport::settle(ok, Ok(())));
        batch.record(JobReport::settle(job("x"), Err(RepoManError::Other("first".to_string()))));
        batch.record(JobReport::settle(job("y"), Err(RepoManError::Other("second".to_string()))));

        assert_eq!(batch.completed(), 3);
        assert_eq!(batch.unsuccessful(), 2);
        assert_eq!(batch.finish().unwrap_err().to_string(), "first");
    }

    #[test]
    fn test_batch_missing_reports_is_error() {
        let mut batch = BatchResult::new(2);
        let mut skipped = job("s");
        skipped.advance(JobState::Skipped);
        batch.record(JobReport::settle(skipped, Ok(())));

        let err = batch.finish().unwrap_err();
        assert!(err.to_string().contains("without reporting"));
    }

    #[test]
    fn test_batch_summary() {
        let mut batch = BatchResult::new(2);
        let mut skipped = job("s");
        skipped.advance(JobState::Skipped);
        let mut cloned = job("c");
        cloned.advance(JobState::Running);
        cloned.advance(JobState::Succeeded);

        batch.record(JobReport::settle(skipped, Ok(())));
        batch.record(JobReport::settle(cloned, Ok(())));

        assert_eq!(
            batch.finish().unwrap(),
            BatchSummary {
                cloned: 1,
                skipped: 1
            }
        );
    }
}
