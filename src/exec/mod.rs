// Command execution seam.
// Every external program (gh, git, fzf, post-clone hooks) is started through `CommandExecutor`.

pub mod deadline;
#[cfg(test)]
pub mod fake;
pub mod process;

use async_trait::async_trait;

use crate::error::{RepoManError, Result};

pub use deadline::Deadline;
pub use process::SystemExecutor;

/// A single external program invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Text written to the child's stdin, which is then closed.
    pub stdin: Option<String>,
    /// Inherit the terminal instead of capturing output.
    pub interactive: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Whether any argument equals `value`.
    pub fn has_arg(&self, value: &str) -> bool {
        self.args.iter().any(|a| a == value)
    }

    /// Shell-like rendering for log lines.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Starts external programs.
///
/// Production code uses [`SystemExecutor`]; tests substitute an in-memory fake.
pub trait CommandExecutor: Send + Sync {
    /// Start the program. The returned handle owns the running process.
    fn spawn(&self, invocation: &Invocation) -> Result<Box<dyn ProcessHandle>>;

    /// Whether `program` can be found in the execution environment.
    fn is_available(&self, program: &str) -> bool;
}

/// A started process.
#[async_trait]
pub trait ProcessHandle: Send {
    /// Wait for exit and collect captured output. Cancel-safe.
    async fn wait(&mut self) -> Result<ProcessOutput>;

    /// Forcibly terminate the process.
    async fn kill(&mut self) -> Result<()>;
}

/// Wait for `handle` unless `deadline` fires first, in which case the process is killed.
pub async fn wait_or_kill(
    handle: &mut Box<dyn ProcessHandle>,
    deadline: &Deadline,
    what: &str,
) -> Result<ProcessOutput> {
    tokio::select! {
        output = handle.wait() => output,
        reason = deadline.fired() => {
            if let Err(e) = handle.kill().await {
                tracing::warn!(error = %e, "failed to kill {what}");
            }
            Err(RepoManError::cancelled(what, reason))
        }
    }
}

/// Spawn `invocation` and wait for it under `deadline`.
pub async fn run_until(
    executor: &dyn CommandExecutor,
    invocation: &Invocation,
    deadline: &Deadline,
    what: &str,
) -> Result<ProcessOutput> {
    if let Some(reason) = deadline.check() {
        return Err(RepoManError::cancelled(what, reason));
    }
    tracing::debug!(command = %invocation.display(), "spawning");
    let mut handle = executor.spawn(invocation)?;
    wait_or_kill(&mut handle, deadline, what).await
}
