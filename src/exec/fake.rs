// In-memory executor for tests.
// Scripts responses per invocation and records spawns, kills, and peak concurrency.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{RepoManError, Result};

use super::{CommandExecutor, Invocation, ProcessHandle, ProcessOutput};

/// Scripted outcome of a fake process.
#[derive(Debug, Clone, Default)]
pub struct FakeResponse {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub delay: Duration,
    /// Refuse to start, as if the binary were missing.
    pub spawn_error: bool,
}

impl FakeResponse {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    pub fn fail(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stderr: stderr.into(),
            ..Default::default()
        }
    }

    pub fn spawn_error() -> Self {
        Self {
            spawn_error: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Matcher = Box<dyn Fn(&Invocation) -> bool + Send + Sync>;

struct Rule {
    matcher: Matcher,
    response: FakeResponse,
}

#[derive(Default)]
struct FakeState {
    rules: Vec<Rule>,
    invocations: Vec<Invocation>,
    running: usize,
    max_running: usize,
    kills: usize,
    unavailable: HashSet<String>,
}

/// Executor that never touches the host. Unmatched invocations succeed with empty output.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    state: Arc<Mutex<FakeState>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `response` to invocations matching `matcher`. First matching rule wins.
    pub fn on<F>(&self, matcher: F, response: FakeResponse)
    where
        F: Fn(&Invocation) -> bool + Send + Sync + 'static,
    {
        self.state.lock().rules.push(Rule {
            matcher: Box::new(matcher),
            response,
        });
    }

    pub fn on_program(&self, program: &str, response: FakeResponse) {
        let program = program.to_string();
        self.on(move |inv| inv.program == program, response);
    }

    /// Match invocations having an argument that contains `needle`.
    pub fn on_arg(&self, needle: &str, response: FakeResponse) {
        let needle = needle.to_string();
        self.on(
            move |inv| inv.args.iter().any(|a| a.contains(&needle)),
            response,
        );
    }

    pub fn set_unavailable(&self, program: &str) {
        self.state.lock().unavailable.insert(program.to_string());
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.lock().invocations.clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.state.lock().invocations.len()
    }

    pub fn count_program(&self, program: &str) -> usize {
        self.state
            .lock()
            .invocations
            .iter()
            .filter(|inv| inv.program == program)
            .count()
    }

    pub fn kill_count(&self) -> usize {
        self.state.lock().kills
    }

    pub fn running(&self) -> usize {
        self.state.lock().running
    }

    /// Highest number of simultaneously running fake processes observed.
    pub fn max_running(&self) -> usize {
        self.state.lock().max_running
    }
}

impl CommandExecutor for FakeExecutor {
    fn spawn(&self, invocation: &Invocation) -> Result<Box<dyn ProcessHandle>> {
        let mut state = self.state.lock();
        let response = state
            .rules
            .iter()
            .find(|rule| (rule.matcher)(invocation))
            .map(|rule| rule.response.clone())
            .unwrap_or_default();

        if response.spawn_error {
            return Err(RepoManError::Spawn {
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "fake spawn failure"),
            });
        }

        state.invocations.push(invocation.clone());
        state.running += 1;
        state.max_running = state.max_running.max(state.running);

        Ok(Box::new(FakeProcess {
            response,
            state: Arc::clone(&self.state),
            running: true,
        }))
    }

    fn is_available(&self, program: &str) -> bool {
        !self.state.lock().unavailable.contains(program)
    }
}

struct FakeProcess {
    response: FakeResponse,
    state: Arc<Mutex<FakeState>>,
    running: bool,
}

impl FakeProcess {
    fn finish(&mut self) {
        if self.running {
            self.running = false;
            self.state.lock().running -= 1;
        }
    }
}

#[async_trait]
impl ProcessHandle for FakeProcess {
    async fn wait(&mut self) -> Result<ProcessOutput> {
        if !self.response.delay.is_zero() {
            tokio::time::sleep(self.response.delay).await;
        }
        self.finish();
        Ok(ProcessOutput {
            exit_code: Some(self.response.exit_code),
            stdout: self.response.stdout.clone(),
            stderr: self.response.stderr.clone(),
        })
    }

    async fn kill(&mut self) -> Result<()> {
        if self.running {
            self.state.lock().kills += 1;
        }
        self.finish();
        Ok(())
    }
}

impl Drop for FakeProcess {
    fn drop(&mut self) {
        self.finish();
    }
}
