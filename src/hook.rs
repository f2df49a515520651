// Post-clone hook runner.
// Runs a configured command once per repository, in order, with the terminal attached.

use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use crate::clone::ProjectLayout;
use crate::config::CommandConfig;
use crate::error::{RepoManError, Result};
use crate::exec::{CommandExecutor, Invocation};
use crate::github::Repository;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("env var pattern")
});

/// Replace `$VAR` and `${VAR}` using `lookup`. Unknown variables expand to "".
pub fn expand_vars<F>(input: &str, lookup: F) -> Cow<'_, str>
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VAR.replace_all(input, |caps: &Captures| {
        let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        lookup(name).unwrap_or_default()
    })
}

/// Expand variables from the process environment.
pub fn expand_env(input: &str) -> Cow<'_, str> {
    expand_vars(input, |name| std::env::var(name).ok())
}

/// Outcome counts for one hook pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookSummary {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct HookRunner {
    executor: Arc<dyn CommandExecutor>,
}

impl HookRunner {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    /// Run `hook` for each repository's clone directory.
    ///
    /// A missing command is an error before anything runs. Individual hook
    /// failures are logged and do not stop the remaining repositories.
    pub async fn run(
        &self,
        repos: &[Repository],
        layout: &ProjectLayout,
        hook: &CommandConfig,
    ) -> Result<HookSummary> {
        let command = expand_env(hook.command.trim());
        if !hook.enabled || command.is_empty() || repos.is_empty() {
            return Ok(HookSummary::default());
        }

        if !self.executor.is_available(&command) {
            return Err(RepoManError::CommandUnavailable(command.into_owned()));
        }

        tracing::info!("Running post-clone command: {command}");
        let mut summary = HookSummary::default();
        for repo in repos {
            let target = layout.target_path(repo);
            let invocation = Invocation::new(&*command)
                .args(hook.args.iter().cloned())
                .arg(target.to_string_lossy())
                .interactive();

            match self.run_one(&invocation).await {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    tracing::warn!(repo = %repo.name, "post-clone command failed: {e}");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn run_one(&self, invocation: &Invocation) -> Result<()> {
        tracing::debug!(command = %invocation.display(), "running hook");
        let mut handle = self.executor.spawn(invocation)?;
        let output = handle.wait().await?;
        match output.exit_code {
            Some(0) => Ok(()),
            code => Err(RepoManError::CommandFailed {
                context: match code {
                    Some(code) => format!("exit status {code}"),
                    None => "terminated by signal".to_string(),
                },
                stderr: output.stderr.trim().to_string(),
            }),
        }
    }
}
