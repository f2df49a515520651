// Real process adapter backed by tokio::process.
// Captures stdout/stderr on background tasks so a running child can still be killed.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::error::{RepoManError, Result};

use super::{CommandExecutor, Invocation, ProcessHandle, ProcessOutput};

/// Spawns programs on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn spawn(&self, invocation: &Invocation) -> Result<Box<dyn ProcessHandle>> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).kill_on_drop(true);

        if invocation.interactive {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        } else {
            let stdin = if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            };
            cmd.stdin(stdin).stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let mut child = cmd.spawn().map_err(|source| RepoManError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        if let (Some(input), Some(mut pipe)) = (invocation.stdin.clone(), child.stdin.take()) {
            tokio::spawn(async move {
                if let Err(e) = pipe.write_all(input.as_bytes()).await {
                    tracing::debug!(error = %e, "stdin write failed");
                }
                // pipe dropped here, closing the child's stdin
            });
        }

        let stdout = child.stdout.take().map(|pipe| tokio::spawn(read_all(pipe)));
        let stderr = child.stderr.take().map(|pipe| tokio::spawn(read_all(pipe)));

        Ok(Box::new(SystemProcess {
            child,
            stdout,
            stderr,
        }))
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

struct SystemProcess {
    child: Child,
    stdout: Option<JoinHandle<String>>,
    stderr: Option<JoinHandle<String>>,
}

#[async_trait]
impl ProcessHandle for SystemProcess {
    async fn wait(&mut self) -> Result<ProcessOutput> {
        let status = self.child.wait().await?;
        let stdout = collect(self.stdout.take()).await;
        let stderr = collect(self.stderr.take()).await;

        Ok(ProcessOutput {
            exit_code: status.code(),
            stdout,
            stderr,
        })
    }

    async fn kill(&mut self) -> Result<()> {
        self.child.kill().await?;
        Ok(())
    }
}

async fn read_all<R: AsyncRead + Unpin>(mut pipe: R) -> String {
    let mut buf = Vec::new();
    if let Err(e) = pipe.read_to_end(&mut buf).await {
        tracing::debug!(error = %e, "pipe read failed");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn collect(reader: Option<JoinHandle<String>>) -> String {
    match reader {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    }
}
