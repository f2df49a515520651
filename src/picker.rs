// Interactive repository selection through fzf.

use crate::error::{RepoManError, Result};
use crate::exec::{CommandExecutor, Deadline, Invocation, run_until};

const FZF: &str = "fzf";

/// fzf exit codes meaning "nothing chosen".
const CANCEL_EXIT_CODES: [i32; 2] = [1, 130];

/// How this binary is invoked from fzf's preview pane.
pub fn command_invocation(executor: &dyn CommandExecutor) -> String {
    if executor.is_available("gh-repo-man") {
        "gh-repo-man".to_string()
    } else {
        "gh repo-man".to_string()
    }
}

/// `<invocation> preview {} [--user U]`
pub fn preview_command(invocation: &str, user: &str) -> String {
    if user.is_empty() {
        format!("{invocation} preview {{}}")
    } else {
        format!("{invocation} preview {{}} --user {user}")
    }
}

#[derive(Debug, Clone, Default)]
pub struct PickerOptions {
    pub preview_command: String,
    /// Pass `--ansi`.
    pub color: bool,
    pub header: Option<String>,
}

pub fn fzf_invocation(names: &[String], options: &PickerOptions) -> Invocation {
    let mut invocation = Invocation::new(FZF)
        .arg("--multi")
        .arg("--preview")
        .arg(options.preview_command.as_str());
    if options.color {
        invocation = invocation.arg("--ansi");
    }
    if let Some(header) = &options.header {
        invocation = invocation.arg("--header").arg(header.as_str());
    }
    invocation.stdin(names.join("\n"))
}

/// Non-empty lines of fzf's output, in the order fzf printed them.
pub fn parse_selection(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Let the user pick any number of `names`.
///
/// Returns [`RepoManError::SelectionCancelled`] when fzf is dismissed.
pub async fn select(
    executor: &dyn CommandExecutor,
    names: &[String],
    options: &PickerOptions,
) -> Result<Vec<String>> {
    if !executor.is_available(FZF) {
        return Err(RepoManError::CommandUnavailable(FZF.to_string()));
    }

    let invocation = fzf_invocation(names, options);
    let output = run_until(executor, &invocation, &Deadline::never(), "selection").await?;

    match output.exit_code {
        Some(0) => Ok(parse_selection(&output.stdout)),
        Some(code) if CANCEL_EXIT_CODES.contains(&code) => Err(RepoManError::SelectionCancelled),
        _ => Err(RepoManError::CommandFailed {
            context: "error running fzf".to_string(),
            stderr: output.stderr.trim().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::fake::{FakeExecutor, FakeResponse};

    fn names() -> Vec<String> {
        vec!["alpha".to_string(), "beta".to_string()]
    }

    #[test]
    fn test_preview_command() {
        assert_eq!(preview_command("gh-repo-man", ""), "gh-repo-man preview {}");
        assert_eq!(
            preview_command("gh repo-man", "octocat"),
            "gh repo-man preview {} --user octocat"
        );
    }

    #[test]
    fn test_command_invocation_falls_back_to_gh_extension() {
        let fake = FakeExecutor::new();
        assert_eq!(command_invocation(&fake), "gh-repo-man");

        fake.set_unavailable("gh-repo-man");
        assert_eq!(command_invocation(&fake), "gh repo-man");
    }

    #[test]
    fn test_fzf_invocation() {
        let options = PickerOptions {
            preview_command: "gh-repo-man preview {}".to_string(),
            color: true,
            header: Some("octocat".to_string()),
        };

        let inv = fzf_invocation(&names(), &options);

        assert_eq!(
            inv.args,
            vec![
                "--multi",
                "--preview",
                "gh-repo-man preview {}",
                "--ansi",
                "--header",
                "octocat"
            ]
        );
        assert_eq!(inv.stdin.as_deref(), Some("alpha\nbeta"));
    }

    #[test]
    fn test_parse_selection_keeps_order() {
        assert_eq!(parse_selection("beta\n\nalpha\n"), vec!["beta", "alpha"]);
        assert!(parse_selection("").is_empty());
    }

    #[tokio::test]
    async fn test_select_returns_chosen_names() {
        let fake = FakeExecutor::new();
        fake.on_program("fzf", FakeResponse::ok("beta\nalpha\n"));

        let chosen = select(&fake, &names(), &PickerOptions::default()).await.unwrap();

        assert_eq!(chosen, vec!["beta", "alpha"]);
    }

    #[tokio::test]
    async fn test_dismissed_picker_is_cancelled_selection() {
        for code in CANCEL_EXIT_CODES {
            let fake = FakeExecutor::new();
            fake.on_program("fzf", FakeResponse::fail(code, ""));

            let err = select(&fake, &names(), &PickerOptions::default())
                .await
                .unwrap_err();

            assert!(matches!(err, RepoManError::SelectionCancelled));
        }
    }

    #[tokio::test]
    async fn test_missing_fzf() {
        let fake = FakeExecutor::new();
        fake.set_unavailable("fzf");

        let err = select(&fake, &names(), &PickerOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "command fzf is not available in PATH");
        assert_eq!(fake.spawn_count(), 0);
    }
}
