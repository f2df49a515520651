// Plain-text repository card shown in fzf's preview pane.

use std::fmt::Write;

use crate::github::Repository;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the summary card for `repo`.
pub fn render_card(repo: &Repository) -> String {
    let mut out = String::new();
    let language = match repo.primary_language.name.as_str() {
        "" => "Unknown",
        name => name,
    };

    // Writing to a String cannot fail.
    let _ = writeln!(out, "# {}\n", repo.name);
    let _ = writeln!(out, "Language: {language}");
    if !repo.description.is_empty() {
        let _ = writeln!(out, "{}", repo.description);
    }
    let _ = writeln!(out, "Link: {}\n", repo.url);
    let _ = writeln!(
        out,
        "Stars: {}  Forks: {}  Watchers: {}  Issues: {}",
        repo.stargazer_count, repo.fork_count, repo.watchers.total_count, repo.issues.total_count
    );
    let _ = writeln!(out, "Owner: {}", repo.owner.login);
    let _ = writeln!(out, "Created At: {}", repo.created_at.format(DATE_FORMAT));
    let _ = writeln!(out, "Last Updated: {}", repo.updated_at.format(DATE_FORMAT));
    let _ = writeln!(out, "Disk Usage: {} KB", repo.disk_usage);

    if !repo.homepage_url.is_empty() {
        let _ = writeln!(out, "Homepage: {}", repo.homepage_url);
    }
    for (set, label) in [
        (repo.is_fork, "Forked"),
        (repo.is_archived, "Archived"),
        (repo.is_private, "Private"),
        (repo.is_template, "Template"),
    ] {
        if set {
            let _ = writeln!(out, "\n{label}");
        }
    }
    if !repo.topics.is_empty() {
        let _ = writeln!(out, "\nTopics: {}", repo.topic_names().join(", "));
    }

    out
}

/// README section appended below the card.
pub fn render_readme(content: &str) -> String {
    if content.trim().is_empty() {
        "\n---\nNo README found.\n".to_string()
    } else {
        format!("\n---\n{}\n", content.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{Count, Language, Topic};
    use crate::test_utils::make_repo;

    #[test]
    fn test_card_contents() {
        let mut repo = make_repo("hello-world", "octocat");
        repo.description = "GitHub Actions TUI".to_string();
        repo.stargazer_count = 42;
        repo.fork_count = 3;
        repo.watchers = Count { total_count: 7 };
        repo.issues = Count { total_count: 1 };
        repo.disk_usage = 2048;
        repo.primary_language = Language {
            name: "Rust".to_string(),
        };
        repo.is_fork = true;
        repo.topics = vec![
            Topic {
                name: "tui".to_string(),
            },
            Topic {
                name: "github".to_string(),
            },
        ];

        let card = render_card(&repo);

        assert!(card.starts_with("# hello-world\n"));
        assert!(card.contains("Language: Rust"));
        assert!(card.contains("GitHub Actions TUI"));
        assert!(card.contains("Link: https://github.com/octocat/hello-world"));
        assert!(card.contains("Stars: 42  Forks: 3  Watchers: 7  Issues: 1"));
        assert!(card.contains("Owner: octocat"));
        assert!(card.contains("Created At: 2022-01-01 00:00:00"));
        assert!(card.contains("Disk Usage: 2048 KB"));
        assert!(card.contains("Forked"));
        assert!(!card.contains("Archived"));
        assert!(!card.contains("Homepage"));
        assert!(card.contains("Topics: tui, github"));
    }

    #[test]
    fn test_unknown_language() {
        let card = render_card(&make_repo("bare", "me"));
        assert!(card.contains("Language: Unknown"));
        assert!(!card.contains("Topics"));
    }

    #[test]
    fn test_readme_section() {
        assert_eq!(render_readme(""), "\n---\nNo README found.\n");
        assert_eq!(render_readme("# Hello\n\n"), "\n---\n# Hello\n");
    }
}
