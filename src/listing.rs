// Repository listing operations.
// Filtering by type and language, sorting, and ordered selection by name.

use std::cmp::Reverse;
use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::github::Repository;

/// Repository flag to filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    Archived,
    Forked,
    Private,
    Template,
}

impl RepoType {
    pub fn matches(&self, repo: &Repository) -> bool {
        match self {
            RepoType::Archived => repo.is_archived,
            RepoType::Forked => repo.is_fork,
            RepoType::Private => repo.is_private,
            RepoType::Template => repo.is_template,
        }
    }
}

/// Listing order. Counts and dates sort descending, names ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Created,
    Forks,
    Issues,
    Language,
    Name,
    Pushed,
    Size,
    Stars,
    Updated,
}

/// Keep repositories matching `repo_type` and `language` (ASCII case-insensitive).
pub fn filter_repositories(
    repos: Vec<Repository>,
    repo_type: Option<RepoType>,
    language: Option<&str>,
) -> Vec<Repository> {
    let language = language.filter(|l| !l.is_empty());
    if repo_type.is_none() && language.is_none() {
        return repos;
    }

    repos
        .into_iter()
        .filter(|repo| repo_type.is_none_or(|t| t.matches(repo)))
        .filter(|repo| {
            language.is_none_or(|l| repo.primary_language.name.eq_ignore_ascii_case(l))
        })
        .collect()
}

/// Stable sort in place.
pub fn sort_repositories(repos: &mut [Repository], key: SortKey) {
    match key {
        SortKey::Created => repos.sort_by_key(|r| Reverse(r.created_at)),
        SortKey::Forks => repos.sort_by_key(|r| Reverse(r.fork_count)),
        SortKey::Issues => repos.sort_by_key(|r| Reverse(r.issues.total_count)),
        SortKey::Language => {
            repos.sort_by_cached_key(|r| r.primary_language.name.to_lowercase())
        }
        SortKey::Name => repos.sort_by_cached_key(|r| r.name.to_lowercase()),
        SortKey::Pushed | SortKey::Updated => repos.sort_by_key(|r| Reverse(r.updated_at)),
        SortKey::Size => repos.sort_by_key(|r| Reverse(r.disk_usage)),
        SortKey::Stars => repos.sort_by_key(|r| Reverse(r.stargazer_count)),
    }
}

/// Name → repository lookup. Never iterate it for output order.
pub fn build_repo_map(repos: &[Repository]) -> HashMap<&str, &Repository> {
    repos.iter().map(|r| (r.name.as_str(), r)).collect()
}

/// Repositories for `names`, in the order given. Blank and unknown names are skipped.
pub fn select_by_names<S: AsRef<str>>(
    map: &HashMap<&str, &Repository>,
    names: &[S],
) -> Vec<Repository> {
    names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !name.is_empty())
        .filter_map(|name| map.get(name).map(|repo| (*repo).clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::github::Language;
    use crate::test_utils::make_repo;

    fn sample() -> Vec<Repository> {
        let mut a = make_repo("alpha", "me");
        a.stargazer_count = 5;
        a.fork_count = 1;
        a.disk_usage = 300;
        a.is_fork = true;
        a.primary_language = Language {
            name: "Rust".to_string(),
        };
        a.updated_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let mut b = make_repo("Bravo", "me");
        b.stargazer_count = 50;
        b.fork_count = 7;
        b.disk_usage = 100;
        b.is_archived = true;
        b.primary_language = Language {
            name: "go".to_string(),
        };
        b.updated_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let mut c = make_repo("charlie", "me");
        c.stargazer_count = 20;
        c.is_private = true;
        c.is_template = true;
        c.primary_language = Language {
            name: "rust".to_string(),
        };
        c.updated_at = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();

        vec![a, b, c]
    }

    fn names(repos: &[Repository]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_filter_by_type() {
        assert_eq!(
            names(&filter_repositories(sample(), Some(RepoType::Forked), None)),
            vec!["alpha"]
        );
        assert_eq!(
            names(&filter_repositories(sample(), Some(RepoType::Archived), None)),
            vec!["Bravo"]
        );
        assert_eq!(
            names(&filter_repositories(sample(), Some(RepoType::Template), None)),
            vec!["charlie"]
        );
    }

    #[test]
    fn test_filter_by_language_ignores_case() {
        assert_eq!(
            names(&filter_repositories(sample(), None, Some("RUST"))),
            vec!["alpha", "charlie"]
        );
        assert_eq!(
            names(&filter_repositories(sample(), Some(RepoType::Private), Some("rust"))),
            vec!["charlie"]
        );
    }

    #[test]
    fn test_no_filters_is_identity() {
        assert_eq!(filter_repositories(sample(), None, Some("")), sample());
    }

    #[test]
    fn test_sort_keys() {
        let mut repos = sample();

        sort_repositories(&mut repos, SortKey::Stars);
        assert_eq!(names(&repos), vec!["Bravo", "charlie", "alpha"]);

        sort_repositories(&mut repos, SortKey::Name);
        assert_eq!(names(&repos), vec!["alpha", "Bravo", "charlie"]);

        sort_repositories(&mut repos, SortKey::Size);
        assert_eq!(names(&repos), vec!["alpha", "Bravo", "charlie"]);

        sort_repositories(&mut repos, SortKey::Updated);
        assert_eq!(names(&repos), vec!["Bravo", "alpha", "charlie"]);

        sort_repositories(&mut repos, SortKey::Language);
        assert_eq!(names(&repos), vec!["Bravo", "alpha", "charlie"]);
    }

    #[test]
    fn test_select_preserves_request_order() {
        let repos = sample();
        let map = build_repo_map(&repos);

        let selected = select_by_names(&map, &["charlie", "", "missing", "alpha"]);

        assert_eq!(names(&selected), vec!["charlie", "alpha"]);
    }

    #[test]
    fn test_sort_key_parses_from_cli() {
        assert_eq!(SortKey::from_str("stars", true), Ok(SortKey::Stars));
        assert_eq!(RepoType::from_str("FORKED", true), Ok(RepoType::Forked));
        assert!(SortKey::from_str("popularity", true).is_err());
    }
}
