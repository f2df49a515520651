// Cache path utilities.
// Maps cache keys onto the flat on-disk layout under the cache root.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::Result;

use super::artifacts::Account;

/// Directory name used under the platform cache dir.
pub const APP_NAME: &str = "gh-repo-man";

const READMES_DIR: &str = "readmes";
const CURRENT_USER_REPOS: &str = "current_user_repos.json";
const CURRENT_USERNAME: &str = "current_username.txt";

/// Get the platform cache directory (~/.cache/gh-repo-man on Linux).
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Resolves cache file locations beneath one root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    root: PathBuf,
}

impl CachePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root and `readmes/` directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.readmes_dir())?;
        Ok(())
    }

    pub fn readmes_dir(&self) -> PathBuf {
        self.root.join(READMES_DIR)
    }

    /// Path to an account's repository listing.
    pub fn repositories_path(&self, account: &Account) -> PathBuf {
        match account {
            Account::Current => self.root.join(CURRENT_USER_REPOS),
            Account::Named(login) => self
                .root
                .join(format!("{}_repos.json", sanitize_name(login))),
        }
    }

    /// Path to a repository's cached README.
    pub fn readme_path(&self, owner: &str, repo: &str) -> PathBuf {
        self.readmes_dir().join(format!(
            "{}_{}.md",
            sanitize_name(owner),
            sanitize_name(repo)
        ))
    }

    /// Path to the resolved username of the authenticated user.
    pub fn username_path(&self) -> PathBuf {
        self.root.join(CURRENT_USERNAME)
    }
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
pub(crate) fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
