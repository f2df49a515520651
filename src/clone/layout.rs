// Clone destinations and git command construction.
// Maps a repository to its target directory and builds the `git clone` invocation.

use std::path::{Path, PathBuf};

use crate::cache::paths::sanitize_name;
use crate::config::{Config, GitConfig};
use crate::error::Result;
use crate::exec::Invocation;
use crate::github::Repository;

/// Where cloned repositories land on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    per_owner: bool,
}

impl ProjectLayout {
    /// `<root>/<repo>`.
    pub fn flat(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            per_owner: false,
        }
    }

    /// `<root>/<owner>/<repo>`.
    pub fn per_owner(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            per_owner: true,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let root = config.projects_dir()?;
        Ok(if config.repos.per_user_dir {
            Self::per_owner(root)
        } else {
            Self::flat(root)
        })
    }

    /// Directory that holds the clone of `repo`.
    pub fn dir_for(&self, repo: &Repository) -> PathBuf {
        if self.per_owner && !repo.owner.login.is_empty() {
            self.root.join(sanitize_name(&repo.owner.login))
        } else {
            self.root.clone()
        }
    }

    pub fn target_path(&self, repo: &Repository) -> PathBuf {
        self.dir_for(repo).join(sanitize_name(&repo.name))
    }
}

/// Extra `git clone` options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitCloneSettings {
    /// Shallow clone depth. 0 clones full history.
    pub depth: u32,
    pub extra_args: Vec<String>,
}

impl From<&GitConfig> for GitCloneSettings {
    fn from(config: &GitConfig) -> Self {
        Self {
            depth: config.clone_depth,
            extra_args: config.clone_args.clone(),
        }
    }
}

/// `git clone [--depth N] [extra args] <ssh-url> <target>`
pub fn clone_invocation(repo: &Repository, target: &Path, git: &GitCloneSettings) -> Invocation {
    let mut invocation = Invocation::new("git").arg("clone");
    if git.depth > 0 {
        invocation = invocation.arg("--depth").arg(git.depth.to_string());
    }
    invocation
        .args(git.extra_args.iter().cloned())
        .arg(repo.ssh_url())
        .arg(target.to_string_lossy())
}
