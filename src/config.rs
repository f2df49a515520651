// Configuration loading.
// Layers defaults, the YAML config file, and GH_REPO_MAN_* environment variables.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::cache::parse_ttl;
use crate::error::{RepoManError, Result};
use crate::listing::{RepoType, SortKey};

pub const CONFIG_FILE_NAME: &str = "gh-repo-man.yml";
pub const ENV_PREFIX: &str = "GH_REPO_MAN_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub repos: ReposConfig,
    pub cache: CacheConfig,
    pub ui: UiConfig,
    pub performance: PerformanceConfig,
    pub integrations: IntegrationsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReposConfig {
    pub projects_dir: String,
    /// Clone into `<projects_dir>/<owner>/<repo>` instead of `<projects_dir>/<repo>`.
    pub per_user_dir: bool,
    pub sort_by: Option<SortKey>,
    pub repo_type: Option<RepoType>,
    pub language: Option<String>,
}

impl Default for ReposConfig {
    fn default() -> Self {
        Self {
            projects_dir: "~/Projects".to_string(),
            per_user_dir: true,
            sort_by: None,
            repo_type: None,
            language: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: Option<String>,
    pub repos_ttl: String,
    pub readme_ttl: String,
    pub username_ttl: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            repos_ttl: "24h".to_string(),
            readme_ttl: "24h".to_string(),
            username_ttl: "90d".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_readme_in_preview: bool,
    /// Pass `--ansi` to fzf.
    pub color_output: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_readme_in_preview: false,
            color_output: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// 0 means the built-in default.
    pub max_concurrent_clones: usize,
    /// Per-repository share of the batch deadline.
    pub clone_timeout_minutes: u64,
    pub listing_timeout_secs: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_clones: 3,
            clone_timeout_minutes: 10,
            listing_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    pub git: GitConfig,
    pub post_clone: CommandConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// 0 means a full clone.
    pub clone_depth: u32,
    pub clone_args: Vec<String>,
}

/// External command run once per cloned repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    pub enabled: bool,
    pub command: String,
    pub args: Vec<String>,
}

impl Config {
    /// Load configuration, falling back to defaults (with a warning) if the file is invalid.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).or_else(default_config_path);

        match Self::try_load(path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "invalid configuration, using defaults");
                Config::default()
            }
        }
    }

    /// Load and validate configuration, surfacing any error.
    pub fn try_load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = path.filter(|p| p.exists()) {
            figment = figment.merge(Yaml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| RepoManError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("cache.repos_ttl", &self.cache.repos_ttl),
            ("cache.readme_ttl", &self.cache.readme_ttl),
            ("cache.username_ttl", &self.cache.username_ttl),
        ] {
            parse_ttl(value).map_err(|e| RepoManError::Config(format!("invalid {field}: {e}")))?;
        }

        if self.repos.projects_dir.trim().is_empty() {
            return Err(RepoManError::Config(
                "invalid repos.projects_dir: must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolved projects directory with `~/` expanded.
    pub fn projects_dir(&self) -> Result<PathBuf> {
        expand_home(&self.repos.projects_dir)
    }

    /// Resolved cache directory: the configured override or the platform default.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache.dir {
            Some(dir) => expand_home(dir),
            None => crate::cache::paths::default_cache_dir().ok_or_else(|| {
                RepoManError::Config("could not determine cache directory".to_string())
            }),
        }
    }
}

/// `~/.config/gh-repo-man.yml` (platform config dir).
pub fn default_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Expand a leading `~/` (or a bare `~`) to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix("~/") {
        Some(rest) => rest,
        None if path == "~" => "",
        None => return Ok(PathBuf::from(path)),
    };

    let home = BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| RepoManError::Config("failed to get user home directory".to_string()))?;
    Ok(home.join(rest))
}
