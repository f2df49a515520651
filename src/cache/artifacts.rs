// Typed access to the three cached artifact kinds.
// Pairs each cache key with its file path and per-kind TTL.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::config::CacheConfig;
use crate::error::Result;

use super::paths::CachePaths;
use super::store;
use super::ttl::parse_ttl_or_default;

/// Whose repositories are listed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Account {
    /// The authenticated user (empty login on the command line).
    Current,
    Named(String),
}

impl Account {
    pub fn login(&self) -> Option<&str> {
        match self {
            Account::Current => None,
            Account::Named(login) => Some(login),
        }
    }
}

impl From<&str> for Account {
    fn from(login: &str) -> Self {
        if login.is_empty() {
            Account::Current
        } else {
            Account::Named(login.to_string())
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Account::Current => write!(f, "current user"),
            Account::Named(login) => write!(f, "user '{login}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Repositories,
    Readme,
    Username,
}

/// Identifies one cached artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey {
    Repositories(Account),
    Readme { owner: String, repo: String },
    Username,
}

impl CacheKey {
    pub fn readme(owner: &str, repo: &str) -> Self {
        CacheKey::Readme {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    pub fn kind(&self) -> CacheKind {
        match self {
            CacheKey::Repositories(_) => CacheKind::Repositories,
            CacheKey::Readme { .. } => CacheKind::Readme,
            CacheKey::Username => CacheKind::Username,
        }
    }
}

/// Freshness window per artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub repositories: Duration,
    pub readme: Duration,
    pub username: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            repositories: Duration::from_secs(24 * 60 * 60),
            readme: Duration::from_secs(24 * 60 * 60),
            username: Duration::from_secs(90 * 24 * 60 * 60),
        }
    }
}

impl CacheTtls {
    /// Parse configured TTL strings; invalid entries fall back to the 24h default.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            repositories: parse_ttl_or_default(&config.repos_ttl),
            readme: parse_ttl_or_default(&config.readme_ttl),
            username: parse_ttl_or_default(&config.username_ttl),
        }
    }

    pub fn for_kind(&self, kind: CacheKind) -> Duration {
        match kind {
            CacheKind::Repositories => self.repositories,
            CacheKind::Readme => self.readme,
            CacheKind::Username => self.username,
        }
    }
}

/// TTL cache over flat files.
///
/// Reads are trusted only while the file is younger than its kind's TTL; an
/// expired, missing, or corrupt file is a miss. Writes replace files atomically.
/// Callers treat save failures as warnings.
#[derive(Debug, Clone)]
pub struct Cache {
    paths: CachePaths,
    ttls: CacheTtls,
}

impl Cache {
    pub fn new(paths: CachePaths, ttls: CacheTtls) -> Self {
        Self { paths, ttls }
    }

    pub fn path(&self, key: &CacheKey) -> PathBuf {
        match key {
            CacheKey::Repositories(account) => self.paths.repositories_path(account),
            CacheKey::Readme { owner, repo } => self.paths.readme_path(owner, repo),
            CacheKey::Username => self.paths.username_path(),
        }
    }

    pub fn ttl(&self, key: &CacheKey) -> Duration {
        self.ttls.for_kind(key.kind())
    }

    pub fn is_fresh(&self, key: &CacheKey) -> bool {
        store::is_fresh(&self.path(key), self.ttl(key))
    }

    pub fn load_json<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<T> {
        store::read_json(&self.path(key))
    }

    pub fn save_json<T: Serialize + ?Sized>(&self, key: &CacheKey, data: &T) -> Result<()> {
        store::write_json(&self.path(key), data)
    }

    /// Load text. The username artifact is trimmed to a single line.
    pub fn load_text(&self, key: &CacheKey) -> Result<String> {
        let text = store::read_text(&self.path(key))?;
        Ok(match key.kind() {
            CacheKind::Username => text.trim().to_string(),
            _ => text,
        })
    }

    pub fn save_text(&self, key: &CacheKey, text: &str) -> Result<()> {
        let text = match key.kind() {
            CacheKind::Username => text.trim(),
            _ => text,
        };
        store::write_text(&self.path(key), text)
    }

    /// Fresh JSON payload, or `None` on any miss.
    pub fn fresh_json<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        if !self.is_fresh(key) {
            return None;
        }
        self.load_json(key)
            .inspect_err(|e| tracing::debug!(?key, error = %e, "ignoring unreadable cache entry"))
            .ok()
    }

    /// Fresh text payload, or `None` on any miss.
    pub fn fresh_text(&self, key: &CacheKey) -> Option<String> {
        if !self.is_fresh(key) {
            return None;
        }
        self.load_text(key)
            .inspect_err(|e| tracing::debug!(?key, error = %e, "ignoring unreadable cache entry"))
            .ok()
    }
}
