// GitHub repository types.
// Mirrors the JSON emitted by `gh repo list --json`, which is also the cache file format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Fields requested from `gh repo list --json`.
pub const LIST_FIELDS: &str = "name,description,url,stargazerCount,forkCount,watchers,issues,owner,createdAt,updatedAt,diskUsage,homepageUrl,isFork,isArchived,isPrivate,isTemplate,repositoryTopics,primaryLanguage";

/// GitHub user or organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// Connection count wrapper used by the GraphQL-shaped fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Count {
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
}

/// Snapshot of one remote repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Repository {
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub url: String,
    pub stargazer_count: u64,
    pub fork_count: u64,
    pub watchers: Count,
    pub issues: Count,
    pub owner: Owner,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Kilobytes.
    pub disk_usage: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub homepage_url: String,
    pub is_fork: bool,
    pub is_archived: bool,
    pub is_private: bool,
    pub is_template: bool,
    #[serde(rename = "repositoryTopics", deserialize_with = "null_as_default")]
    pub topics: Vec<Topic>,
    #[serde(deserialize_with = "null_as_default")]
    pub primary_language: Language,
}

impl Repository {
    /// Topic names as plain strings.
    pub fn topic_names(&self) -> Vec<&str> {
        self.topics.iter().map(|t| t.name.as_str()).collect()
    }

    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }

    /// Clone URL over SSH for github.com HTTPS URLs, otherwise the URL unchanged.
    pub fn ssh_url(&self) -> String {
        to_ssh_url(&self.url)
    }
}

/// Convert `https://github.com/owner/repo` to `git@github.com:owner/repo.git`.
pub fn to_ssh_url(url: &str) -> String {
    match url.strip_prefix("https://github.com/") {
        Some(path) if path.ends_with(".git") => format!("git@github.com:{path}"),
        Some(path) => format!("git@github.com:{path}.git"),
        None => url.to_string(),
    }
}

/// GitHub emits `null` for absent descriptions, topics, and languages.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
