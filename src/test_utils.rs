#![cfg(test)]

use chrono::{TimeZone, Utc};

use crate::github::{Owner, Repository};

pub fn make_repo(name: &str, owner: &str) -> Repository {
    let created = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
    Repository {
        name: name.to_string(),
        description: format!("{name} description"),
        url: format!("https://github.com/{owner}/{name}"),
        owner: Owner {
            login: owner.to_string(),
        },
        created_at: created,
        updated_at: created,
        ..Default::default()
    }
}

pub fn make_repos(names: &[&str], owner: &str) -> Vec<Repository> {
    names.iter().map(|name| make_repo(name, owner)).collect()
}
