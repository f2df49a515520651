// Input validation for account names and repository full names.
// Rejects anything that could be unsafe to pass to an external program.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

pub const MAX_USERNAME_LENGTH: usize = 39;

const FORBIDDEN_CHARS: &[char] = &[
    ';', '|', '&', '$', '`', '(', ')', '{', '}', '[', ']', '<', '>', '"', '\'', '\\',
];

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9\-_]*[a-zA-Z0-9])?$").expect("valid username regex")
});

/// Validate a GitHub login. The empty string is valid and means the current user.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Ok(());
    }

    if username.contains(FORBIDDEN_CHARS) {
        return Err(ValidationError::InvalidCharacters);
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong {
            max: MAX_USERNAME_LENGTH,
        });
    }

    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::InvalidFormat);
    }

    Ok(())
}

/// Split `owner/name` into its two non-empty parts.
pub fn parse_full_name(full_name: &str) -> Result<(&str, &str), ValidationError> {
    match full_name.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => Ok((*owner, *repo)),
        _ => Err(ValidationError::InvalidRepoName(full_name.to_string())),
    }
}
