// TTL parsing for cache freshness.
// Accepts an integer followed by m (minutes), h (hours), or d (days).

use std::time::Duration;

use crate::error::{RepoManError, Result};

/// TTL used when none is configured or the configured one is invalid: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Parse a TTL such as `30m`, `12h`, or `7d`. The empty string means [`DEFAULT_TTL`].
pub fn parse_ttl(duration: &str) -> Result<Duration> {
    if duration.is_empty() {
        return Ok(DEFAULT_TTL);
    }

    let duration = duration.trim();
    let Some((split, unit)) = duration.char_indices().next_back() else {
        return Err(RepoManError::InvalidTtl(duration.to_string()));
    };
    if split == 0 {
        return Err(RepoManError::InvalidTtl(duration.to_string()));
    }

    let value: u64 = duration[..split]
        .parse()
        .map_err(|_| RepoManError::InvalidTtl(duration.to_string()))?;

    let unit_secs = match unit {
        'm' => MINUTE,
        'h' => HOUR,
        'd' => DAY,
        other => {
            return Err(RepoManError::InvalidTtl(format!(
                "{duration} (unit {other} is not one of m, h, d)"
            )));
        }
    };

    value
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(|| RepoManError::InvalidTtl(format!("{duration} (out of range)")))
}

/// Like [`parse_ttl`], but logs and falls back to [`DEFAULT_TTL`] on error.
pub fn parse_ttl_or_default(duration: &str) -> Duration {
    parse_ttl(duration).unwrap_or_else(|e| {
        tracing::warn!(ttl = duration, error = %e, "invalid cache TTL, using default");
        DEFAULT_TTL
    })
}
