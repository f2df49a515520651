// Shared cancellation for a batch of external processes.
// A deadline fires on explicit cancel or once its optional expiry instant passes.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::CancelReason;

/// Cancellation token plus an optional expiry. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct Deadline {
    token: CancellationToken,
    expires_at: Option<Instant>,
}

impl Deadline {
    /// A deadline that only fires when `token` is cancelled.
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            expires_at: None,
        }
    }

    /// Fires when `token` is cancelled or `timeout` elapses, whichever comes first.
    pub fn with_timeout(token: CancellationToken, timeout: Duration) -> Self {
        Self {
            token,
            expires_at: Instant::now().checked_add(timeout),
        }
    }

    /// Never fires on its own.
    pub fn never() -> Self {
        Self::new(CancellationToken::new())
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Non-blocking check: the reason if the deadline has already fired.
    pub fn check(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            return Some(CancelReason::Aborted);
        }
        match self.expires_at {
            Some(at) if Instant::now() >= at => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the deadline fires.
    pub async fn fired(&self) -> CancelReason {
        match self.expires_at {
            Some(at) => tokio::select! {
                _ = self.token.cancelled() => CancelReason::Aborted,
                _ = tokio::time::sleep_until(at) => CancelReason::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                CancelReason::Aborted
            }
        }
    }
}
