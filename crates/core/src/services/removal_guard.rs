use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::clock::Clock;

/// Result of asking to remove a holding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalDecision {
    /// First request: nothing removed yet, waiting for confirmation.
    Armed { code: String, expires_at: DateTime<Utc> },
    /// Second request within the window: go ahead and remove.
    Confirmed { code: String },
}

/// Two-step confirmation for destructive removals.
///
/// The first request for a code arms the guard; a second request for the
/// same code before the window lapses confirms it. An armed guard disarms
/// itself once the window has passed, and arming another code replaces
/// the pending one.
pub struct RemovalGuard {
    clock: Arc<dyn Clock>,
    window: Duration,
    pending: Option<(String, DateTime<Utc>)>,
}

impl RemovalGuard {
    pub fn new(clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            clock,
            window,
            pending: None,
        }
    }

    pub fn request(&mut self, code: &str) -> RemovalDecision {
        let code = code.trim().to_uppercase();
        let now = self.clock.now();

        if let Some((pending, expires_at)) = self.pending.take() {
            if pending == code && now < expires_at {
                debug!(code = %code, "removal confirmed");
                return RemovalDecision::Confirmed { code };
            }
        }

        let expires_at = now
            .checked_add_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        debug!(code = %code, %expires_at, "removal armed");
        self.pending = Some((code.clone(), expires_at));
        RemovalDecision::Armed { code, expires_at }
    }

    /// The code currently awaiting confirmation, if the window is still open.
    pub fn pending(&self) -> Option<&str> {
        let now = self.clock.now();
        self.pending
            .as_ref()
            .filter(|(_, expires_at)| now < *expires_at)
            .map(|(code, _)| code.as_str())
    }

    pub fn is_armed(&self) -> bool {
        self.pending().is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
