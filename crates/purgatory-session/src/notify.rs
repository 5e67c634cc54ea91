//! Notification seam fired when a session logs its first attempt.

use purgatory_types::{NotifyError, SessionId};
use std::future::Future;
use std::pin::Pin;

/// Details handed to a sink when a new session goes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSessionNotice {
    pub id: SessionId,
    /// Timestamp of the first attempt (ms since epoch).
    pub anchor_millis: i64,
}

/// Receives one notice per session, after its first attempt is persisted.
///
/// Uses `Pin<Box<dyn Future>>` for dyn-compatibility.
pub trait NotificationSink: Send + Sync {
    fn notify<'a>(
        &'a self,
        notice: &'a NewSessionNotice,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;

    /// Sink name for logging (e.g., "mailchannels").
    fn name(&self) -> &str;
}
