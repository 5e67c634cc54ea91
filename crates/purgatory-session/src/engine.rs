//! Append policy and read path for sessions.
//!
//! A session moves `Reserved -> Active(n) -> Frozen(n)`. Frozen is never
//! stored: it is detected at append time by comparing the current time with
//! the first attempt's timestamp. Appends to a frozen session succeed but
//! leave the history untouched.
//!
//! Read-modify-write is not atomic. Two concurrent appends to the same
//! identifier can read the same history and the later `put` wins.

use crate::clock::{Clock, SystemClock};
use crate::error::SessionError;
use crate::notify::{NewSessionNotice, NotificationSink};
use crate::store::{SessionStore, StoredValue};
use crate::view::SessionView;
use purgatory_types::{Attempt, History, SessionId};
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;

/// Default retention window measured from the first attempt.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Construction-time configuration for [`SessionEngine`].
#[derive(Clone)]
pub struct EngineSettings {
    /// Key callers must present to reserve sessions; `None` locks reservation.
    pub api_key: Option<String>,
    /// `None` accepts attempts indefinitely.
    pub window: Option<Duration>,
    pub page_metadata: bool,
    pub clock: Arc<dyn Clock>,
    pub notifier: Option<Arc<dyn NotificationSink>>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            window: Some(DEFAULT_WINDOW),
            page_metadata: true,
            clock: Arc::new(SystemClock),
            notifier: None,
        }
    }
}

impl std::fmt::Debug for EngineSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("window", &self.window)
            .field("page_metadata", &self.page_metadata)
            .field("notifier", &self.notifier.as_ref().map(|n| n.name()))
            .finish()
    }
}

impl EngineSettings {
    pub fn with_window_minutes(mut self, minutes: Option<u32>) -> Self {
        self.window = minutes.map(|m| Duration::from_secs(u64::from(m) * 60));
        self
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_page_metadata(mut self, enabled: bool) -> Self {
        self.page_metadata = enabled;
        self
    }
}

/// Result of [`SessionEngine::append_attempt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// The history after the call (unchanged if the attempt was dropped).
    pub history: History,
    /// True only for the attempt that turned a reservation into a session.
    pub is_first_attempt: bool,
    /// False when the session was frozen and the attempt was dropped.
    pub accepted: bool,
}

/// Applies the append policy against a [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionEngine {
    store: SessionStore,
    settings: EngineSettings,
}

impl SessionEngine {
    pub fn new(store: SessionStore, settings: EngineSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Check a presented API key against the configured one.
    pub fn authorize(&self, presented: Option<&str>) -> Result<(), SessionError> {
        match (self.settings.api_key.as_deref(), presented) {
            (Some(expected), Some(given))
                if bool::from(expected.as_bytes().ct_eq(given.as_bytes())) =>
            {
                Ok(())
            }
            _ => Err(SessionError::Unauthorized),
        }
    }

    /// Allocate a fresh identifier and store its placeholder.
    pub async fn reserve_session(&self) -> Result<SessionId, SessionError> {
        let id = SessionId::generate();
        self.store.reserve(&id).await?;
        tracing::info!("Reserved session {id}");
        Ok(id)
    }

    /// Record an attempt for `id`.
    ///
    /// Unknown identifiers fail with [`SessionError::NotFound`] and nothing is
    /// written. A frozen session returns its unchanged history with
    /// `accepted = false`; that is not an error.
    pub async fn append_attempt(
        &self,
        id: &SessionId,
        criteria: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AppendOutcome, SessionError> {
        let now = self.settings.clock.now_millis();

        let mut history = match self.store.get(id).await? {
            StoredValue::NotFound => return Err(SessionError::not_found(id)),
            StoredValue::Placeholder => History::new(),
            StoredValue::History(history) => history,
        };

        if history.is_empty() {
            let history = History::starting_with(Attempt::new(now, criteria, password));
            self.store.put(id, &history).await?;
            tracing::info!("Session {id} received its first attempt");
            self.notify_first_attempt(id, now).await;
            return Ok(AppendOutcome {
                history,
                is_first_attempt: true,
                accepted: true,
            });
        }

        if self.is_frozen(&history, now) {
            tracing::debug!(
                "Session {id} is frozen; dropping attempt {}",
                history.len() + 1
            );
            return Ok(AppendOutcome {
                history,
                is_first_attempt: false,
                accepted: false,
            });
        }

        // Never record a timestamp earlier than the previous attempt.
        let timestamp = history.last().map_or(now, |last| now.max(last.timestamp));
        history.push(Attempt::new(timestamp, criteria, password));
        self.store.put(id, &history).await?;
        tracing::debug!("Session {id} now has {} attempts", history.len());

        Ok(AppendOutcome {
            history,
            is_first_attempt: false,
            accepted: true,
        })
    }

    /// Summarize the session for display.
    ///
    /// Reserved-but-empty sessions read as [`SessionError::NotFound`].
    pub async fn read_session(&self, id: &SessionId) -> Result<SessionView, SessionError> {
        match self.store.get(id).await? {
            StoredValue::History(history) => {
                SessionView::from_history(id.clone(), history, self.settings.page_metadata)
                    .ok_or_else(|| SessionError::not_found(id))
            }
            StoredValue::NotFound | StoredValue::Placeholder => Err(SessionError::not_found(id)),
        }
    }

    /// Whether `now` falls outside the retention window anchored at the first attempt.
    pub fn is_frozen(&self, history: &History, now: i64) -> bool {
        let (Some(window), Some(anchor)) = (self.settings.window, history.anchor()) else {
            return false;
        };
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        now.saturating_sub(anchor.timestamp) >= window_ms
    }

    async fn notify_first_attempt(&self, id: &SessionId, anchor_millis: i64) {
        let Some(notifier) = &self.settings.notifier else {
            return;
        };
        let notice = NewSessionNotice {
            id: id.clone(),
            anchor_millis,
        };
        if let Err(e) = notifier.notify(&notice).await {
            tracing::warn!(
                "Failed to send {} notification for session {id}: {e}",
                notifier.name()
            );
        }
    }
}
