//! Read-side summary of a session's history.

use purgatory_types::{Attempt, History, SessionId, truncate_str};
use serde::Serialize;

/// Page title used when page metadata is enabled.
pub const PAGE_TITLE: &str = "Password Purgatory - Making Life Hell for Spammers";

/// Shown in place of an empty criteria string.
const NO_CRITERIA: &str = "[none]";

/// One attempt with its position and spacing from the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptView {
    /// 1-based position in the session.
    pub number: usize,
    pub timestamp: i64,
    pub criteria: String,
    pub password: String,
    /// Whole seconds since the previous attempt; `None` for the first.
    pub delta_seconds: Option<i64>,
}

impl AttemptView {
    pub fn criteria_display(&self) -> &str {
        if self.criteria.is_empty() {
            NO_CRITERIA
        } else {
            &self.criteria
        }
    }
}

/// Derived statistics for a non-empty session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub id: SessionId,
    pub history: History,
    pub attempts: Vec<AttemptView>,
    pub attempt_count: usize,
    pub total_elapsed_seconds: i64,
    /// Last attempt as `"<criteria>: <password>"`.
    pub summary_line: String,
    pub title: Option<String>,
}

impl SessionView {
    /// Build the view, or `None` when there are no attempts to show.
    pub fn from_history(id: SessionId, history: History, page_metadata: bool) -> Option<Self> {
        let first = history.anchor()?.timestamp;
        let last = history.last()?;

        let attempts = history
            .iter()
            .enumerate()
            .map(|(i, attempt)| AttemptView {
                number: i + 1,
                timestamp: attempt.timestamp,
                criteria: attempt.criteria.clone(),
                password: attempt.password.clone(),
                delta_seconds: i
                    .checked_sub(1)
                    .map(|prev| delta_seconds(&history.attempts()[prev], attempt)),
            })
            .collect();

        Some(Self {
            attempt_count: history.len(),
            total_elapsed_seconds: round_millis_to_secs(last.timestamp.saturating_sub(first)),
            summary_line: format!("{}: {}", last.criteria, last.password),
            title: page_metadata.then(|| PAGE_TITLE.to_string()),
            attempts,
            history,
            id,
        })
    }

    /// `summary_line` cut to `max_bytes` for share cards.
    pub fn preview(&self, max_bytes: usize) -> String {
        if self.summary_line.len() <= max_bytes {
            return self.summary_line.clone();
        }
        let cut = truncate_str(&self.summary_line, max_bytes.saturating_sub(3));
        format!("{cut}...")
    }

    pub fn headline(&self) -> String {
        format!(
            "Spammer made {} attempts to create a password that passes crazy criteria",
            self.attempt_count
        )
    }

    pub fn footer(&self) -> String {
        format!(
            "Spammer burned a total of {} seconds in Password Purgatory",
            self.total_elapsed_seconds
        )
    }
}

fn delta_seconds(previous: &Attempt, current: &Attempt) -> i64 {
    round_millis_to_secs(current.timestamp.saturating_sub(previous.timestamp))
}

/// Milliseconds to whole seconds, halves rounding toward positive infinity.
///
/// Saturates at the `i64` bounds; stored timestamps are not trusted.
pub fn round_millis_to_secs(millis: i64) -> i64 {
    millis.saturating_add(500).div_euclid(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(points: &[(i64, &str, &str)]) -> History {
        History::from(
            points
                .iter()
                .map(|(t, c, p)| Attempt::new(*t, *c, *p))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn empty_history_has_no_view() {
        assert!(SessionView::from_history("abc".into(), History::new(), true).is_none());
    }

    #[test]
    fn single_attempt_view() {
        let view =
            SessionView::from_history("abc".into(), history(&[(5_000, "", "hunter2")]), true)
                .unwrap();
        assert_eq!(view.attempt_count, 1);
        assert_eq!(view.total_elapsed_seconds, 0);
        assert_eq!(view.attempts[0].number, 1);
        assert_eq!(view.attempts[0].delta_seconds, None);
        assert_eq!(view.attempts[0].criteria_display(), "[none]");
        assert_eq!(view.summary_line, ": hunter2");
        assert_eq!(view.title.as_deref(), Some(PAGE_TITLE));
    }

    #[test]
    fn deltas_and_total() {
        let view = SessionView::from_history(
            "abc".into(),
            history(&[
                (0, "8+ chars", "hunter2"),
                (60_000, "1 number", "hunter22"),
                (61_499, "1 symbol", "hunter22!"),
                (62_000, "no repeats", "hunter2!"),
            ]),
            false,
        )
        .unwrap();

        let deltas: Vec<_> = view.attempts.iter().map(|a| a.delta_seconds).collect();
        assert_eq!(deltas, vec![None, Some(60), Some(1), Some(1)]);
        assert_eq!(view.total_elapsed_seconds, 62);
        assert_eq!(view.summary_line, "no repeats: hunter2!");
        assert!(view.title.is_none());
        assert_eq!(
            view.headline(),
            "Spammer made 4 attempts to create a password that passes crazy criteria"
        );
    }

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_millis_to_secs(0), 0);
        assert_eq!(round_millis_to_secs(499), 0);
        assert_eq!(round_millis_to_secs(500), 1);
        assert_eq!(round_millis_to_secs(1_499), 1);
        assert_eq!(round_millis_to_secs(-500), 0);
        assert_eq!(round_millis_to_secs(-1_500), -1);
    }

    #[test]
    fn extreme_stored_timestamps_saturate() {
        let view = SessionView::from_history(
            "abc".into(),
            history(&[(i64::MIN, "", "a"), (i64::MAX, "", "b")]),
            false,
        )
        .unwrap();
        assert_eq!(view.total_elapsed_seconds, i64::MAX.div_euclid(1000));
        assert_eq!(view.attempts[1].delta_seconds, Some(i64::MAX.div_euclid(1000)));

        let view = SessionView::from_history(
            "abc".into(),
            history(&[(i64::MAX, "", "a"), (i64::MIN, "", "b")]),
            false,
        )
        .unwrap();
        assert!(view.total_elapsed_seconds < 0);
        assert_eq!(round_millis_to_secs(i64::MAX), i64::MAX.div_euclid(1000));
    }

    #[test]
    fn preview_truncates_with_unicode_safety() {
        let password = "\u{1F608}".repeat(40);
        let view = SessionView::from_history(
            "abc".into(),
            history(&[(0, "emoji", password.as_str())]),
            true,
        )
        .unwrap();
        let preview = view.preview(50);
        assert!(preview.ends_with("..."));
        assert!(preview.len() <= 50);
        assert_eq!(view.preview(1_000), view.summary_line);
    }
}
