//! Plain-text rendering of a session for the terminal.

use chrono::DateTime;
use purgatory_session::SessionView;
use std::fmt::Write;

/// Share-card descriptions are cut to this many bytes.
const DESCRIPTION_MAX_BYTES: usize = 200;

pub const NOT_FOUND: &str = "No hell with that kvKey exists";

pub fn render(view: &SessionView) -> String {
    let mut out = String::new();

    if let Some(title) = &view.title {
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "{}\n", view.preview(DESCRIPTION_MAX_BYTES));
    }

    let _ = writeln!(out, "{}", view.headline());
    for attempt in &view.attempts {
        let when = DateTime::from_timestamp_millis(attempt.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| attempt.timestamp.to_string());
        match attempt.delta_seconds {
            Some(delta) => {
                let _ = writeln!(
                    out,
                    "  Attempt {} ({delta} seconds later) at {when}",
                    attempt.number
                );
            }
            None => {
                let _ = writeln!(out, "  Attempt {} at {when}", attempt.number);
            }
        }
        let _ = writeln!(out, "    Criteria: {}", attempt.criteria_display());
        let _ = writeln!(out, "    Password: {}", attempt.password);
    }
    let _ = writeln!(out, "{}", view.footer());
    out
}
