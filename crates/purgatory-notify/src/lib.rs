//! Notification sinks fired when a new session goes live.

mod delivery;
mod log;
mod mailchannels;

pub use delivery::DeliveryPolicy;
pub use log::LogSink;
pub use mailchannels::{Address, MailChannelsSink};

use purgatory_config::{NotificationConfig, SinkKind};
use purgatory_session::NotificationSink;
use purgatory_types::NotifyError;
use std::sync::Arc;

/// Build the sink selected by configuration, or `None` when notifications are off.
pub fn build_sink(
    config: &NotificationConfig,
) -> Result<Option<Arc<dyn NotificationSink>>, NotifyError> {
    let sink: Arc<dyn NotificationSink> = match config.sink {
        SinkKind::None => return Ok(None),
        SinkKind::Log => Arc::new(LogSink::new(&config.view_url)),
        SinkKind::MailChannels => Arc::new(MailChannelsSink::from_config(config)?),
    };
    Ok(Some(sink))
}

/// Public link to a session's attempt log.
pub fn view_link(view_url: &str, id: &purgatory_types::SessionId) -> String {
    format!("{view_url}?kvKey={id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use purgatory_config::DEFAULT_MAIL_ENDPOINT;

    fn config(sink: SinkKind) -> NotificationConfig {
        NotificationConfig {
            sink,
            endpoint: DEFAULT_MAIL_ENDPOINT.into(),
            view_url: "https://example.com/get-hell".into(),
            to_email: Some("troy@example.com".into()),
            to_name: None,
            from_email: Some("noreply@example.com".into()),
            from_name: None,
        }
    }

    #[test]
    fn none_builds_nothing() {
        assert!(build_sink(&config(SinkKind::None)).unwrap().is_none());
    }

    #[test]
    fn builds_named_sinks() {
        let log = build_sink(&config(SinkKind::Log)).unwrap().unwrap();
        assert_eq!(log.name(), "log");
        let mail = build_sink(&config(SinkKind::MailChannels)).unwrap().unwrap();
        assert_eq!(mail.name(), "mailchannels");
    }

    #[test]
    fn view_link_format() {
        let id = purgatory_types::SessionId::from("abc");
        assert_eq!(
            view_link("https://passwordpurgatory.com/get-hell", &id),
            "https://passwordpurgatory.com/get-hell?kvKey=abc"
        );
    }
}
