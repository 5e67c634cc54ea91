//! Sink that only writes a log line.

use purgatory_session::{NewSessionNotice, NotificationSink};
use purgatory_types::NotifyError;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, Clone)]
pub struct LogSink {
    view_url: String,
}

impl LogSink {
    pub fn new(view_url: impl Into<String>) -> Self {
        Self {
            view_url: view_url.into(),
        }
    }
}

impl NotificationSink for LogSink {
    fn notify<'a>(
        &'a self,
        notice: &'a NewSessionNotice,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(async move {
            tracing::info!(
                session = %notice.id,
                link = %crate::view_link(&self.view_url, &notice.id),
                "New spammer hooked"
            );
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "log"
    }
}
