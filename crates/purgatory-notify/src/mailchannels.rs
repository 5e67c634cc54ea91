//! Email notification through the MailChannels send API.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use purgatory_config::NotificationConfig;
use purgatory_session::{NewSessionNotice, NotificationSink};
use purgatory_types::NotifyError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Serialize;

use crate::delivery::DeliveryPolicy;

const SUBJECT: &str = "New spammer hooked!";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// An email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: &'a Address,
    subject: &'static str,
    content: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<&'a Address>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

/// Sends one plain-text email per new session.
#[derive(Clone)]
pub struct MailChannelsSink {
    http: reqwest::Client,
    endpoint: String,
    view_url: String,
    to: Address,
    from: Address,
    policy: DeliveryPolicy,
}

impl MailChannelsSink {
    pub fn new(
        endpoint: impl Into<String>,
        view_url: impl Into<String>,
        to: Address,
        from: Address,
    ) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            view_url: view_url.into(),
            to,
            from,
            policy: DeliveryPolicy::default(),
        })
    }

    pub fn from_config(config: &NotificationConfig) -> Result<Self, NotifyError> {
        let to_email = config
            .to_email
            .clone()
            .ok_or_else(|| NotifyError::NotConfigured("to_email".into()))?;
        let from_email = config
            .from_email
            .clone()
            .ok_or_else(|| NotifyError::NotConfigured("from_email".into()))?;

        Self::new(
            &config.endpoint,
            &config.view_url,
            Address {
                email: to_email,
                name: config.to_name.clone(),
            },
            Address {
                email: from_email,
                name: config.from_name.clone(),
            },
        )
    }

    pub fn with_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn payload<'a>(&'a self, notice: &NewSessionNotice) -> SendRequest<'a> {
        SendRequest {
            personalizations: vec![Personalization { to: vec![&self.to] }],
            from: &self.from,
            subject: SUBJECT,
            content: vec![Content {
                kind: "text/plain",
                value: format!(
                    "View the log of their painful password attempts here: {}",
                    crate::view_link(&self.view_url, &notice.id)
                ),
            }],
        }
    }

    async fn send(&self, notice: &NewSessionNotice) -> Result<(), NotifyError> {
        let body = self.payload(notice);
        let mut sent = 0;
        let mut paused = Duration::ZERO;

        loop {
            sent += 1;
            let err = match self.post(&body).await {
                Ok(()) => {
                    tracing::debug!("Notification for session {} accepted", notice.id);
                    return Ok(());
                }
                Err(err) => err,
            };

            let Some(pause) = self.policy.next_pause(sent, &err, paused) else {
                return Err(err);
            };
            tracing::warn!(
                "Notification for session {} failed on send {sent}: {err}. Sending again in {}ms",
                notice.id,
                pause.as_millis()
            );
            tokio::time::sleep(pause).await;
            paused += pause;
        }
    }

    async fn post(&self, body: &SendRequest<'_>) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout
                } else {
                    NotifyError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let retry_after = parse_retry_after(response.headers());
        let body_text = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body_text, retry_after))
    }
}

impl NotificationSink for MailChannelsSink {
    fn notify<'a>(
        &'a self,
        notice: &'a NewSessionNotice,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(self.send(notice))
    }

    fn name(&self) -> &str {
        "mailchannels"
    }
}

/// MailChannels sends `Retry-After` as whole seconds; returns milliseconds.
/// HTTP-date values are ignored and fall back to the policy's own pause.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    let secs = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse::<u64>().ok()?;
    Some(secs.saturating_mul(1000))
}

/// Map a non-2xx MailChannels response to a [`NotifyError`].
fn classify_error(status: u16, body: &str, retry_after: Option<u64>) -> NotifyError {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        errors: Option<Vec<String>>,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.errors)
        .map(|errors| errors.join("; "))
        .unwrap_or_else(|| body.to_string());

    match status {
        429 => NotifyError::RateLimited {
            retry_after_ms: retry_after,
        },
        500..=599 => NotifyError::Server { status, message },
        _ => NotifyError::Rejected { status, message },
    }
}
