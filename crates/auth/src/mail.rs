//! Outbound mail contract.
//!
//! The auth flows hand a message to a [`Mailer`] and move on; a failed delivery
//! is logged by the caller and never fails the request.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Mail delivery failed: {0}")]
pub struct MailError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTemplate {
    Activate,
    Forgot,
}

impl MailTemplate {
    /// Subject key resolved by the mail templates
    pub fn subject(&self) -> &'static str {
        match self {
            MailTemplate::Activate => "ACTIVATE",
            MailTemplate::Forgot => "FORGOT",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MailContext {
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub template: MailTemplate,
    pub context: MailContext,
}

impl MailMessage {
    pub fn with_link(to: &str, template: MailTemplate, link: String) -> Self {
        Self {
            to: to.to_string(),
            subject: template.subject().to_string(),
            template,
            context: MailContext { link: Some(link) },
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Development mailer that writes dispatches to the log instead of SMTP.
/// Links are only emitted at `debug`.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        tracing::info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            template = ?message.template,
            "mail dispatched"
        );
        if let Some(link) = &message.context.link {
            tracing::debug!(to = %message.to, %link, "mail link");
        }
        Ok(())
    }
}

/// Mailer that keeps every message in memory
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<MailMessage>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<MailMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Link of the most recent message sent to `to` with the given template
    pub fn last_link(&self, to: &str, template: MailTemplate) -> Option<String> {
        self.messages()
            .into_iter()
            .rev()
            .find(|m| m.to == to && m.template == template)
            .and_then(|m| m.context.link)
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        self.sent
            .lock()
            .map_err(|_| MailError("mailbox lock poisoned".to_string()))?
            .push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_mailer_records_links() {
        let mailer = MemoryMailer::new();
        mailer
            .send(MailMessage::with_link("a@x.com", MailTemplate::Activate, "link-1".to_string()))
            .await
            .unwrap();
        mailer
            .send(MailMessage::with_link("a@x.com", MailTemplate::Forgot, "link-2".to_string()))
            .await
            .unwrap();

        assert_eq!(mailer.messages().len(), 2);
        assert_eq!(mailer.messages()[0].subject, "ACTIVATE");
        assert_eq!(mailer.last_link("a@x.com", MailTemplate::Forgot).as_deref(), Some("link-2"));
        assert!(mailer.last_link("b@x.com", MailTemplate::Forgot).is_none());
    }
}
