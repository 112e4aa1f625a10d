/// Transactional email
///
/// [`Mailer`] is the delivery seam. [`SendGridMailer`] talks to the SendGrid
/// v3 API and [`LogMailer`] only logs, for development without an API key.
///
/// [`Notifier`] formats the account messages and sends them on a spawned task.
/// The caller never waits for delivery and never sees a delivery error;
/// failures end up in the log as warnings.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

pub const WELCOME_SUBJECT: &str = "Welcome to the Task Manager";
pub const CANCELLATION_SUBJECT: &str = "Sorry you are leaving the Task Manager";

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

/// SendGrid v3 `mail/send` client
#[derive(Debug, Clone)]
pub struct SendGridMailer {
    client: reqwest::Client,
    api_key: String,
}

impl SendGridMailer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let body = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": email.from },
            "subject": email.subject,
            "content": [{ "type": "text/plain", "value": email.body }]
        });

        let resp = self
            .client
            .post(SENDGRID_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status, body });
        }

        Ok(())
    }
}

/// Logs each message instead of delivering it
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "Email not delivered (no mail provider configured)");
        Ok(())
    }
}

/// Account notifications
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
        }
    }

    pub fn welcome_email(&self, to: &str, name: &str) -> Email {
        Email {
            to: to.to_string(),
            from: self.from.clone(),
            subject: WELCOME_SUBJECT.to_string(),
            body: format!(
                "Welcome to the app, {}. Let me know how you get along with the app!",
                name
            ),
        }
    }

    pub fn cancellation_email(&self, to: &str, name: &str) -> Email {
        Email {
            to: to.to_string(),
            from: self.from.clone(),
            subject: CANCELLATION_SUBJECT.to_string(),
            body: format!(
                "Sorry to see you go {}. We hope to see you back sometime soon.",
                name
            ),
        }
    }

    pub fn send_welcome(&self, to: &str, name: &str) {
        self.dispatch(self.welcome_email(to, name));
    }

    pub fn send_cancellation(&self, to: &str, name: &str) {
        self.dispatch(self.cancellation_email(to, name));
    }

    fn dispatch(&self, email: Email) {
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            let to = email.to.clone();
            let subject = email.subject.clone();
            if let Err(e) = mailer.send(email).await {
                warn!(to = %to, subject = %subject, error = %e, "Failed to send email");
            }
        });
    }
}
