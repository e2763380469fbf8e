use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("tenant has no business email credentials")]
    MissingCredentials,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("outbound mail is disabled")]
    Disabled,

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Sender identity and SMTP login of a tenant's business mailbox.
#[derive(Clone)]
pub struct MailCredentials {
    pub from_name: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("from_name", &self.from_name)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound email seam, swapped for a recorder in tests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, credentials: &MailCredentials, mail: OutgoingMail) -> Result<(), MailError>;
}

/// STARTTLS relay authenticated with the tenant's own mailbox.
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn build_message(credentials: &MailCredentials, mail: &OutgoingMail) -> Result<Message, MailError> {
        let from: Mailbox = format!("{} <{}>", credentials.from_name, credentials.username)
            .parse()
            .or_else(|_| credentials.username.parse())
            .map_err(|_| MailError::InvalidAddress(credentials.username.clone()))?;
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|_| MailError::InvalidAddress(mail.to.clone()))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(mail.html.clone())
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, credentials: &MailCredentials, mail: OutgoingMail) -> Result<(), MailError> {
        let message = Self::build_message(credentials, &mail)?;

        if !self.config.enabled {
            tracing::info!("Mail disabled; not sending '{}' to {}", mail.subject, mail.to);
            return Err(MailError::Disabled);
        }

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!("Sent '{}' to {}", mail.subject, mail.to);
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Captures outgoing mail instead of sending it.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<(String, OutgoingMail)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, credentials: &MailCredentials, mail: OutgoingMail) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Transport("connection refused".into()));
            }
            self.sent.lock().unwrap().push((credentials.username.clone(), mail));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> MailCredentials {
        MailCredentials {
            from_name: "Acme".into(),
            username: "shop@acme.test".into(),
            password: "secret".into(),
        }
    }

    #[test]
    fn builds_html_message() {
        let mail = OutgoingMail {
            to: "buyer@example.test".into(),
            subject: "Hello".into(),
            html: "<p>Hi</p>".into(),
        };
        assert!(SmtpMailer::build_message(&creds(), &mail).is_ok());
    }

    #[test]
    fn rejects_bad_recipient() {
        let mail = OutgoingMail {
            to: "not an address".into(),
            subject: "Hello".into(),
            html: String::new(),
        };
        assert!(matches!(
            SmtpMailer::build_message(&creds(), &mail),
            Err(MailError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn disabled_mailer_refuses_after_validation() {
        let mailer = SmtpMailer::new(crate::config::AppConfig::development().mail);
        let mail = OutgoingMail {
            to: "buyer@example.test".into(),
            subject: "Hello".into(),
            html: String::new(),
        };
        assert!(matches!(mailer.send(&creds(), mail).await, Err(MailError::Disabled)));
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", creds());
        assert!(!rendered.contains("secret"));
    }
}
