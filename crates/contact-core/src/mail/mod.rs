//! Mail delivery
//!
//! [`MailSender`] is the seam between the contact flow and the outside world.
//! The production implementation is [`SmtpMailSender`]; tests inject their own.
//!
//! [`ContactMailer`] binds a sender to the [`ContactTemplate`] and is built
//! once at startup, then shared read-only across requests.

pub mod smtp;
#[cfg(any(test, feature = "mock"))]
pub mod stub;
pub mod template;

pub use smtp::SmtpMailSender;
pub use template::ContactTemplate;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::MailSettings;
use crate::error::MailResult;
use crate::submission::ContactSubmission;

/// A single email ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Receipt for an accepted message. Acceptance by the relay does not imply
/// delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub message_id: String,
}

/// Capability to dispatch one email
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> MailResult<SentMail>;

    /// Check that the relay is reachable and accepts our credentials
    async fn verify(&self) -> MailResult<()> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct ContactMailer {
    sender: Arc<dyn MailSender>,
    template: ContactTemplate,
}

impl ContactMailer {
    pub fn new(sender: Arc<dyn MailSender>, template: ContactTemplate) -> Self {
        Self { sender, template }
    }

    pub fn from_settings(sender: Arc<dyn MailSender>, site_name: &str, mail: &MailSettings) -> Self {
        Self::new(sender, ContactTemplate::from_settings(site_name, mail))
    }

    pub fn template(&self) -> &ContactTemplate {
        &self.template
    }

    /// Render the submission and send it. Exactly one send attempt is made.
    pub async fn deliver(&self, submission: &ContactSubmission) -> MailResult<SentMail> {
        let mail = self.template.compose(submission);
        tracing::debug!(to = %mail.to, subject = %mail.subject, "Sending contact email");
        self.sender.send(mail).await
    }

    pub async fn verify(&self) -> MailResult<()> {
        self.sender.verify().await
    }
}

impl std::fmt::Debug for ContactMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactMailer")
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}
