//! SMTP delivery through lettre
//!
//! Connects to the configured relay with STARTTLS and authenticates with the
//! sender's address and credential. Each message gets a generated
//! `Message-ID`, which is returned to the caller as the receipt.
//!
//! Reply-To carries whatever the template put there. The contact flow uses
//! the visitor's phone number, which is not a mailbox, so it is written as a
//! raw header value.

use async_trait::async_trait;
use lettre::message::header::{HeaderName, HeaderValue};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use uuid::Uuid;

use super::{MailSender, OutgoingMail, SentMail};
use crate::config::MailSettings;
use crate::error::{MailError, MailResult};

pub struct SmtpMailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    relay: String,
    message_domain: String,
}

impl SmtpMailSender {
    /// Build the transport. No connection is made until the first send.
    pub fn new(settings: &MailSettings) -> MailResult<Self> {
        let credentials = Credentials::new(
            settings.sender_email.clone(),
            settings.sender_password.expose_secret().clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
            .map_err(|e| MailError::transport(e.to_string()))?
            .port(settings.smtp_port)
            .credentials(credentials)
            .timeout(Some(settings.timeout))
            .build();

        let message_domain = settings
            .sender_email
            .rsplit_once('@')
            .map(|(_, domain)| domain.to_string())
            .filter(|domain| !domain.is_empty())
            .unwrap_or_else(|| "localhost".to_string());

        Ok(Self {
            transport,
            relay: format!("{}:{}", settings.smtp_host, settings.smtp_port),
            message_domain,
        })
    }

    pub fn relay(&self) -> &str {
        &self.relay
    }

    fn build_message(&self, mail: &OutgoingMail) -> MailResult<(Message, String)> {
        let from = parse_mailbox(&mail.from)?;
        let to = parse_mailbox(&mail.to)?;
        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.message_domain);

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.clone())
            .message_id(Some(message_id.clone()));

        if let Some(reply_to) = mail.reply_to.as_deref() {
            match reply_to.parse::<Mailbox>() {
                Ok(mailbox) => builder = builder.reply_to(mailbox),
                Err(_) => {
                    builder = builder.raw_header(HeaderValue::new(
                        HeaderName::new_from_ascii_str("Reply-To"),
                        reply_to.to_string(),
                    ));
                }
            }
        }

        let message = builder
            .multipart(MultiPart::alternative_plain_html(
                mail.text.clone(),
                mail.html.clone(),
            ))
            .map_err(|e| MailError::Build(e.to_string()))?;

        Ok((message, message_id))
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send(&self, mail: OutgoingMail) -> MailResult<SentMail> {
        let (message, message_id) = self.build_message(&mail)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::transport(e.to_string()))?;

        tracing::info!(relay = %self.relay, message_id = %message_id, "Email accepted by relay");
        Ok(SentMail { message_id })
    }

    async fn verify(&self) -> MailResult<()> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::transport(format!(
                "SMTP relay {} refused the connection",
                self.relay
            ))),
            Err(e) => Err(MailError::transport(e.to_string())),
        }
    }
}

impl std::fmt::Debug for SmtpMailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailSender")
            .field("relay", &self.relay)
            .finish_non_exhaustive()
    }
}

fn parse_mailbox(address: &str) -> MailResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| MailError::invalid_address(address, e))
}
