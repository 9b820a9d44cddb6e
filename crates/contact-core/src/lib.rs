//! Contact form core
//!
//! Domain logic behind the website's contact form: turning a raw request
//! body into a validated [`ContactSubmission`], rendering it into an
//! [`OutgoingMail`], and handing it to a [`MailSender`].
//!
//! ## Architecture
//!
//! 1. **Submission** (`submission`): presence and trimming rules for the
//!    `name`, `phone` and `message` fields.
//!
//! 2. **Mail** (`mail`): the `MailSender` capability, the contact email
//!    template and the SMTP implementation built on lettre.
//!
//! 3. **Config** (`config`): process settings read once at startup.
//!
//! ## Example
//!
//! ```rust,no_run
//! use contact_core::{ContactMailer, ContactSubmission, RawSubmission, Settings, SmtpMailSender};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let Some(mail) = settings.mail.as_ref() else {
//!         return Ok(());
//!     };
//!
//!     let sender = Arc::new(SmtpMailSender::new(mail)?);
//!     let mailer = ContactMailer::from_settings(sender, &settings.site_name, mail);
//!
//!     let raw = RawSubmission::from_json_bytes(br#"{"name":"Amina","phone":"7523834","message":"Hello"}"#)?;
//!     let submission = ContactSubmission::parse(&raw)?;
//!     let sent = mailer.deliver(&submission).await?;
//!     println!("queued as {}", sent.message_id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod mail;
pub mod submission;

pub use config::{Environment, MailSettings, Settings};
pub use error::{ConfigError, MailError, SubmissionError};
pub use mail::{ContactMailer, ContactTemplate, MailSender, OutgoingMail, SentMail, SmtpMailSender};
pub use submission::{ContactSubmission, FieldPresence, RawSubmission};

#[cfg(any(test, feature = "mock"))]
pub use mail::stub::StubMailSender;
