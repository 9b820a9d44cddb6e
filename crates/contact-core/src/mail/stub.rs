//! In-memory mail sender for tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::{MailSender, OutgoingMail, SentMail};
use crate::error::{MailError, MailResult};

/// Records every message it is asked to send. Optionally fails every send
/// with a fixed transport error.
#[derive(Debug, Default)]
pub struct StubMailSender {
    sent: Mutex<Vec<OutgoingMail>>,
    attempts: AtomicUsize,
    failure: Option<String>,
}

impl StubMailSender {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Messages accepted so far
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Send calls so far, successful or not
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MailSender for StubMailSender {
    async fn send(&self, mail: OutgoingMail) -> MailResult<SentMail> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(message) = &self.failure {
            return Err(MailError::transport(message.clone()));
        }

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mail);

        Ok(SentMail {
            message_id: format!("<stub-{}@localhost>", attempt),
        })
    }
}
