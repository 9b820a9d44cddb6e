//! Error types for the contact core
//!
//! One enum per concern: request input, mail delivery and startup
//! configuration.

use thiserror::Error;

use crate::submission::FieldPresence;

/// Rejection of a contact submission before any mail is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Body was not a JSON object
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    /// At least one field absent or falsy in the raw body
    #[error("All fields are required")]
    MissingFields(FieldPresence),

    /// Every field present, but at least one is blank after trimming
    #[error("All fields must contain valid data")]
    InvalidData,
}

impl SubmissionError {
    /// Short machine-readable tag used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::InvalidBody(_) => "invalid_body",
            SubmissionError::MissingFields(_) => "missing_fields",
            SubmissionError::InvalidData => "invalid_data",
        }
    }
}

/// Mail delivery errors
#[derive(Error, Debug)]
pub enum MailError {
    /// An address could not be parsed into a mailbox
    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The message could not be assembled
    #[error("Failed to build message: {0}")]
    Build(String),

    /// The relay refused the message or could not be reached
    #[error("{0}")]
    Transport(String),
}

impl MailError {
    pub fn transport(msg: impl Into<String>) -> Self {
        MailError::Transport(msg.into())
    }

    pub fn invalid_address(address: impl Into<String>, reason: impl ToString) -> Self {
        MailError::InvalidAddress {
            address: address.into(),
            reason: reason.to_string(),
        }
    }
}

/// Startup configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Result type alias for mail operations
pub type MailResult<T> = std::result::Result<T, MailError>;
