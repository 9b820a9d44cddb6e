//! Contact submissions
//!
//! A submission is checked in a fixed order: presence of every raw field,
//! then trimming, then emptiness after trimming. The order decides which
//! error a malformed body receives.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SubmissionError;

/// Untyped request body as received from the client
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawSubmission(Map<String, Value>);

impl RawSubmission {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Parse a request body. An empty body is an empty object.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, SubmissionError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(fields)) => Ok(Self(fields)),
            Ok(other) => Err(SubmissionError::InvalidBody(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
            Err(e) => Err(SubmissionError::InvalidBody(e.to_string())),
        }
    }

    /// Which of the three fields carry a truthy value
    pub fn presence(&self) -> FieldPresence {
        FieldPresence {
            name: self.is_present("name"),
            phone: self.is_present("phone"),
            message: self.is_present("message"),
        }
    }

    fn is_present(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(is_truthy)
    }

    fn trimmed(&self, key: &str) -> Option<String> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
    }
}

/// Presence flags reported back to the client on a 400
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPresence {
    pub name: bool,
    pub phone: bool,
    pub message: bool,
}

impl FieldPresence {
    pub fn all(&self) -> bool {
        self.name && self.phone && self.message
    }
}

/// A validated contact submission. Every field is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    name: String,
    phone: String,
    message: String,
}

impl ContactSubmission {
    /// Validate a raw body.
    ///
    /// Returns [`SubmissionError::MissingFields`] when any field is absent or
    /// falsy, and [`SubmissionError::InvalidData`] when all are present but one
    /// is blank after trimming or is not a string.
    pub fn parse(raw: &RawSubmission) -> Result<Self, SubmissionError> {
        let presence = raw.presence();
        if !presence.all() {
            return Err(SubmissionError::MissingFields(presence));
        }

        let name = raw.trimmed("name");
        let phone = raw.trimmed("phone");
        let message = raw.trimmed("message");

        match (name, phone, message) {
            (Some(name), Some(phone), Some(message))
                if !name.is_empty() && !phone.is_empty() && !message.is_empty() =>
            {
                Ok(Self {
                    name,
                    phone,
                    message,
                })
            }
            _ => Err(SubmissionError::InvalidData),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl TryFrom<&RawSubmission> for ContactSubmission {
    type Error = SubmissionError;

    fn try_from(raw: &RawSubmission) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

// Browser-side truthiness: null, false, 0 and "" count as missing.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
