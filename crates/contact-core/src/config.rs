//! Process settings
//!
//! Settings are read once at startup from the environment, after loading a
//! `.env` file if one exists. They are immutable for the life of the process.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SENDER_EMAIL` | none |
//! | `SENDER_PASSWORD` | none |
//! | `RECEIVER_EMAIL` | none |
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `5000` |
//! | `APP_ENV` / `NODE_ENV` | `development` |
//! | `SMTP_HOST` | `smtp.gmail.com` |
//! | `SMTP_PORT` | `587` |
//! | `SMTP_TIMEOUT_SECS` | `30` |
//! | `SITE_NAME` | `Jayid Botamed Health Care` |
//! | `STATIC_DIR` | `static` |
//!
//! Mail delivery is enabled only when all three of `SENDER_EMAIL`,
//! `SENDER_PASSWORD` and `RECEIVER_EMAIL` are non-empty. A whitespace-only
//! value still counts as set; the relay rejects it at send time.

use secrecy::SecretString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SITE_NAME: &str = "Jayid Botamed Health Care";
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Deployment environment. Only `production` changes behaviour: it hides
/// internal error text from HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Other(String),
}

impl Environment {
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("development") {
            Environment::Development
        } else if name.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Other(name.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Other(name) => name,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relay settings. Only constructed when every credential is present.
#[derive(Debug, Clone)]
pub struct MailSettings {
    /// Sender address, also the SMTP username
    pub sender_email: String,
    pub sender_password: SecretString,
    /// Fixed recipient of every contact email
    pub receiver_email: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub timeout: Duration,
}

/// Which of the mail variables were set, for startup diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MailVarPresence {
    pub sender_email: bool,
    pub sender_password: bool,
    pub receiver_email: bool,
}

impl MailVarPresence {
    pub fn all(&self) -> bool {
        self.sender_email && self.sender_password && self.receiver_email
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub site_name: String,
    pub static_dir: PathBuf,
    pub mail: Option<MailSettings>,
    pub mail_vars: MailVarPresence,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        // Mail variables count as set when non-empty, even if only whitespace
        let set = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let sender_email = set("SENDER_EMAIL").map(|v| v.trim().to_string());
        let sender_password = set("SENDER_PASSWORD");
        let receiver_email = set("RECEIVER_EMAIL").map(|v| v.trim().to_string());

        let mail_vars = MailVarPresence {
            sender_email: sender_email.is_some(),
            sender_password: sender_password.is_some(),
            receiver_email: receiver_email.is_some(),
        };

        let smtp_host = non_empty("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
        let smtp_port = parse_or("SMTP_PORT", non_empty("SMTP_PORT"), DEFAULT_SMTP_PORT)?;
        let timeout_secs = parse_or(
            "SMTP_TIMEOUT_SECS",
            non_empty("SMTP_TIMEOUT_SECS"),
            DEFAULT_SMTP_TIMEOUT_SECS,
        )?;

        let mail = match (sender_email, sender_password, receiver_email) {
            (Some(sender_email), Some(password), Some(receiver_email)) => Some(MailSettings {
                sender_email,
                sender_password: SecretString::new(password),
                receiver_email,
                smtp_host,
                smtp_port,
                timeout: Duration::from_secs(timeout_secs),
            }),
            _ => None,
        };

        let environment = non_empty("APP_ENV")
            .or_else(|| non_empty("NODE_ENV"))
            .map(|name| Environment::from_name(&name))
            .unwrap_or_default();

        Ok(Self {
            host: non_empty("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", non_empty("PORT"), DEFAULT_PORT)?,
            environment,
            site_name: non_empty("SITE_NAME").unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
            static_dir: non_empty("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            mail,
            mail_vars,
        })
    }

    /// True when all three mail variables were present at startup
    pub fn email_configured(&self) -> bool {
        self.mail.is_some()
    }
}

fn parse_or<T>(var: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: var.to_string(),
            reason: format!("'{}': {}", raw, e),
        }),
        None => Ok(default),
    }
}
