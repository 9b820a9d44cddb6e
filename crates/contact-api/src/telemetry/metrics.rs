//! Prometheus metrics for the contact endpoint
//!
//! - `contact_submissions_total` (counter) - submissions by outcome
//! - `contact_mail_send_duration_seconds` (histogram) - time spent in the relay
//!
//! Each [`ContactMetrics`] owns its registry so tests can assert on counts
//! without interference.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

use super::{Result, TelemetryError};

const NAMESPACE: &str = "contact";

/// How a contact submission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionOutcome {
    InvalidBody,
    MissingFields,
    InvalidData,
    NotConfigured,
    Sent,
    SendFailed,
}

impl SubmissionOutcome {
    pub const ALL: [SubmissionOutcome; 6] = [
        SubmissionOutcome::InvalidBody,
        SubmissionOutcome::MissingFields,
        SubmissionOutcome::InvalidData,
        SubmissionOutcome::NotConfigured,
        SubmissionOutcome::Sent,
        SubmissionOutcome::SendFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionOutcome::InvalidBody => "invalid_body",
            SubmissionOutcome::MissingFields => "missing_fields",
            SubmissionOutcome::InvalidData => "invalid_data",
            SubmissionOutcome::NotConfigured => "not_configured",
            SubmissionOutcome::Sent => "sent",
            SubmissionOutcome::SendFailed => "send_failed",
        }
    }
}

pub struct ContactMetrics {
    registry: Registry,
    submissions_total: IntCounterVec,
    send_duration_seconds: Histogram,
}

impl ContactMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let submissions_total = IntCounterVec::new(
            Opts::new(
                "submissions_total",
                "Total number of contact form submissions by outcome",
            )
            .namespace(NAMESPACE),
            &["outcome"],
        )?;

        let send_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "mail_send_duration_seconds",
                "Time spent handing a contact email to the relay",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        registry.register(Box::new(submissions_total.clone()))?;
        registry.register(Box::new(send_duration_seconds.clone()))?;

        // Pre-create every label so all series appear from the first scrape
        for outcome in SubmissionOutcome::ALL {
            submissions_total.with_label_values(&[outcome.as_str()]);
        }

        Ok(Self {
            registry,
            submissions_total,
            send_duration_seconds,
        })
    }

    pub fn record_outcome(&self, outcome: SubmissionOutcome) {
        self.submissions_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn observe_send_duration(&self, duration_secs: f64) {
        self.send_duration_seconds.observe(duration_secs);
    }

    /// Current count for one outcome
    pub fn submissions(&self, outcome: SubmissionOutcome) -> u64 {
        self.submissions_total
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    pub fn send_count(&self) -> u64 {
        self.send_duration_seconds.get_sample_count()
    }

    /// Prometheus text exposition format
    pub fn encode_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| TelemetryError::EncodingError(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::EncodingError(e.to_string()))
    }
}

impl std::fmt::Debug for ContactMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactMetrics").finish_non_exhaustive()
    }
}
