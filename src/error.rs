//! Application error types.
//!
//! Provides unified error handling with actionable context for debugging.

use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Message used when an upstream failure carries no `errors[0].detail`.
pub const GENERIC_UPSTREAM_MESSAGE: &str = "PCO API Error";

/// Application error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// Network error (connection, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// `Planning Center` API error with status context
    #[error("{message}")]
    PlanningCenter {
        /// Upstream-provided error detail, or the generic message.
        message: String,
        /// HTTP status code, if from an HTTP response.
        status: Option<u16>,
        /// Actionable suggestion for resolving the error.
        hint: Option<&'static str>,
    },

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// Response body did not match the expected shape
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
    },

    /// Caller-supplied input was rejected before any request was made
    #[error("{0}")]
    InvalidInput(String),

    /// The base person record could not be fetched, so no lookup result exists
    #[error("Could not load person {person_id}: {source}")]
    PersonUnavailable {
        /// Identifier that was looked up.
        person_id: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a `Planning Center` error with HTTP status
    pub fn pco_status(message: impl Into<String>, status: u16) -> Self {
        let hint = match status {
            401 => Some("Check PCO_APP_ID and PCO_SECRET environment variables"),
            403 => Some("Your API credentials may lack required permissions"),
            404 => Some("The requested resource was not found"),
            429 => Some("Rate limited - wait a moment and try again"),
            500..=599 => Some("Planning Center server error - try again later"),
            _ => None,
        };
        Self::PlanningCenter {
            message: message.into(),
            status: Some(status),
            hint,
        }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into() }
    }

    /// Wrap a failure to load the base person record
    pub fn person_unavailable(person_id: impl Into<String>, source: Self) -> Self {
        Self::PersonUnavailable {
            person_id: person_id.into(),
            source: Box::new(source),
        }
    }

    /// HTTP status attached to an upstream error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::PlanningCenter { status, .. } => *status,
            Self::PersonUnavailable { source, .. } => source.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}
