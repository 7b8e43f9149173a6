//! Error Types for the market data boundary
//!
//! The classifier itself never fails; everything here belongs to the
//! fetch and trade-execution collaborators.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarketError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// No connectivity: connection refused, DNS failure, timeout
    #[error("Market service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a non-success status
    #[error("Market service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered 2xx but the body was not a valid payload
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Trade request rejected before it left the process
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MarketError {
    /// True when the service could not be reached at all
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Unreachable(_) => "You appear to be offline. Showing demo data.".into(),
            Self::Status { status, .. } => {
                format!("The market service is having trouble (status {status}).")
            }
            Self::Decode(_) => "The market service sent data we could not read.".into(),
            Self::InvalidOrder(msg) => format!("Order rejected: {msg}"),
            Self::Config(_) => "Service configuration error.".into(),
        }
    }
}

impl From<reqwest::Error> for MarketError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::Status {
                status: status.as_u16(),
                body: err.to_string(),
            };
        }
        if err.is_builder() {
            return Self::Config(err.to_string());
        }
        // connect, timeout, request and body transport failures all mean
        // no usable connection to the service
        Self::Unreachable(err.to_string())
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
