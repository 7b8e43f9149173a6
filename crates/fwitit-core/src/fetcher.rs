//! Recommendation Fetcher
//!
//! Runs one fetch cycle: pull a signal, classify it, and apply the fallback
//! policy when the service cannot deliver. A fallback is always reported as
//! such on the outcome; it never overwrites or hides the failure cause.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::error::{MarketError, Result};
use crate::market::{MarketDataClient, demo_signal};
use crate::model::Recommendation;

/// When to substitute demo data for a failed fetch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Surface every failure
    Disabled,

    /// Only mask connectivity failures
    OfflineOnly,

    /// Mask connectivity failures, error statuses and malformed bodies
    #[default]
    AnyFailure,
}

impl FallbackPolicy {
    /// Cause to record if `err` should be masked, `None` if it should surface
    pub fn cause_for(self, err: &MarketError) -> Option<FallbackCause> {
        let cause = FallbackCause::from_error(err)?;
        match (self, cause) {
            (Self::Disabled, _) => None,
            (Self::OfflineOnly, FallbackCause::Offline) | (Self::AnyFailure, _) => Some(cause),
            (Self::OfflineOnly, _) => None,
        }
    }
}

impl FromStr for FallbackPolicy {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "disabled" | "off" | "none" => Ok(Self::Disabled),
            "offline" | "offline_only" => Ok(Self::OfflineOnly),
            "any" | "any_failure" => Ok(Self::AnyFailure),
            other => Err(MarketError::Config(format!("unknown fallback policy: {other}"))),
        }
    }
}

/// Where a recommendation came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    Live,
    Fallback,
}

/// Why demo data was shown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackCause {
    /// The service could not be reached
    Offline,

    /// The service answered with an error status
    ServerError { status: u16 },

    /// The service answered with a body that was not a signal
    MalformedResponse,
}

impl FallbackCause {
    /// Map a fetch failure to a cause. Local errors have no fallback cause.
    pub const fn from_error(err: &MarketError) -> Option<Self> {
        match err {
            MarketError::Unreachable(_) => Some(Self::Offline),
            MarketError::Status { status, .. } => Some(Self::ServerError { status: *status }),
            MarketError::Decode(_) => Some(Self::MalformedResponse),
            MarketError::InvalidOrder(_) | MarketError::Config(_) => None,
        }
    }
}

/// Result of one fetch cycle. The mode is implied by the cause, so a live
/// outcome can never carry one and a fallback always does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "OutcomeWire", try_from = "OutcomeWire")]
pub struct FetchOutcome {
    pub recommendation: Recommendation,
    cause: Option<FallbackCause>,
    pub fetched_at: DateTime<Utc>,
}

impl FetchOutcome {
    pub fn live(recommendation: Recommendation) -> Self {
        Self {
            recommendation,
            cause: None,
            fetched_at: Utc::now(),
        }
    }

    /// Outcome carrying the classified demo signal
    pub fn fallback(cause: FallbackCause) -> Self {
        Self {
            recommendation: classify(&demo_signal()),
            cause: Some(cause),
            fetched_at: Utc::now(),
        }
    }

    pub const fn mode(&self) -> FetchMode {
        match self.cause {
            Some(_) => FetchMode::Fallback,
            None => FetchMode::Live,
        }
    }

    /// Why demo data was shown, `None` for a live outcome
    pub const fn cause(&self) -> Option<FallbackCause> {
        self.cause
    }

    pub const fn is_live(&self) -> bool {
        self.cause.is_none()
    }
}

#[derive(Serialize, Deserialize)]
struct OutcomeWire {
    recommendation: Recommendation,
    mode: FetchMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cause: Option<FallbackCause>,
    fetched_at: DateTime<Utc>,
}

impl From<FetchOutcome> for OutcomeWire {
    fn from(outcome: FetchOutcome) -> Self {
        Self {
            mode: outcome.mode(),
            recommendation: outcome.recommendation,
            cause: outcome.cause,
            fetched_at: outcome.fetched_at,
        }
    }
}

impl TryFrom<OutcomeWire> for FetchOutcome {
    type Error = String;

    fn try_from(wire: OutcomeWire) -> std::result::Result<Self, Self::Error> {
        match (wire.mode, wire.cause) {
            (FetchMode::Live, Some(_)) => Err("live outcome cannot carry a fallback cause".into()),
            (FetchMode::Fallback, None) => Err("fallback outcome is missing its cause".into()),
            (_, cause) => Ok(Self {
                recommendation: wire.recommendation,
                cause,
                fetched_at: wire.fetched_at,
            }),
        }
    }
}

/// Fetches and classifies recommendations
#[derive(Clone)]
pub struct RecommendationFetcher {
    client: Arc<dyn MarketDataClient>,
    policy: FallbackPolicy,
}

impl RecommendationFetcher {
    pub fn new(client: Arc<dyn MarketDataClient>, policy: FallbackPolicy) -> Self {
        Self { client, policy }
    }

    pub const fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// Run one fetch cycle
    pub async fn fetch(&self) -> Result<FetchOutcome> {
        match self.client.fetch_signal().await {
            Ok(signal) => {
                let recommendation = classify(&signal);
                tracing::debug!(
                    "Classified {}: {:?}/{:?}/{:?}",
                    recommendation.symbol,
                    recommendation.recommendation_label,
                    recommendation.sentiment_label,
                    recommendation.risk_level
                );
                Ok(FetchOutcome::live(recommendation))
            }
            Err(err) => match self.policy.cause_for(&err) {
                Some(cause) => {
                    tracing::warn!("Fetch from {} failed ({}), using demo data", self.client.name(), err);
                    Ok(FetchOutcome::fallback(cause))
                }
                None => {
                    tracing::error!("Fetch from {} failed: {}", self.client.name(), err);
                    Err(err)
                }
            },
        }
    }
}
