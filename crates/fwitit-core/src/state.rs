//! Provider State
//!
//! The recommendation provider as an explicit state value:
//!
//! ```text
//! Idle ──begin_fetch──▶ Loading ──resolve──▶ Ready(outcome)
//!                          ▲                  Failed(error)
//!                          └──begin_fetch─────────┘
//! ```
//!
//! Transitions never mutate a state in place; they return the next one. A
//! fetch that is abandoned mid-flight (`cancel_fetch`) leaves `Loading` for
//! the last outcome it carried, or `Idle`.
//! [`RecommendationStore`] publishes states over a `watch` channel so any
//! number of views can follow along.

use tokio::sync::watch;

use crate::error::{MarketError, Result};
use crate::fetcher::{FetchMode, FetchOutcome, RecommendationFetcher};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RecommendationState {
    #[default]
    Idle,

    /// A fetch is in flight. `previous` is the last successful outcome, if any.
    Loading { previous: Option<FetchOutcome> },

    Ready(FetchOutcome),

    Failed {
        error: MarketError,
        previous: Option<FetchOutcome>,
    },
}

impl RecommendationState {
    /// Enter `Loading`. Returns `None` when a fetch is already in flight.
    pub fn begin_fetch(&self) -> Option<Self> {
        match self {
            Self::Loading { .. } => None,
            other => Some(Self::Loading {
                previous: other.last_outcome().cloned(),
            }),
        }
    }

    /// Leave `Loading` with the fetch result. Any other state is returned
    /// unchanged, since there is no fetch to resolve.
    pub fn resolve(&self, result: Result<FetchOutcome>) -> Self {
        match self {
            Self::Loading { previous } => match result {
                Ok(outcome) => Self::Ready(outcome),
                Err(error) => Self::Failed {
                    error,
                    previous: previous.clone(),
                },
            },
            other => {
                tracing::debug!("Ignoring fetch result outside of Loading");
                other.clone()
            }
        }
    }

    /// Abandon an in-flight fetch. `Loading` falls back to the last outcome
    /// it was carrying, or to `Idle` when there was none.
    pub fn cancel_fetch(&self) -> Self {
        match self {
            Self::Loading { previous: Some(outcome) } => Self::Ready(outcome.clone()),
            Self::Loading { previous: None } => Self::Idle,
            other => other.clone(),
        }
    }

    /// Most recent outcome still worth showing
    pub const fn last_outcome(&self) -> Option<&FetchOutcome> {
        match self {
            Self::Idle => None,
            Self::Ready(outcome) => Some(outcome),
            Self::Loading { previous } | Self::Failed { previous, .. } => previous.as_ref(),
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Ready(_) => "ready",
            Self::Failed { .. } => "failed",
        }
    }
}

/// How a call to [`RecommendationStore::refresh`] ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshStatus {
    Live,
    Fallback,
    Failed,

    /// Another refresh was already in flight; nothing was fetched
    AlreadyLoading,
}

/// Puts the store back out of `Loading` if a refresh future is dropped
/// before its fetch resolves
struct InFlight<'a> {
    tx: &'a watch::Sender<RecommendationState>,
    resolved: bool,
}

impl InFlight<'_> {
    fn resolve(mut self, result: Result<FetchOutcome>) {
        self.resolved = true;
        self.tx.send_modify(|state| *state = state.resolve(result));
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            tracing::warn!("Refresh dropped before the fetch finished, leaving Loading");
            self.tx.send_modify(|state| *state = state.cancel_fetch());
        }
    }
}

/// Message-passing store for the provider state
pub struct RecommendationStore {
    tx: watch::Sender<RecommendationState>,
}

impl Default for RecommendationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RecommendationState::Idle);
        Self { tx }
    }

    /// Current state
    pub fn snapshot(&self) -> RecommendationState {
        self.tx.borrow().clone()
    }

    /// Follow state changes
    pub fn subscribe(&self) -> watch::Receiver<RecommendationState> {
        self.tx.subscribe()
    }

    /// Run one fetch cycle unless one is already in flight
    pub async fn refresh(&self, fetcher: &RecommendationFetcher) -> RefreshStatus {
        let started = self.tx.send_if_modified(|state| match state.begin_fetch() {
            Some(next) => {
                *state = next;
                true
            }
            None => false,
        });

        if !started {
            tracing::debug!("Refresh skipped, fetch already in flight");
            return RefreshStatus::AlreadyLoading;
        }

        let in_flight = InFlight {
            tx: &self.tx,
            resolved: false,
        };

        let result = fetcher.fetch().await;
        let status = match &result {
            Ok(outcome) if outcome.mode() == FetchMode::Live => RefreshStatus::Live,
            Ok(_) => RefreshStatus::Fallback,
            Err(_) => RefreshStatus::Failed,
        };

        in_flight.resolve(result);
        status
    }
}
