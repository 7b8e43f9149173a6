//! # fwitit-core
//!
//! Recommendation logic behind the FwitIt swipe app.
//!
//! ```text
//! ┌──────────────┐  MarketSignal  ┌────────────┐  Recommendation  ┌───────────┐
//! │ Market data  │───────────────▶│ Classifier │─────────────────▶│   Store   │
//! │ (HTTP/demo)  │                │   (pure)   │                  │  (watch)  │
//! └──────────────┘                └────────────┘                  └───────────┘
//!        ▲                                                              │
//!        └────────────── TradeRequest (user confirmed) ◀───── UI ◀──────┘
//! ```
//!
//! - [`classifier`] maps sentiment, volatility and beta to labels. It has no
//!   state and cannot fail.
//! - [`market`] holds the live HTTP client and the offline demo deck.
//! - [`fetcher`] runs a fetch cycle and records whether the result is live
//!   or a demo fallback, and why.
//! - [`state`] models the provider as `Idle → Loading → Ready | Failed`.

pub mod classifier;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod market;
pub mod model;
pub mod state;
pub mod trade;

pub use classifier::{classify, derive_recommendation_label, derive_risk_level, derive_sentiment_label, risk_score};
pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use fetcher::{FallbackCause, FallbackPolicy, FetchMode, FetchOutcome, RecommendationFetcher};
pub use market::{DemoMarketClient, HttpMarketClient, MarketClients, MarketDataClient, TradeExecutor};
pub use model::{MarketSignal, Recommendation, RecommendationLabel, RiskLevel, SentimentLabel};
pub use state::{RecommendationState, RecommendationStore, RefreshStatus};
pub use trade::{Account, Position, TradeAction, TradeReceipt, TradeRequest};
