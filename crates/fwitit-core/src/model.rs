//! Domain Models
//!
//! Raw market signals as they arrive from the market data service, and the
//! categorical recommendation derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw quantitative data for one tradable instrument
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketSignal {
    /// Ticker symbol (e.g., "AAPL")
    pub symbol: String,

    /// Sentiment score, typically in [-1.0, 1.0] but not clamped by the producer
    pub sentiment_score: f64,

    /// Model confidence in [0.0, 1.0]
    pub confidence: f64,

    /// Last traded price
    pub current_price: f64,

    /// Volatility, expected non-negative
    pub volatility: f64,

    /// Beta relative to the market
    pub beta: f64,
}

impl MarketSignal {
    /// Signal with only a sentiment score; every other field starts at zero
    pub fn new(symbol: impl Into<String>, sentiment_score: f64) -> Self {
        Self {
            symbol: symbol.into(),
            sentiment_score,
            confidence: 0.0,
            current_price: 0.0,
            volatility: 0.0,
            beta: 0.0,
        }
    }

    /// Set the model confidence
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the last traded price
    pub fn with_price(mut self, current_price: f64) -> Self {
        self.current_price = current_price;
        self
    }

    /// Set the volatility and beta used for the risk tier
    pub fn with_risk(mut self, volatility: f64, beta: f64) -> Self {
        self.volatility = volatility;
        self.beta = beta;
        self
    }
}

/// Trade guidance, ordered from most bearish to most bullish
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationLabel {
    StrongSell,
    Sell,
    Hold,
    Buy,
    StrongBuy,
}

impl fmt::Display for RecommendationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrongSell => write!(f, "Strong Sell"),
            Self::Sell => write!(f, "Sell"),
            Self::Hold => write!(f, "Hold"),
            Self::Buy => write!(f, "Buy"),
            Self::StrongBuy => write!(f, "Strong Buy"),
        }
    }
}

/// Sentiment, ordered from most bearish to most bullish
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negative => write!(f, "Negative"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Positive => write!(f, "Positive"),
        }
    }
}

/// Risk tier derived from volatility and beta
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::VeryHigh => write!(f, "Very High"),
        }
    }
}

/// A classified recommendation. Built fresh on every fetch cycle and never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub recommendation_label: RecommendationLabel,
    pub sentiment_label: SentimentLabel,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub price: f64,
}

impl Recommendation {
    /// One-line card text for the swipe UI
    pub fn headline(&self) -> String {
        format!(
            "{}: {} ({} sentiment, {} risk) @ ${:.2}",
            self.symbol, self.recommendation_label, self.sentiment_label, self.risk_level, self.price
        )
    }
}
