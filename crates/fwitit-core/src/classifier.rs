//! Recommendation Classifier
//!
//! Pure threshold tables mapping a [`MarketSignal`] to categorical labels.
//!
//! Every comparison is a strict `>`, so a value sitting exactly on a
//! breakpoint lands in the lower tier. A NaN input fails every comparison
//! and falls through to the last row of each table (`StrongSell`,
//! `Negative`, `Low`).
//!
//! The recommendation and sentiment tables use different breakpoints on
//! purpose and are kept as separate functions.

use crate::model::{MarketSignal, Recommendation, RecommendationLabel, RiskLevel, SentimentLabel};

/// Weight of volatility in the risk score
pub const VOLATILITY_WEIGHT: f64 = 0.7;

/// Weight of beta in the risk score
pub const BETA_WEIGHT: f64 = 0.3;

/// Map a sentiment score to trade guidance
pub fn derive_recommendation_label(sentiment_score: f64) -> RecommendationLabel {
    if sentiment_score > 0.6 {
        RecommendationLabel::StrongBuy
    } else if sentiment_score > 0.2 {
        RecommendationLabel::Buy
    } else if sentiment_score > -0.2 {
        RecommendationLabel::Hold
    } else if sentiment_score > -0.6 {
        RecommendationLabel::Sell
    } else {
        RecommendationLabel::StrongSell
    }
}

/// Map a sentiment score to a sentiment label
pub fn derive_sentiment_label(sentiment_score: f64) -> SentimentLabel {
    if sentiment_score > 0.3 {
        SentimentLabel::Positive
    } else if sentiment_score > -0.3 {
        SentimentLabel::Neutral
    } else {
        SentimentLabel::Negative
    }
}

/// Weighted risk score. Inputs are not clamped.
pub fn risk_score(volatility: f64, beta: f64) -> f64 {
    volatility * VOLATILITY_WEIGHT + beta * BETA_WEIGHT
}

/// Map volatility and beta to a risk tier
pub fn derive_risk_level(volatility: f64, beta: f64) -> RiskLevel {
    let score = risk_score(volatility, beta);

    if score > 1.5 {
        RiskLevel::VeryHigh
    } else if score > 1.0 {
        RiskLevel::High
    } else if score > 0.5 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Classify a signal into a recommendation
pub fn classify(signal: &MarketSignal) -> Recommendation {
    Recommendation {
        symbol: signal.symbol.clone(),
        recommendation_label: derive_recommendation_label(signal.sentiment_score),
        sentiment_label: derive_sentiment_label(signal.sentiment_score),
        risk_level: derive_risk_level(signal.volatility, signal.beta),
        confidence: signal.confidence,
        price: signal.current_price,
    }
}
