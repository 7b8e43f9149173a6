//! Trade Execution Types
//!
//! Orders are user-confirmed actions. The classifier only suggests a side;
//! it never places anything on its own. Positions and the account summary
//! are read-only views of what those orders left behind.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};
use crate::model::RecommendationLabel;

/// Order side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    /// Side suggested by a recommendation. `Hold` suggests nothing.
    pub const fn suggested_for(label: RecommendationLabel) -> Option<Self> {
        match label {
            RecommendationLabel::StrongBuy | RecommendationLabel::Buy => Some(Self::Buy),
            RecommendationLabel::Sell | RecommendationLabel::StrongSell => Some(Self::Sell),
            RecommendationLabel::Hold => None,
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Trim and uppercase a ticker, rejecting an empty one
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(MarketError::InvalidOrder("symbol must not be empty".into()));
    }
    Ok(symbol)
}

/// Body of `POST /api/trade/execute`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: u32,
}

impl TradeRequest {
    /// Build a validated order
    pub fn new(symbol: impl AsRef<str>, action: TradeAction, quantity: u32) -> Result<Self> {
        let request = Self {
            symbol: normalize_symbol(symbol.as_ref())?,
            action,
            quantity,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check an order that arrived already deserialized
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(MarketError::InvalidOrder("symbol must not be empty".into()));
        }
        if self.quantity == 0 {
            return Err(MarketError::InvalidOrder("quantity must be at least 1".into()));
        }
        Ok(())
    }

    /// Approximate order value at `price`. Non-finite prices yield zero.
    pub fn estimated_notional(&self, price: f64) -> Decimal {
        Decimal::from_f64_retain(price)
            .map(|p| (p * Decimal::from(self.quantity)).round_dp(2))
            .unwrap_or(Decimal::ZERO)
    }
}

/// Acknowledgement returned by the execution service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub order_id: String,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: u32,

    /// Service-reported status (e.g., "accepted", "filled")
    pub status: String,

    /// Fill price, when the service reports one
    #[serde(default)]
    pub filled_price: Option<Decimal>,

    pub submitted_at: DateTime<Utc>,
}

impl TradeReceipt {
    pub fn is_accepted(&self) -> bool {
        matches!(self.status.as_str(), "accepted" | "new" | "filled" | "partially_filled")
    }
}

/// Shares held in one symbol
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: u32,
    pub avg_entry_price: Decimal,

    /// Value at the last known price, when the service reports one
    #[serde(default)]
    pub market_value: Option<Decimal>,
}

impl Position {
    pub fn cost_basis(&self) -> Decimal {
        self.avg_entry_price * Decimal::from(self.quantity)
    }

    /// Market value minus cost basis, if a market value is known
    pub fn unrealized_pl(&self) -> Option<Decimal> {
        self.market_value.map(|value| value - self.cost_basis())
    }
}

/// Trading account summary
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub cash: Decimal,
    pub buying_power: Decimal,
    pub portfolio_value: Decimal,

    /// Service-reported status (e.g., "active")
    pub status: String,
}
