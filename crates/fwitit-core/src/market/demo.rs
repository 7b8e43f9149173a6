//! Demo Market Client
//!
//! Offline data source for the prototype. Serves a fixed deck of signals,
//! fills orders at the deck price against a paper account, and can simulate
//! an outage for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MarketDataClient, TradeExecutor};
use crate::error::{MarketError, Result};
use crate::model::MarketSignal;
use crate::trade::{Account, Position, TradeAction, TradeReceipt, TradeRequest, normalize_symbol};

const DEMO_ACCOUNT_ID: &str = "demo";
const STARTING_CASH: u32 = 100_000;

/// The signal shown when the live service cannot be used
pub fn demo_signal() -> MarketSignal {
    MarketSignal::new("AAPL", 0.85)
        .with_confidence(0.85)
        .with_price(150.25)
        .with_risk(1.0, 1.2)
}

/// (symbol, sentiment, confidence, price, volatility, beta)
const DECK: &[(&str, f64, f64, f64, f64, f64)] = &[
    ("AAPL", 0.85, 0.85, 150.25, 1.0, 1.2),
    ("TSLA", 0.35, 0.62, 242.10, 2.1, 2.0),
    ("MSFT", 0.10, 0.74, 410.50, 0.6, 0.9),
    ("NFLX", -0.40, 0.58, 612.80, 1.3, 1.1),
    ("INTC", -0.72, 0.66, 21.40, 0.9, 1.0),
    ("KO", 0.05, 0.80, 62.30, 0.3, 0.6),
];

/// Cash and holdings built up from demo fills
#[derive(Debug)]
struct PaperBook {
    cash: Decimal,
    positions: HashMap<String, Position>,
}

impl PaperBook {
    fn new() -> Self {
        Self {
            cash: Decimal::from(STARTING_CASH),
            positions: HashMap::new(),
        }
    }

    /// Apply a fill, rejecting buys beyond cash and sells beyond holdings
    fn apply(&mut self, request: &TradeRequest, price: Decimal) -> Result<()> {
        let quantity = Decimal::from(request.quantity);
        let notional = price * quantity;

        match request.action {
            TradeAction::Buy => {
                if notional > self.cash {
                    return Err(MarketError::InvalidOrder(format!(
                        "insufficient buying power: need {notional}, have {}",
                        self.cash
                    )));
                }
                self.cash -= notional;

                let position = self
                    .positions
                    .entry(request.symbol.clone())
                    .or_insert_with(|| Position {
                        symbol: request.symbol.clone(),
                        quantity: 0,
                        avg_entry_price: Decimal::ZERO,
                        market_value: None,
                    });
                let total = position.quantity + request.quantity;
                position.avg_entry_price =
                    ((position.cost_basis() + notional) / Decimal::from(total)).round_dp(4);
                position.quantity = total;
            }
            TradeAction::Sell => {
                let held = self.positions.get(&request.symbol).map_or(0, |p| p.quantity);
                if request.quantity > held {
                    return Err(MarketError::InvalidOrder(format!(
                        "cannot sell {} {}, holding {held}",
                        request.quantity, request.symbol
                    )));
                }
                self.cash += notional;

                if request.quantity == held {
                    self.positions.remove(&request.symbol);
                } else if let Some(position) = self.positions.get_mut(&request.symbol) {
                    position.quantity -= request.quantity;
                }
            }
        }
        Ok(())
    }
}

/// Demo client cycling through a static deck
pub struct DemoMarketClient {
    cursor: AtomicUsize,
    book: RwLock<PaperBook>,

    /// When set, every call fails with this error
    outage: Option<MarketError>,
}

impl Default for DemoMarketClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoMarketClient {
    pub fn new() -> Self {
        Self {
            cursor: AtomicUsize::new(0),
            book: RwLock::new(PaperBook::new()),
            outage: None,
        }
    }

    /// Create a client that fails every request with `error`
    pub fn with_outage(error: MarketError) -> Self {
        Self {
            outage: Some(error),
            ..Self::new()
        }
    }

    fn check_outage(&self) -> Result<()> {
        match &self.outage {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn deck_signal(index: usize) -> MarketSignal {
        let (symbol, sentiment, confidence, price, volatility, beta) = DECK[index % DECK.len()];
        MarketSignal::new(symbol, sentiment)
            .with_confidence(confidence)
            .with_price(price)
            .with_risk(volatility, beta)
    }

    fn deck_price(symbol: &str) -> Option<Decimal> {
        DECK.iter()
            .find(|(s, ..)| s.eq_ignore_ascii_case(symbol))
            .and_then(|&(_, _, _, price, _, _)| Decimal::from_f64_retain(price))
            .map(|p| p.round_dp(2))
    }

    /// Position marked at the deck price
    fn marked(position: &Position) -> Position {
        Position {
            market_value: Self::deck_price(&position.symbol).map(|p| p * Decimal::from(position.quantity)),
            ..position.clone()
        }
    }
}

#[async_trait]
impl MarketDataClient for DemoMarketClient {
    async fn fetch_signal(&self) -> Result<MarketSignal> {
        self.check_outage()?;
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        Ok(Self::deck_signal(index))
    }

    async fn health_check(&self) -> bool {
        self.outage.is_none()
    }

    fn name(&self) -> &str {
        "DemoMarket"
    }
}

#[async_trait]
impl TradeExecutor for DemoMarketClient {
    async fn execute_trade(&self, request: &TradeRequest) -> Result<TradeReceipt> {
        self.check_outage()?;
        request.validate()?;

        let filled_price = Self::deck_price(&request.symbol);
        if let Some(price) = filled_price {
            self.book.write().await.apply(request, price)?;
        }

        Ok(TradeReceipt {
            order_id: Uuid::new_v4().to_string(),
            symbol: request.symbol.clone(),
            action: request.action,
            quantity: request.quantity,
            status: if filled_price.is_some() { "filled" } else { "accepted" }.into(),
            filled_price,
            submitted_at: Utc::now(),
        })
    }

    async fn get_position(&self, symbol: &str) -> Result<Option<Position>> {
        self.check_outage()?;
        let symbol = normalize_symbol(symbol)?;
        let book = self.book.read().await;
        Ok(book.positions.get(&symbol).map(Self::marked))
    }

    async fn get_account(&self) -> Result<Account> {
        self.check_outage()?;
        let book = self.book.read().await;

        let holdings: Decimal = book
            .positions
            .values()
            .map(|p| Self::marked(p).market_value.unwrap_or_else(|| p.cost_basis()))
            .sum();

        Ok(Account {
            account_id: DEMO_ACCOUNT_ID.into(),
            cash: book.cash,
            buying_power: book.cash,
            portfolio_value: book.cash + holdings,
            status: "active".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_deck_starts_with_demo_signal() {
        let client = DemoMarketClient::new();
        let first = client.fetch_signal().await.unwrap();
        assert_eq!(first, demo_signal());
    }

    #[tokio::test]
    async fn test_deck_cycles() {
        let client = DemoMarketClient::new();
        let mut symbols = Vec::new();
        for _ in 0..=DECK.len() {
            symbols.push(client.fetch_signal().await.unwrap().symbol);
        }
        assert_eq!(symbols[1], "TSLA");
        assert_eq!(symbols[DECK.len()], "AAPL");
    }

    #[tokio::test]
    async fn test_outage() {
        let client = DemoMarketClient::with_outage(MarketError::Unreachable("airplane mode".into()));
        assert!(!client.health_check().await);
        assert!(client.fetch_signal().await.unwrap_err().is_connectivity());

        let order = TradeRequest::new("AAPL", TradeAction::Buy, 1).unwrap();
        assert!(client.execute_trade(&order).await.is_err());
    }

    #[tokio::test]
    async fn test_demo_fill() {
        let client = DemoMarketClient::new();
        let order = TradeRequest::new("msft", TradeAction::Buy, 3).unwrap();

        let receipt = client.execute_trade(&order).await.unwrap();
        assert_eq!(receipt.symbol, "MSFT");
        assert_eq!(receipt.quantity, 3);
        assert_eq!(receipt.filled_price, Some(dec!(410.50)));
        assert!(receipt.is_accepted());
        assert!(!receipt.order_id.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_symbol_accepted_without_fill() {
        let client = DemoMarketClient::new();
        let order = TradeRequest::new("ZZZZ", TradeAction::Buy, 2).unwrap();

        let receipt = client.execute_trade(&order).await.unwrap();
        assert_eq!(receipt.status, "accepted");
        assert!(receipt.filled_price.is_none());
        assert!(client.get_position("ZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fresh_account() {
        let client = DemoMarketClient::new();
        let account = client.get_account().await.unwrap();
        assert_eq!(account.cash, dec!(100000));
        assert_eq!(account.portfolio_value, dec!(100000));
        assert!(client.get_position("AAPL").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fills_build_position() {
        let client = DemoMarketClient::new();
        let buy = |qty| TradeRequest::new("AAPL", TradeAction::Buy, qty).unwrap();
        client.execute_trade(&buy(10)).await.unwrap();
        client.execute_trade(&buy(6)).await.unwrap();

        let position = client.get_position("aapl").await.unwrap().unwrap();
        assert_eq!(position.quantity, 16);
        assert_eq!(position.avg_entry_price, dec!(150.25));
        assert_eq!(position.market_value, Some(dec!(2404.00)));

        let account = client.get_account().await.unwrap();
        assert_eq!(account.cash, dec!(97596.00));
        assert_eq!(account.portfolio_value, dec!(100000.00));
    }

    #[tokio::test]
    async fn test_sell_reduces_then_closes_position() {
        let client = DemoMarketClient::new();
        client
            .execute_trade(&TradeRequest::new("KO", TradeAction::Buy, 5).unwrap())
            .await
            .unwrap();

        client
            .execute_trade(&TradeRequest::new("KO", TradeAction::Sell, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(client.get_position("KO").await.unwrap().unwrap().quantity, 3);

        client
            .execute_trade(&TradeRequest::new("KO", TradeAction::Sell, 3).unwrap())
            .await
            .unwrap();
        assert!(client.get_position("KO").await.unwrap().is_none());
        assert_eq!(client.get_account().await.unwrap().cash, dec!(100000.00));
    }

    #[tokio::test]
    async fn test_oversell_and_overspend_rejected() {
        let client = DemoMarketClient::new();

        let err = client
            .execute_trade(&TradeRequest::new("TSLA", TradeAction::Sell, 1).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidOrder(_)), "{err:?}");

        let err = client
            .execute_trade(&TradeRequest::new("NFLX", TradeAction::Buy, 1000).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidOrder(_)), "{err:?}");

        // rejected orders leave the book untouched
        assert_eq!(client.get_account().await.unwrap().cash, dec!(100000));
        assert!(client.get_position("NFLX").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookups_fail_during_outage() {
        let client = DemoMarketClient::with_outage(MarketError::Unreachable("airplane mode".into()));
        assert!(client.get_position("AAPL").await.unwrap_err().is_connectivity());
        assert!(client.get_account().await.unwrap_err().is_connectivity());
    }
}
