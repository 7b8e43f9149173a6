//! HTTP Market Client
//!
//! Talks to the FwitIt market data service over JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};

use super::{MarketDataClient, TradeExecutor};
use crate::error::{MarketError, Result};
use crate::model::MarketSignal;
use crate::trade::{Account, Position, TradeReceipt, TradeRequest, normalize_symbol};

const RECOMMENDATION_PATH: &str = "/api/stocks/recommendation";
const TRADE_PATH: &str = "/api/trade/execute";
const POSITIONS_PATH: &str = "/api/trade/positions";
const ACCOUNT_PATH: &str = "/api/trade/account";
const HEALTH_PATH: &str = "/health";

/// Live client for the market data service
pub struct HttpMarketClient {
    client: Client,
    base_url: String,
}

impl HttpMarketClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| MarketError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success status into [`MarketError::Status`], keeping the body
    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(MarketError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl MarketDataClient for HttpMarketClient {
    async fn fetch_signal(&self) -> Result<MarketSignal> {
        let url = self.url(RECOMMENDATION_PATH);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let response = Self::ensure_success(response).await?;

        let bytes = response.bytes().await?;
        let signal: MarketSignal = serde_json::from_slice(&bytes)?;

        if signal.symbol.trim().is_empty() {
            return Err(MarketError::Decode("signal has an empty symbol".into()));
        }

        Ok(signal)
    }

    async fn health_check(&self) -> bool {
        match self.client.get(self.url(HEALTH_PATH)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("Market service health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "HttpMarket"
    }
}

#[async_trait]
impl TradeExecutor for HttpMarketClient {
    async fn execute_trade(&self, request: &TradeRequest) -> Result<TradeReceipt> {
        request.validate()?;

        let url = self.url(TRADE_PATH);
        tracing::info!(
            "Submitting order: {} {} x{}",
            request.action,
            request.symbol,
            request.quantity
        );

        let response = self.client.post(&url).json(request).send().await?;
        let response = Self::ensure_success(response).await?;

        let bytes = response.bytes().await?;
        let receipt: TradeReceipt = serde_json::from_slice(&bytes)?;

        tracing::info!("Order {} {}", receipt.order_id, receipt.status);
        Ok(receipt)
    }

    async fn get_position(&self, symbol: &str) -> Result<Option<Position>> {
        let symbol = normalize_symbol(symbol)?;
        let url = format!("{}/{}", self.url(POSITIONS_PATH), symbol);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        // No open position is a 404, not a failure
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("No position in {}", symbol);
            return Ok(None);
        }

        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn get_account(&self) -> Result<Account> {
        let url = self.url(ACCOUNT_PATH);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let response = Self::ensure_success(response).await?;

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::TradeAction;
    use axum::{
        Json, Router,
        extract::Path,
        routing::{get, post},
    };
    use chrono::Utc;
    use rust_decimal_macros::dec;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// An address nothing is listening on
    async fn dead_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn client(url: &str) -> HttpMarketClient {
        HttpMarketClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_signal() {
        let app = Router::new().route(
            RECOMMENDATION_PATH,
            get(|| async {
                Json(serde_json::json!({
                    "symbol": "AAPL",
                    "sentiment_score": 0.85,
                    "confidence": 0.85,
                    "current_price": 150.25,
                    "volatility": 1.0,
                    "beta": 1.2
                }))
            }),
        );
        let url = serve(app).await;

        let signal = client(&url).fetch_signal().await.unwrap();
        assert_eq!(signal.symbol, "AAPL");
        assert_eq!(signal.sentiment_score, 0.85);
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let app = Router::new().route(
            RECOMMENDATION_PATH,
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model offline") }),
        );
        let url = serve(app).await;

        let err = client(&url).fetch_signal().await.unwrap_err();
        assert_eq!(
            err,
            MarketError::Status {
                status: 500,
                body: "model offline".into()
            }
        );
        assert!(!err.is_connectivity());
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let url = dead_url().await;

        let client = client(&url);
        let err = client.fetch_signal().await.unwrap_err();
        assert!(err.is_connectivity(), "{err:?}");
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode() {
        let app = Router::new().route(
            RECOMMENDATION_PATH,
            get(|| async { Json(serde_json::json!({"symbol": "AAPL"})) }),
        );
        let url = serve(app).await;

        let err = client(&url).fetch_signal().await.unwrap_err();
        assert!(matches!(err, MarketError::Decode(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_empty_symbol_is_decode() {
        let app = Router::new().route(
            RECOMMENDATION_PATH,
            get(|| async {
                Json(serde_json::json!({
                    "symbol": "",
                    "sentiment_score": 0.1,
                    "confidence": 0.5,
                    "current_price": 1.0,
                    "volatility": 0.1,
                    "beta": 0.1
                }))
            }),
        );
        let url = serve(app).await;

        let err = client(&url).fetch_signal().await.unwrap_err();
        assert!(matches!(err, MarketError::Decode(_)));
    }

    #[tokio::test]
    async fn test_execute_trade_posts_body() {
        let app = Router::new().route(
            TRADE_PATH,
            post(|Json(req): Json<TradeRequest>| async move {
                Json(TradeReceipt {
                    order_id: "ord-1".into(),
                    symbol: req.symbol,
                    action: req.action,
                    quantity: req.quantity,
                    status: "accepted".into(),
                    filled_price: None,
                    submitted_at: Utc::now(),
                })
            }),
        );
        let url = serve(app).await;

        let order = TradeRequest::new("AAPL", TradeAction::Buy, 4).unwrap();
        let receipt = client(&url).execute_trade(&order).await.unwrap();
        assert_eq!(receipt.order_id, "ord-1");
        assert_eq!(receipt.symbol, "AAPL");
        assert_eq!(receipt.quantity, 4);
        assert!(receipt.is_accepted());
    }

    #[tokio::test]
    async fn test_execute_trade_rejected() {
        let app = Router::new().route(
            TRADE_PATH,
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "insufficient buying power") }),
        );
        let url = serve(app).await;

        let order = TradeRequest::new("AAPL", TradeAction::Buy, 1000).unwrap();
        let err = client(&url).execute_trade(&order).await.unwrap_err();
        assert!(matches!(err, MarketError::Status { status: 422, .. }));
    }

    #[tokio::test]
    async fn test_get_position() {
        let app = Router::new().route(
            "/api/trade/positions/{symbol}",
            get(|Path(symbol): Path<String>| async move {
                if symbol != "AAPL" {
                    return Err((StatusCode::NOT_FOUND, "position does not exist"));
                }
                Ok(Json(serde_json::json!({
                    "symbol": symbol,
                    "quantity": 10,
                    "avg_entry_price": "148.00",
                    "market_value": "1502.50"
                })))
            }),
        );
        let url = serve(app).await;
        let client = client(&url);

        let position = client.get_position(" aapl").await.unwrap().unwrap();
        assert_eq!(position.quantity, 10);
        assert_eq!(position.avg_entry_price, dec!(148.00));
        assert_eq!(position.unrealized_pl(), Some(dec!(22.50)));

        assert_eq!(client.get_position("TSLA").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_position_server_error_surfaces() {
        let app = Router::new().route(
            "/api/trade/positions/{symbol}",
            get(|| async { (StatusCode::BAD_GATEWAY, "broker down") }),
        );
        let url = serve(app).await;

        let err = client(&url).get_position("AAPL").await.unwrap_err();
        assert!(matches!(err, MarketError::Status { status: 502, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_get_position_empty_symbol() {
        let err = client(&dead_url().await).get_position(" ").await.unwrap_err();
        assert!(matches!(err, MarketError::InvalidOrder(_)));
    }

    #[tokio::test]
    async fn test_get_account() {
        let app = Router::new().route(
            ACCOUNT_PATH,
            get(|| async {
                Json(serde_json::json!({
                    "account_id": "PA123",
                    "cash": "2500.00",
                    "buying_power": "5000.00",
                    "portfolio_value": "12500.00",
                    "status": "active"
                }))
            }),
        );
        let url = serve(app).await;

        let account = client(&url).get_account().await.unwrap();
        assert_eq!(account.account_id, "PA123");
        assert_eq!(account.buying_power, dec!(5000.00));
        assert_eq!(account.portfolio_value, dec!(12500.00));
    }

    #[tokio::test]
    async fn test_get_account_missing_is_error() {
        // unlike positions, a 404 here means the service is misrouted
        let app = Router::new();
        let url = serve(app).await;

        let err = client(&url).get_account().await.unwrap_err();
        assert!(matches!(err, MarketError::Status { status: 404, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = Router::new().route(HEALTH_PATH, get(|| async { "ok" }));
        let url = serve(app).await;
        assert!(client(&url).health_check().await);
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = client("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url(RECOMMENDATION_PATH), "http://localhost:8080/api/stocks/recommendation");
    }
}
