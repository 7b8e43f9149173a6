//! Market data configuration

use std::time::Duration;

use crate::error::{MarketError, Result};
use crate::fetcher::FallbackPolicy;

/// Market data service configuration
#[derive(Clone, Debug)]
pub struct MarketConfig {
    /// Base URL of the market data service. `None` selects demo data.
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// What to do when a fetch fails
    pub fallback: FallbackPolicy,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
            fallback: FallbackPolicy::default(),
        }
    }
}

impl MarketConfig {
    /// Read `FWITIT_API_URL`, `FWITIT_TIMEOUT_SECS` and `FWITIT_FALLBACK`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("FWITIT_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let timeout_secs = match lookup("FWITIT_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| MarketError::Config(format!("FWITIT_TIMEOUT_SECS is not a number: {raw}")))?,
            None => 10,
        };

        let fallback = match lookup("FWITIT_FALLBACK") {
            Some(raw) => raw.parse()?,
            None => FallbackPolicy::default(),
        };

        Ok(Self {
            base_url,
            timeout_secs,
            fallback,
        })
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
