//! Clients for the fundamentals site and market data

pub mod screener;
pub mod yahoo;

use async_trait::async_trait;
use std::fmt;

use crate::error::{FundamentalsError, Result};
use crate::fundamentals::FundamentalsRecord;
use crate::indicators::PricePoint;

pub use screener::{ScreenerClient, parse_quarterly_page};
pub use yahoo::YahooFinanceClient;

/// Source of quarterly fundamentals, keyed by company slug
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    async fn quarterly_fundamentals(
        &self,
        slug: &str,
    ) -> std::result::Result<FundamentalsRecord, FundamentalsError>;
}

/// Source of prices, keyed by bare ticker (the client applies the market suffix)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Latest traded price. Never fails; problems become [`PriceQuote::Unavailable`].
    async fn current_price(&self, ticker: &str) -> PriceQuote;

    /// Daily closes over the configured history range
    async fn daily_closes(&self, ticker: &str) -> Result<Vec<PricePoint>>;
}

/// Outcome of a price lookup
#[derive(Debug, Clone, PartialEq)]
pub enum PriceQuote {
    Available(f64),
    Unavailable { cause: String },
}

impl PriceQuote {
    pub fn unavailable(cause: impl Into<String>) -> Self {
        PriceQuote::Unavailable {
            cause: cause.into(),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            PriceQuote::Available(price) => Some(*price),
            PriceQuote::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.value().is_some()
    }
}

/// Renders the price, or `N/A` when unavailable
impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceQuote::Available(price) => write!(f, "{price}"),
            PriceQuote::Unavailable { .. } => f.write_str("N/A"),
        }
    }
}
