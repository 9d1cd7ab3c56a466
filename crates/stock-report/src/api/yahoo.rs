//! Yahoo Finance market data client

use async_trait::async_trait;
use chrono::DateTime;
use std::sync::Arc;
use tracing::debug;
use yahoo_finance_api as yahoo;

use crate::api::{MarketDataSource, PriceQuote};
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::indicators::PricePoint;

/// Yahoo Finance API client
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
    config: Arc<ReportConfig>,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(config: Arc<ReportConfig>) -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| ReportError::Config(format!("Yahoo Finance connector: {e}")))?;

        Ok(Self { connector, config })
    }

    /// Close of the most recent daily quote for a full market symbol
    async fn latest_close(&self, symbol: &str) -> Result<f64> {
        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| market_error(symbol, e))?;

        let quote = response
            .last_quote()
            .map_err(|e| market_error(symbol, e))?;

        Ok(quote.close)
    }
}

fn market_error(symbol: &str, err: impl std::fmt::Display) -> ReportError {
    ReportError::MarketData {
        symbol: symbol.to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn current_price(&self, ticker: &str) -> PriceQuote {
        let symbol = self.config.market_symbol(ticker);

        match self.latest_close(&symbol).await {
            Ok(price) if price.is_finite() => PriceQuote::Available(price),
            Ok(price) => PriceQuote::unavailable(format!("non-finite price {price}")),
            Err(e) => {
                debug!(ticker, error = %e, "Price lookup failed");
                PriceQuote::unavailable(e.to_string())
            }
        }
    }

    async fn daily_closes(&self, ticker: &str) -> Result<Vec<PricePoint>> {
        let symbol = self.config.market_symbol(ticker);

        let response = self
            .connector
            .get_quote_range(&symbol, "1d", &self.config.history_range)
            .await
            .map_err(|e| market_error(&symbol, e))?;

        let quotes = response.quotes().map_err(|e| market_error(&symbol, e))?;

        Ok(quotes
            .iter()
            .filter(|q| q.close.is_finite())
            .filter_map(|q| {
                DateTime::from_timestamp(q.timestamp as i64, 0).map(|ts| PricePoint {
                    date: ts.date_naive(),
                    close: q.close,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> YahooFinanceClient {
        YahooFinanceClient::new(Arc::new(ReportConfig::default())).unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_current_price() {
        let quote = client().current_price("TCS").await;
        assert!(quote.value().is_some_and(|p| p > 0.0));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_daily_closes() {
        let closes = client().daily_closes("INFY").await.unwrap();
        assert!(closes.len() > 200);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_unknown_symbol_is_unavailable() {
        let quote = client().current_price("INVALID_SYMBOL_12345").await;
        assert!(matches!(quote, PriceQuote::Unavailable { .. }));
    }
}
