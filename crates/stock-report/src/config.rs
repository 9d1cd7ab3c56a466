//! Configuration for report generation

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default fundamentals site
pub const DEFAULT_FUNDAMENTALS_URL: &str = "https://www.screener.in";

/// EMA spans drawn on the trend chart
pub const DEFAULT_EMA_SPANS: [usize; 5] = [9, 20, 50, 100, 200];

/// Configuration for a report run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Base URL of the fundamentals site (no trailing slash)
    pub fundamentals_base_url: String,

    /// User-Agent sent with fundamentals requests
    pub user_agent: String,

    /// Request timeout for fundamentals pages
    pub request_timeout: Duration,

    /// Suffix appended to tickers for market data lookups
    pub market_suffix: String,

    /// Yahoo range for the trend chart history
    pub history_range: String,

    /// EMA spans for the trend chart
    pub ema_spans: Vec<usize>,

    /// Directory receiving charts and the report
    pub output_dir: PathBuf,

    /// CSV file with `slug` and `ticker` columns
    pub watchlist_path: PathBuf,

    /// Chart width in pixels
    pub chart_width: u32,

    /// Chart height in pixels
    pub chart_height: u32,

    /// Currency symbol shown before prices
    pub currency_symbol: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            fundamentals_base_url: DEFAULT_FUNDAMENTALS_URL.to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            request_timeout: Duration::from_secs(30),
            market_suffix: ".NS".to_string(),
            history_range: "1y".to_string(),
            ema_spans: DEFAULT_EMA_SPANS.to_vec(),
            output_dir: PathBuf::from("output"),
            watchlist_path: PathBuf::from("stocks.csv"),
            chart_width: 1200,
            chart_height: 600,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.fundamentals_base_url.trim().is_empty() {
            return Err(ReportError::Config(
                "fundamentals_base_url must not be empty".to_string(),
            ));
        }

        if self.ema_spans.is_empty() {
            return Err(ReportError::Config(
                "at least one EMA span is required".to_string(),
            ));
        }

        if self.ema_spans.contains(&0) {
            return Err(ReportError::Config(
                "EMA spans must be greater than 0".to_string(),
            ));
        }

        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(ReportError::Config(
                "chart dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Market data symbol for a ticker, e.g. `TCS` -> `TCS.NS`
    pub fn market_symbol(&self, ticker: &str) -> String {
        format!("{}{}", ticker, self.market_suffix)
    }

    /// Fundamentals page URL for a company slug
    pub fn fundamentals_url(&self, slug: &str) -> String {
        format!(
            "{}/company/{}/consolidated/",
            self.fundamentals_base_url.trim_end_matches('/'),
            slug
        )
    }

    /// Path of the finished HTML report
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join("report.html")
    }
}

/// Builder for ReportConfig
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    fundamentals_base_url: Option<String>,
    user_agent: Option<String>,
    request_timeout: Option<Duration>,
    market_suffix: Option<String>,
    history_range: Option<String>,
    ema_spans: Option<Vec<usize>>,
    output_dir: Option<PathBuf>,
    watchlist_path: Option<PathBuf>,
    chart_size: Option<(u32, u32)>,
    currency_symbol: Option<String>,
}

impl ReportConfigBuilder {
    /// Set the fundamentals site base URL
    pub fn fundamentals_base_url(mut self, url: impl Into<String>) -> Self {
        self.fundamentals_base_url = Some(url.into());
        self
    }

    /// Set the User-Agent for fundamentals requests
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the market suffix appended to tickers
    pub fn market_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.market_suffix = Some(suffix.into());
        self
    }

    /// Set the history range used for the trend chart
    pub fn history_range(mut self, range: impl Into<String>) -> Self {
        self.history_range = Some(range.into());
        self
    }

    /// Set the EMA spans
    pub fn ema_spans(mut self, spans: Vec<usize>) -> Self {
        self.ema_spans = Some(spans);
        self
    }

    /// Set the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the watchlist CSV path
    pub fn watchlist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.watchlist_path = Some(path.into());
        self
    }

    /// Set chart width and height in pixels
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = Some((width, height));
        self
    }

    /// Set the currency symbol shown in headings
    pub fn currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = Some(symbol.into());
        self
    }

    /// Load overrides from `STOCK_REPORT_*` environment variables
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("STOCK_REPORT_FUNDAMENTALS_URL") {
            self.fundamentals_base_url = Some(url);
        }
        if let Ok(suffix) = std::env::var("STOCK_REPORT_MARKET_SUFFIX") {
            self.market_suffix = Some(suffix);
        }
        if let Ok(dir) = std::env::var("STOCK_REPORT_OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Ok(path) = std::env::var("STOCK_REPORT_WATCHLIST") {
            self.watchlist_path = Some(PathBuf::from(path));
        }
        if let Ok(agent) = std::env::var("STOCK_REPORT_USER_AGENT") {
            self.user_agent = Some(agent);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ReportConfig> {
        let defaults = ReportConfig::default();
        let (chart_width, chart_height) = self
            .chart_size
            .unwrap_or((defaults.chart_width, defaults.chart_height));

        let config = ReportConfig {
            fundamentals_base_url: self
                .fundamentals_base_url
                .unwrap_or(defaults.fundamentals_base_url),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            market_suffix: self.market_suffix.unwrap_or(defaults.market_suffix),
            history_range: self.history_range.unwrap_or(defaults.history_range),
            ema_spans: self.ema_spans.unwrap_or(defaults.ema_spans),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            watchlist_path: self.watchlist_path.unwrap_or(defaults.watchlist_path),
            chart_width,
            chart_height,
            currency_symbol: self.currency_symbol.unwrap_or(defaults.currency_symbol),
        };

        config.validate()?;
        Ok(config)
    }
}
