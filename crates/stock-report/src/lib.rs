//! Watchlist fundamentals and trend report
//!
//! For every stock in a watchlist this crate scrapes quarterly results from
//! the fundamentals site, looks up the latest price on Yahoo Finance, draws a
//! fundamentals chart and an EMA trend chart, and assembles everything into a
//! single static HTML report.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stock_report::{ReportBuilder, ReportConfig, ScreenerClient, Watchlist, YahooFinanceClient};
//!
//! let config = Arc::new(ReportConfig::builder().with_env().build()?);
//! let builder = ReportBuilder::new(
//!     config.clone(),
//!     ScreenerClient::new(config.clone())?,
//!     YahooFinanceClient::new(config.clone())?,
//! );
//! let summary = builder.run(&Watchlist::builtin()).await?;
//! println!("Report saved to {}", summary.report_path.display());
//! ```

pub mod api;
pub mod charts;
pub mod config;
pub mod error;
pub mod fundamentals;
pub mod indicators;
pub mod report;
pub mod watchlist;

pub use api::{
    FundamentalsSource, MarketDataSource, PriceQuote, ScreenerClient, YahooFinanceClient,
};
pub use charts::{ChartHotspot, ChartKind, ChartRenderer, RenderedChart};
pub use config::{ReportConfig, ReportConfigBuilder};
pub use error::{FundamentalsError, ReportError, Result};
pub use fundamentals::{FundamentalsRecord, RowKind};
pub use indicators::{EmaSeries, PriceHistory, PricePoint, ema};
pub use report::{FundamentalsStatus, ReportBuilder, ReportDocument, RunSummary, TickerOutcome};
pub use watchlist::{TickerEntry, Watchlist};
