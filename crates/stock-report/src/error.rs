//! Error types for report generation

use thiserror::Error;

use crate::fundamentals::RowKind;

/// Reasons a fundamentals page could not be turned into a record
#[derive(Debug, Error)]
pub enum FundamentalsError {
    /// The page request returned a non-success status
    #[error("fundamentals page for {slug} returned HTTP {status}")]
    HttpStatus { slug: String, status: u16 },

    /// The request never produced a response
    #[error("fundamentals request for {slug} failed: {source}")]
    Network {
        slug: String,
        #[source]
        source: reqwest::Error,
    },

    /// The page has no quarterly results section
    #[error("quarterly section not found for {slug}")]
    SectionMissing { slug: String },

    /// One or more of the sales / net profit / EPS rows were not on the page
    #[error("missing data for {slug}: no {} row", join_kinds(.missing))]
    RowsMissing { slug: String, missing: Vec<RowKind> },
}

fn join_kinds(kinds: &[RowKind]) -> String {
    kinds
        .iter()
        .map(|k| k.needle())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stock report errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// Watchlist file could not be read or is malformed
    #[error("Watchlist error in {path}: {reason}")]
    Watchlist { path: String, reason: String },

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fundamentals scraping failed
    #[error(transparent)]
    Fundamentals(#[from] FundamentalsError),

    /// Yahoo Finance lookup failed
    #[error("Market data error for {symbol}: {reason}")]
    MarketData { symbol: String, reason: String },

    /// Moving average calculation error
    #[error("Indicator error: {0}")]
    Indicator(String),

    /// Chart drawing or PNG encoding failed
    #[error("Chart error: {0}")]
    Chart(String),

    /// Report template failed to render
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for ReportError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ReportError::Chart(err.to_string())
    }
}

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;
