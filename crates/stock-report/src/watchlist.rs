//! Watchlist loading

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One tracked stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerEntry {
    /// Company identifier on the fundamentals site
    pub slug: String,
    /// Market ticker symbol, without exchange suffix
    pub ticker: String,
}

impl TickerEntry {
    pub fn new(slug: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ticker: ticker.into(),
        }
    }
}

/// Ordered list of stocks to report on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watchlist {
    entries: Vec<TickerEntry>,
}

impl Watchlist {
    pub fn new(entries: Vec<TickerEntry>) -> Self {
        Self { entries }
    }

    /// The hardcoded three-stock list used before watchlists were read from a file
    pub fn builtin() -> Self {
        Self::new(vec![
            TickerEntry::new("tcs", "TCS"),
            TickerEntry::new("reliance", "RELIANCE"),
            TickerEntry::new("infy", "INFY"),
        ])
    }

    /// Load a CSV watchlist with `slug` and `ticker` header columns
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| ReportError::Watchlist {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_reader(file).map_err(|e| match e {
            ReportError::Csv(err) => ReportError::Watchlist {
                path: path.display().to_string(),
                reason: err.to_string(),
            },
            other => other,
        })
    }

    /// Parse CSV watchlist content. Extra columns are ignored.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let entries = csv_reader
            .deserialize::<TickerEntry>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[TickerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Watchlist {
    type Item = &'a TickerEntry;
    type IntoIter = std::slice::Iter<'a, TickerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_reader_keeps_order() {
        let data = "slug,ticker\ntcs,TCS\nhdfc-bank,HDFCBANK\n";
        let watchlist = Watchlist::from_reader(data.as_bytes()).unwrap();

        assert_eq!(
            watchlist.entries(),
            &[
                TickerEntry::new("tcs", "TCS"),
                TickerEntry::new("hdfc-bank", "HDFCBANK"),
            ]
        );
    }

    #[test]
    fn test_from_reader_ignores_extra_columns() {
        let data = "name,ticker,slug\nTata Consultancy, TCS ,tcs\n";
        let watchlist = Watchlist::from_reader(data.as_bytes()).unwrap();

        assert_eq!(watchlist.entries(), &[TickerEntry::new("tcs", "TCS")]);
    }

    #[test]
    fn test_from_reader_missing_column() {
        let data = "slug\ntcs\n";
        assert!(matches!(
            Watchlist::from_reader(data.as_bytes()),
            Err(ReportError::Csv(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "slug,ticker").unwrap();
        writeln!(file, "infy,INFY").unwrap();

        let watchlist = Watchlist::from_path(file.path()).unwrap();
        assert_eq!(watchlist.len(), 1);
        assert_eq!(watchlist.entries()[0].ticker, "INFY");
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = Watchlist::from_path("/nonexistent/stocks.csv").unwrap_err();
        assert!(matches!(err, ReportError::Watchlist { .. }));
        assert!(err.to_string().contains("/nonexistent/stocks.csv"));
    }

    #[test]
    fn test_builtin() {
        let watchlist = Watchlist::builtin();
        let tickers: Vec<_> = watchlist.into_iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["TCS", "RELIANCE", "INFY"]);
    }
}
