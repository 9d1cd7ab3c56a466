//! Runs the watchlist through fetchers and renderers and writes the report

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{ChartEmbed, ReportDocument, TickerSection};
use crate::api::{FundamentalsSource, MarketDataSource, PriceQuote};
use crate::charts::{ChartKind, ChartRenderer, RenderedChart};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::indicators::PriceHistory;
use crate::watchlist::{TickerEntry, Watchlist};

/// Whether a ticker's fundamentals were obtained
#[derive(Debug, Clone, PartialEq)]
pub enum FundamentalsStatus {
    Loaded { quarters: usize },
    Failed { reason: String },
}

/// What happened to one watchlist entry
#[derive(Debug, Clone)]
pub struct TickerOutcome {
    pub slug: String,
    pub ticker: String,
    pub fundamentals: FundamentalsStatus,
    pub price: PriceQuote,
    pub charts: Vec<ChartKind>,
}

impl TickerOutcome {
    pub fn has_fundamentals(&self) -> bool {
        matches!(self.fundamentals, FundamentalsStatus::Loaded { .. })
    }
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub outcomes: Vec<TickerOutcome>,
}

impl RunSummary {
    /// Tickers whose fundamentals could not be fetched
    pub fn failed(&self) -> impl Iterator<Item = &TickerOutcome> {
        self.outcomes.iter().filter(|o| !o.has_fundamentals())
    }

    /// Per-ticker overview for the terminal
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Ticker", "Slug", "Price", "Fundamentals", "Charts"]);

        for outcome in &self.outcomes {
            let fundamentals = match &outcome.fundamentals {
                FundamentalsStatus::Loaded { quarters } => format!("{quarters} quarters"),
                FundamentalsStatus::Failed { reason } => reason.clone(),
            };
            let charts = if outcome.charts.is_empty() {
                "-".to_string()
            } else {
                outcome
                    .charts
                    .iter()
                    .map(|kind| match kind {
                        ChartKind::Fundamentals => "fundamentals",
                        ChartKind::Ema => "ema",
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            };

            table.add_row(vec![
                outcome.ticker.clone(),
                outcome.slug.clone(),
                outcome.price.to_string(),
                fundamentals,
                charts,
            ]);
        }

        table
    }
}

/// Builds the report for a watchlist, one ticker after another
pub struct ReportBuilder<F, M> {
    config: Arc<ReportConfig>,
    fundamentals: F,
    market: M,
    charts: ChartRenderer,
}

impl<F, M> ReportBuilder<F, M>
where
    F: FundamentalsSource,
    M: MarketDataSource,
{
    pub fn new(config: Arc<ReportConfig>, fundamentals: F, market: M) -> Self {
        let charts = ChartRenderer::new(&config);
        Self {
            config,
            fundamentals,
            market,
            charts,
        }
    }

    /// Process every entry in order and write `report.html`.
    ///
    /// Per-ticker failures are logged and reflected in the summary; only
    /// creating the output directory or writing the report is fatal.
    pub async fn run(&self, watchlist: &Watchlist) -> Result<RunSummary> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let mut document = ReportDocument::new(self.config.currency_symbol.as_str());
        let mut outcomes = Vec::with_capacity(watchlist.len());

        for entry in watchlist {
            let (section, outcome) = self.process(entry).await;
            document.push(section);
            outcomes.push(outcome);
        }

        let report_path = self.config.report_path();
        document.write_to(&report_path)?;
        info!(path = %report_path.display(), tickers = outcomes.len(), "Report saved");

        Ok(RunSummary {
            report_path,
            outcomes,
        })
    }

    async fn process(&self, entry: &TickerEntry) -> (TickerSection, TickerOutcome) {
        let slug = entry.slug.as_str();
        let ticker = entry.ticker.as_str();
        debug!(slug, ticker, "Processing ticker");

        let fundamentals = self.fundamentals.quarterly_fundamentals(slug).await;
        let price = self.market.current_price(ticker).await;

        let mut section = TickerSection::new(ticker, &price);
        let mut outcome = TickerOutcome {
            slug: slug.to_string(),
            ticker: ticker.to_string(),
            fundamentals: FundamentalsStatus::Failed {
                reason: String::new(),
            },
            price,
            charts: Vec::new(),
        };

        let record = match fundamentals {
            Ok(record) => record,
            Err(e) => {
                warn!(slug, ticker, error = %e, "Skipping fundamentals");
                outcome.fundamentals = FundamentalsStatus::Failed {
                    reason: e.to_string(),
                };
                return (section, outcome);
            }
        };

        outcome.fundamentals = FundamentalsStatus::Loaded {
            quarters: record.len(),
        };
        section = section.with_table(&record);

        let fundamentals_chart = self
            .charts
            .render_fundamentals(ticker, &record)
            .inspect_err(|e| warn!(ticker, error = %e, "Fundamentals chart failed"))
            .ok();
        let trend_chart = self.trend_chart(ticker).await;

        for chart in [fundamentals_chart, trend_chart].into_iter().flatten() {
            outcome.charts.push(chart.kind);
            section.push_chart(ChartEmbed::new(ticker, &chart));
        }

        (section, outcome)
    }

    /// Fetch the daily history and draw the EMA chart; `None` when nothing was written
    async fn trend_chart(&self, ticker: &str) -> Option<RenderedChart> {
        let closes = match self.market.daily_closes(ticker).await {
            Ok(closes) => closes,
            Err(e) => {
                warn!(ticker, error = %e, "Price history unavailable");
                return None;
            }
        };

        if closes.is_empty() {
            warn!(ticker, "No price history, skipping EMA chart");
            return None;
        }

        let history = PriceHistory::with_emas(closes, &self.config.ema_spans)
            .inspect_err(|e| warn!(ticker, error = %e, "EMA computation failed"))
            .ok()?;

        self.charts
            .render_trend(ticker, &history)
            .inspect_err(|e| warn!(ticker, error = %e, "EMA chart failed"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::screener::fixtures::standard_page;
    use crate::api::{MockFundamentalsSource, MockMarketDataSource, parse_quarterly_page};
    use crate::error::{FundamentalsError, ReportError};
    use crate::indicators::PricePoint;
    use chrono::NaiveDate;
    use std::path::Path;
    use tokio_test::assert_ok;

    fn config(dir: &Path) -> Arc<ReportConfig> {
        Arc::new(
            ReportConfig::builder()
                .output_dir(dir)
                .chart_size(600, 300)
                .build()
                .unwrap(),
        )
    }

    fn closes(days: u64) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..days)
            .map(|i| PricePoint {
                date: start + chrono::Days::new(i),
                close: 3400.0 + i as f64,
            })
            .collect()
    }

    fn tcs_fundamentals() -> MockFundamentalsSource {
        let mut source = MockFundamentalsSource::new();
        source
            .expect_quarterly_fundamentals()
            .returning(|slug| match slug {
                "tcs" => parse_quarterly_page(slug, &standard_page()),
                _ => Err(FundamentalsError::HttpStatus {
                    slug: slug.to_string(),
                    status: 404,
                }),
            });
        source
    }

    fn market(price: PriceQuote, history: Vec<PricePoint>) -> MockMarketDataSource {
        let mut market = MockMarketDataSource::new();
        market
            .expect_current_price()
            .returning(move |_| price.clone());
        market
            .expect_daily_closes()
            .returning(move |_| Ok(history.clone()));
        market
    }

    fn watchlist(entries: &[(&str, &str)]) -> Watchlist {
        Watchlist::new(
            entries
                .iter()
                .map(|(slug, ticker)| TickerEntry::new(*slug, *ticker))
                .collect(),
        )
    }

    fn read_report(summary: &RunSummary) -> String {
        std::fs::read_to_string(&summary.report_path).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_single_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let builder = ReportBuilder::new(
            config(dir.path()),
            tcs_fundamentals(),
            market(PriceQuote::Available(3500.0), closes(30)),
        );

        let summary = assert_ok!(builder.run(&watchlist(&[("tcs", "TCS")])).await);
        let html = read_report(&summary);

        assert_eq!(summary.report_path, dir.path().join("report.html"));
        assert!(html.contains("<h2>TCS — ₹3500</h2>"));
        assert_eq!(html.matches("<tr><td>").count(), 4);

        let fundamentals_png = dir.path().join("TCS_fundamentals.png");
        let ema_png = dir.path().join("TCS_ema.png");
        assert!(html.contains(&format!("<img src=\"{}\"", fundamentals_png.display())));
        assert!(html.contains(&format!("<img src=\"{}\"", ema_png.display())));
        assert_eq!(html.matches("<img ").count(), 2);
        assert!(fundamentals_png.exists());
        assert!(ema_png.exists());

        let outcome = &summary.outcomes[0];
        assert_eq!(outcome.fundamentals, FundamentalsStatus::Loaded { quarters: 4 });
        assert_eq!(outcome.charts, vec![ChartKind::Fundamentals, ChartKind::Ema]);
    }

    #[tokio::test]
    async fn test_not_found_gives_heading_only_and_continues() {
        let dir = tempfile::tempdir().unwrap();

        let mut market = MockMarketDataSource::new();
        market
            .expect_current_price()
            .returning(|_| PriceQuote::Available(3500.0));
        // history is only fetched for tickers with fundamentals
        market
            .expect_daily_closes()
            .times(1)
            .returning(|_| Ok(closes(10)));

        let builder = ReportBuilder::new(config(dir.path()), tcs_fundamentals(), market);
        let summary = assert_ok!(
            builder
                .run(&watchlist(&[("unknown", "UNKNOWN"), ("tcs", "TCS")]))
                .await
        );
        let html = read_report(&summary);

        assert!(html.contains("<h2>UNKNOWN — ₹3500</h2>"));
        assert!(!html.contains("UNKNOWN_fundamentals.png"));
        assert!(!dir.path().join("UNKNOWN_ema.png").exists());
        assert!(html.contains("<h2>TCS — ₹3500</h2>"));
        assert!(html.find("UNKNOWN").unwrap() < html.find("<h2>TCS").unwrap());

        let failed: Vec<&str> = summary.failed().map(|o| o.ticker.as_str()).collect();
        assert_eq!(failed, vec!["UNKNOWN"]);
        match &summary.outcomes[0].fundamentals {
            FundamentalsStatus::Failed { reason } => assert!(reason.contains("404")),
            other => panic!("Expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unavailable_price_keeps_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let builder = ReportBuilder::new(
            config(dir.path()),
            tcs_fundamentals(),
            market(PriceQuote::unavailable("symbol not found"), closes(30)),
        );

        let summary = assert_ok!(builder.run(&watchlist(&[("tcs", "TCS")])).await);
        let html = read_report(&summary);

        assert!(html.contains("<h2>TCS — ₹N/A</h2>"));
        assert_eq!(html.matches("<tr><td>").count(), 4);
        assert_eq!(html.matches("<img ").count(), 2);
    }

    #[tokio::test]
    async fn test_empty_history_omits_ema_chart() {
        let dir = tempfile::tempdir().unwrap();
        let builder = ReportBuilder::new(
            config(dir.path()),
            tcs_fundamentals(),
            market(PriceQuote::Available(3500.0), Vec::new()),
        );

        let summary = assert_ok!(builder.run(&watchlist(&[("tcs", "TCS")])).await);
        let html = read_report(&summary);

        assert!(html.contains("TCS_fundamentals.png"));
        assert!(!html.contains("TCS_ema.png"));
        assert!(!dir.path().join("TCS_ema.png").exists());
        assert_eq!(summary.outcomes[0].charts, vec![ChartKind::Fundamentals]);
    }

    #[tokio::test]
    async fn test_history_failure_omits_ema_chart() {
        let dir = tempfile::tempdir().unwrap();

        let mut market = MockMarketDataSource::new();
        market
            .expect_current_price()
            .returning(|_| PriceQuote::Available(3500.0));
        market.expect_daily_closes().returning(|ticker| {
            Err(ReportError::MarketData {
                symbol: format!("{ticker}.NS"),
                reason: "timeout".to_string(),
            })
        });

        let builder = ReportBuilder::new(config(dir.path()), tcs_fundamentals(), market);
        let summary = assert_ok!(builder.run(&watchlist(&[("tcs", "TCS")])).await);

        assert!(!read_report(&summary).contains("TCS_ema.png"));
        assert_eq!(summary.outcomes[0].charts, vec![ChartKind::Fundamentals]);
    }

    #[tokio::test]
    async fn test_second_run_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let builder = ReportBuilder::new(
            config(dir.path()),
            tcs_fundamentals(),
            market(PriceQuote::Available(3500.0), closes(30)),
        );
        let list = watchlist(&[("tcs", "TCS")]);

        let first = assert_ok!(builder.run(&list).await);
        let report = read_report(&first);
        let chart = std::fs::read(dir.path().join("TCS_ema.png")).unwrap();

        let second = assert_ok!(builder.run(&list).await);
        assert_eq!(read_report(&second), report);
        assert_eq!(std::fs::read(dir.path().join("TCS_ema.png")).unwrap(), chart);
    }

    #[tokio::test]
    async fn test_output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("out");
        let builder = ReportBuilder::new(
            config(&nested),
            tcs_fundamentals(),
            market(PriceQuote::Available(1.0), Vec::new()),
        );

        let summary = assert_ok!(builder.run(&Watchlist::new(Vec::new())).await);
        assert!(summary.report_path.exists());
        assert!(summary.outcomes.is_empty());
    }

    #[test]
    fn test_summary_table() {
        let summary = RunSummary {
            report_path: PathBuf::from("output/report.html"),
            outcomes: vec![
                TickerOutcome {
                    slug: "tcs".to_string(),
                    ticker: "TCS".to_string(),
                    fundamentals: FundamentalsStatus::Loaded { quarters: 13 },
                    price: PriceQuote::Available(3500.0),
                    charts: vec![ChartKind::Fundamentals, ChartKind::Ema],
                },
                TickerOutcome {
                    slug: "abc".to_string(),
                    ticker: "ABC".to_string(),
                    fundamentals: FundamentalsStatus::Failed {
                        reason: "HTTP 404".to_string(),
                    },
                    price: PriceQuote::unavailable("not found"),
                    charts: Vec::new(),
                },
            ],
        };

        let rendered = summary.to_table().to_string();
        assert!(rendered.contains("13 quarters"));
        assert!(rendered.contains("fundamentals, ema"));
        assert!(rendered.contains("N/A"));
        assert_eq!(summary.failed().count(), 1);
    }
}
