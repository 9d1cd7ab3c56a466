//! Quarterly results scraper for the fundamentals site
//!
//! Pages are addressed as `{base}/company/{slug}/consolidated/`. The quarterly
//! table lives in `<section id="quarters">`; its first column holds row labels
//! and the header row holds quarter names.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::api::FundamentalsSource;
use crate::config::ReportConfig;
use crate::error::{FundamentalsError, ReportError, Result};
use crate::fundamentals::{FundamentalsRecord, RowKind};

static QUARTERS_SECTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("section#quarters").expect("valid selector"));
static HEADER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("valid selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("valid selector"));

/// HTTP client for the fundamentals site
pub struct ScreenerClient {
    client: Client,
    config: Arc<ReportConfig>,
}

impl ScreenerClient {
    /// Create a client sending the configured browser-like User-Agent
    pub fn new(config: Arc<ReportConfig>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ReportError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl FundamentalsSource for ScreenerClient {
    async fn quarterly_fundamentals(
        &self,
        slug: &str,
    ) -> std::result::Result<FundamentalsRecord, FundamentalsError> {
        let url = self.config.fundamentals_url(slug);
        debug!(slug, url = %url, "Fetching fundamentals page");

        let network = |source| FundamentalsError::Network {
            slug: slug.to_string(),
            source,
        };

        let response = self.client.get(&url).send().await.map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FundamentalsError::HttpStatus {
                slug: slug.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(network)?;
        parse_quarterly_page(slug, &body)
    }
}

/// Extract the sales, net profit and EPS rows from a fundamentals page.
///
/// Either all three rows are found and a record is returned, or nothing is.
pub fn parse_quarterly_page(
    slug: &str,
    html: &str,
) -> std::result::Result<FundamentalsRecord, FundamentalsError> {
    let document = Html::parse_document(html);
    let section = document.select(&QUARTERS_SECTION).next().ok_or_else(|| {
        FundamentalsError::SectionMissing {
            slug: slug.to_string(),
        }
    })?;

    let headers: Vec<String> = section.select(&HEADER_CELL).map(element_text).collect();
    let mut rows = scan_rows(section);

    let missing: Vec<RowKind> = RowKind::ALL
        .into_iter()
        .filter(|kind| !rows.contains_key(kind))
        .collect();
    if !missing.is_empty() {
        return Err(FundamentalsError::RowsMissing {
            slug: slug.to_string(),
            missing,
        });
    }

    // drop the label column
    let mut values = |kind: RowKind| -> Vec<String> {
        rows.remove(&kind)
            .unwrap_or_default()
            .into_iter()
            .skip(1)
            .collect()
    };

    Ok(FundamentalsRecord::new(
        headers.into_iter().skip(1).collect(),
        values(RowKind::Sales),
        values(RowKind::NetProfit),
        values(RowKind::Eps),
    ))
}

/// Single top-to-bottom pass over the section's rows.
///
/// A row is assigned to the first kind (sales, net profit, EPS) whose label
/// matches and that has no row yet; earlier rows always win.
fn scan_rows(section: ElementRef<'_>) -> HashMap<RowKind, Vec<String>> {
    let mut found: HashMap<RowKind, Vec<String>> = HashMap::new();

    for row in section.select(&ROW) {
        let Some(first_cell) = row.select(&CELL).next() else {
            continue;
        };
        let label = element_text(first_cell).to_lowercase();

        let kind = RowKind::ALL
            .into_iter()
            .find(|kind| !found.contains_key(kind) && kind.matches(&label));

        if let Some(kind) = kind {
            let cells = row
                .select(&CELL)
                .map(|td| element_text(td).replace(',', ""))
                .collect();
            found.insert(kind, cells);

            if found.len() == RowKind::ALL.len() {
                break;
            }
        }
    }

    found
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
