//! HTML report document
//!
//! The document is an ordered list of per-ticker sections rendered through a
//! single MiniJinja template between the fixed header and footer. Text coming
//! from the network (tickers, table cells, tooltips) is HTML-escaped.

pub mod builder;

use minijinja::{Environment, Value};
use serde::Serialize;
use std::path::Path;

use crate::api::PriceQuote;
use crate::charts::{ChartKind, RenderedChart};
use crate::error::Result;
use crate::fundamentals::{FundamentalsRecord, TABLE_HEADERS};

pub use builder::{FundamentalsStatus, ReportBuilder, RunSummary, TickerOutcome};

/// Fixed document header
pub const REPORT_HEADER: &str = "<html><head><title>📊 Daily Stock Report</title></head><body><h1>📈 Daily Stock Report</h1>";

/// Fixed document footer
pub const REPORT_FOOTER: &str = "</body></html>";

const TEMPLATE_NAME: &str = "report.html";

const REPORT_BODY: &str = r##"{% for section in sections %}
<h2>{{ section.ticker }} — {{ currency }}{{ section.price }}</h2>
{% if section.table %}
<table border="1" class="dataframe">
<thead><tr>{% for header in headers %}<th>{{ header }}</th>{% endfor %}</tr></thead>
<tbody>
{% for row in section.table %}
<tr>{% for cell in row %}<td>{{ cell }}</td>{% endfor %}</tr>
{% endfor %}
</tbody>
</table>
{% endif %}
{% for chart in section.charts %}
<img src="{{ chart.src }}" width="{{ chart.width }}" height="{{ chart.height }}" usemap="#{{ chart.map_name }}" alt="{{ chart.map_name }}">
<map name="{{ chart.map_name }}">
{% for area in chart.areas %}
<area shape="{{ area.shape }}" coords="{{ area.coords }}" title="{{ area.tooltip }}" alt="{{ area.tooltip }}">
{% endfor %}
</map>
{% endfor %}
{% endfor %}
"##;

/// One `<area>` of a chart's image map
#[derive(Debug, Clone, Serialize)]
pub struct ImageArea {
    pub shape: &'static str,
    pub coords: String,
    pub tooltip: String,
}

/// A chart image embedded in a section
#[derive(Debug, Clone, Serialize)]
pub struct ChartEmbed {
    /// Image path as written; marked safe so separators are not entity-encoded
    src: Value,
    map_name: String,
    width: u32,
    height: u32,
    areas: Vec<ImageArea>,
}

impl ChartEmbed {
    pub fn new(ticker: &str, chart: &RenderedChart) -> Self {
        let suffix = match chart.kind {
            ChartKind::Fundamentals => "fundamentals",
            ChartKind::Ema => "ema",
        };

        Self {
            src: Value::from_safe_string(attribute_path(&chart.path)),
            map_name: format!("{ticker}_{suffix}"),
            width: chart.width,
            height: chart.height,
            areas: chart
                .hotspots
                .iter()
                .map(|spot| ImageArea {
                    shape: spot.shape(),
                    coords: spot.coords(),
                    tooltip: spot.tooltip().to_string(),
                })
                .collect(),
        }
    }
}

/// Everything the report shows for one ticker
#[derive(Debug, Clone, Serialize)]
pub struct TickerSection {
    ticker: String,
    /// Formatted by [`PriceQuote`]; a number or `N/A`
    price: Value,
    table: Option<Vec<[String; 4]>>,
    charts: Vec<ChartEmbed>,
}

impl TickerSection {
    /// Heading-only section
    pub fn new(ticker: impl Into<String>, price: &PriceQuote) -> Self {
        Self {
            ticker: ticker.into(),
            price: Value::from_safe_string(price.to_string()),
            table: None,
            charts: Vec::new(),
        }
    }

    pub fn with_table(mut self, record: &FundamentalsRecord) -> Self {
        self.table = Some(
            record
                .table_rows()
                .into_iter()
                .map(|row| row.map(str::to_string))
                .collect(),
        );
        self
    }

    pub fn push_chart(&mut self, chart: ChartEmbed) {
        self.charts.push(chart);
    }
}

/// Append-only list of sections, rendered once at the end of a run
#[derive(Debug, Clone, Default)]
pub struct ReportDocument {
    currency: String,
    sections: Vec<TickerSection>,
}

#[derive(Serialize)]
struct RenderContext<'a> {
    currency: &'a str,
    headers: [&'static str; 4],
    sections: &'a [TickerSection],
}

impl ReportDocument {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: TickerSection) {
        self.sections.push(section);
    }

    /// Render the full HTML document
    pub fn render(&self) -> Result<String> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_template(TEMPLATE_NAME, REPORT_BODY)?;

        let body = env.get_template(TEMPLATE_NAME)?.render(RenderContext {
            currency: &self.currency,
            headers: TABLE_HEADERS,
            sections: &self.sections,
        })?;

        Ok(format!("{REPORT_HEADER}\n{body}{REPORT_FOOTER}\n"))
    }

    /// Render and write the document, replacing any previous file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let html = self.render()?;
        std::fs::write(path, html)?;
        Ok(())
    }
}

/// Path as it appears in an HTML attribute
fn attribute_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
