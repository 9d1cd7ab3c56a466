//! Chart rendering
//!
//! Each chart is drawn with plotters into an in-memory SVG owned by that call,
//! then rasterised to PNG with resvg. Drawing also records hover hotspots in
//! pixel coordinates, which the report turns into an image map.

pub mod fundamentals;
pub mod trend;

use resvg::{tiny_skia, usvg};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::fundamentals::FundamentalsRecord;
use crate::indicators::PriceHistory;

/// Families tried, in order, for the generic `sans-serif` font
const SANS_SERIF_CANDIDATES: [&str; 5] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
];

/// The two charts drawn per ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Fundamentals,
    Ema,
}

impl ChartKind {
    pub fn file_name(&self, ticker: &str) -> String {
        match self {
            ChartKind::Fundamentals => format!("{ticker}_fundamentals.png"),
            ChartKind::Ema => format!("{ticker}_ema.png"),
        }
    }
}

/// Hover region on a chart image, in image pixels
#[derive(Debug, Clone, PartialEq)]
pub enum ChartHotspot {
    Rect {
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        tooltip: String,
    },
    Circle {
        x: i32,
        y: i32,
        radius: u32,
        tooltip: String,
    },
}

impl ChartHotspot {
    /// Rectangle from two arbitrary corners
    pub fn rect(a: (i32, i32), b: (i32, i32), tooltip: impl Into<String>) -> Self {
        ChartHotspot::Rect {
            left: a.0.min(b.0),
            top: a.1.min(b.1),
            right: a.0.max(b.0),
            bottom: a.1.max(b.1),
            tooltip: tooltip.into(),
        }
    }

    pub fn circle(center: (i32, i32), radius: u32, tooltip: impl Into<String>) -> Self {
        ChartHotspot::Circle {
            x: center.0,
            y: center.1,
            radius,
            tooltip: tooltip.into(),
        }
    }

    /// `shape` attribute value of an HTML `<area>`
    pub fn shape(&self) -> &'static str {
        match self {
            ChartHotspot::Rect { .. } => "rect",
            ChartHotspot::Circle { .. } => "circle",
        }
    }

    /// `coords` attribute value of an HTML `<area>`
    pub fn coords(&self) -> String {
        match self {
            ChartHotspot::Rect {
                left,
                top,
                right,
                bottom,
                ..
            } => format!("{left},{top},{right},{bottom}"),
            ChartHotspot::Circle { x, y, radius, .. } => format!("{x},{y},{radius}"),
        }
    }

    pub fn tooltip(&self) -> &str {
        match self {
            ChartHotspot::Rect { tooltip, .. } | ChartHotspot::Circle { tooltip, .. } => tooltip,
        }
    }
}

/// A drawn chart before rasterisation
#[derive(Debug, Clone)]
pub struct SvgChart {
    pub svg: String,
    pub hotspots: Vec<ChartHotspot>,
}

/// A chart written to disk
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub hotspots: Vec<ChartHotspot>,
}

/// Draws charts and writes them as PNG files into the output directory
pub struct ChartRenderer {
    output_dir: PathBuf,
    size: (u32, u32),
    options: usvg::Options<'static>,
}

impl ChartRenderer {
    /// Create a renderer; loads system fonts once for all charts
    pub fn new(config: &ReportConfig) -> Self {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::new(system_fonts());

        Self {
            output_dir: config.output_dir.clone(),
            size: (config.chart_width, config.chart_height),
            options,
        }
    }

    /// Path a chart of `kind` for `ticker` is written to
    pub fn chart_path(&self, kind: ChartKind, ticker: &str) -> PathBuf {
        self.output_dir.join(kind.file_name(ticker))
    }

    /// Revenue / net profit bars with an EPS line
    pub fn render_fundamentals(
        &self,
        ticker: &str,
        record: &FundamentalsRecord,
    ) -> Result<RenderedChart> {
        let chart = fundamentals::draw(ticker, record, self.size)?;
        self.save(ChartKind::Fundamentals, ticker, chart)
    }

    /// Close price with EMA overlays
    pub fn render_trend(&self, ticker: &str, history: &PriceHistory) -> Result<RenderedChart> {
        let chart = trend::draw(ticker, history, self.size)?;
        self.save(ChartKind::Ema, ticker, chart)
    }

    fn save(&self, kind: ChartKind, ticker: &str, chart: SvgChart) -> Result<RenderedChart> {
        let path = self.chart_path(kind, ticker);
        let (width, height) = rasterize_png(&chart.svg, &self.options, &path)?;
        debug!(ticker, path = %path.display(), "Chart written");

        Ok(RenderedChart {
            kind,
            path,
            width,
            height,
            hotspots: chart.hotspots,
        })
    }
}

/// Rasterise an SVG document and write it as PNG, overwriting `path`
fn rasterize_png(svg: &str, options: &usvg::Options<'_>, path: &Path) -> Result<(u32, u32)> {
    let tree = usvg::Tree::from_str(svg, options)
        .map_err(|e| ReportError::Chart(format!("SVG parse: {e}")))?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| ReportError::Chart("zero-sized chart".to_string()))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    pixmap
        .save_png(path)
        .map_err(|e| ReportError::Chart(format!("PNG encode {}: {e}", path.display())))?;

    Ok((size.width(), size.height()))
}

fn system_fonts() -> usvg::fontdb::Database {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    let installed = SANS_SERIF_CANDIDATES.into_iter().find(|family| {
        db.faces()
            .any(|face| face.families.iter().any(|(name, _)| name == *family))
    });
    if let Some(family) = installed {
        db.set_sans_serif_family(family);
    }

    debug!(faces = db.len(), sans_serif = ?installed, "Loaded system fonts");
    db
}

/// Range padded so values do not touch the plot edges; never empty
pub(crate) fn padded_range(lo: f64, hi: f64) -> (f64, f64) {
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.08;
    (lo - pad, hi + pad)
}
