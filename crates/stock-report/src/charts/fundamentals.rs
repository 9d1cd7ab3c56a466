//! Quarterly fundamentals chart: revenue and net profit bars on the left axis,
//! EPS as a line on a secondary right axis.

use plotters::prelude::*;
use plotters::style::FontTransform;

use super::{ChartHotspot, SvgChart, padded_range};
use crate::error::{ReportError, Result};
use crate::fundamentals::{FundamentalsRecord, RowKind};

const REVENUE_COLOR: RGBColor = RGBColor(0x4c, 0x72, 0xb0);
const PROFIT_COLOR: RGBColor = RGBColor(0xdd, 0x84, 0x52);
const EPS_COLOR: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);

/// Width of one bar in quarter units; revenue sits left of the tick, profit right
const BAR_WIDTH: f64 = 0.35;

/// Draw the fundamentals chart for `ticker` into an SVG document.
///
/// Missing or non-numeric cells are left out of the plot; the quarter keeps
/// its slot on the x axis.
pub fn draw(ticker: &str, record: &FundamentalsRecord, size: (u32, u32)) -> Result<SvgChart> {
    if record.is_empty() {
        return Err(ReportError::Chart(format!("{ticker}: no quarters to plot")));
    }

    let quarters = record.quarters();
    let revenue = record.numeric(RowKind::Sales);
    let profit = record.numeric(RowKind::NetProfit);
    let eps = record.numeric(RowKind::Eps);

    let (bar_lo, bar_hi) = bar_range(revenue.iter().chain(profit.iter()).flatten().copied());
    let (eps_lo, eps_hi) = eps
        .iter()
        .flatten()
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .map_or((0.0, 1.0), |(lo, hi)| padded_range(lo, hi));

    let x_range = -0.5..(quarters.len() as f64 - 0.5);
    let quarter_label = |x: &f64| -> String {
        let rounded = x.round();
        if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        quarters
            .get(rounded as usize)
            .cloned()
            .unwrap_or_default()
    };

    let mut svg = String::new();
    let mut hotspots = Vec::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{ticker} – Quarterly Fundamentals (with EPS)"),
                ("sans-serif", 26),
            )
            .margin(20)
            .x_label_area_size(90)
            .y_label_area_size(80)
            .right_y_label_area_size(70)
            .build_cartesian_2d(x_range.clone(), bar_lo..bar_hi)?
            .set_secondary_coord(x_range, eps_lo..eps_hi);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(quarters.len())
            .x_label_formatter(&quarter_label)
            .x_label_style(
                ("sans-serif", 13)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_desc("₹ in Crores")
            .bold_line_style(BLACK.mix(0.12))
            .light_line_style(WHITE)
            .draw()?;

        chart
            .configure_secondary_axes()
            .y_desc("EPS")
            .draw()?;

        for (kind, values, color, offset) in [
            (RowKind::Sales, &revenue, REVENUE_COLOR, -BAR_WIDTH),
            (RowKind::NetProfit, &profit, PROFIT_COLOR, 0.0),
        ] {
            // (quarter index, left edge, right edge, value)
            let bars: Vec<(usize, f64, f64, f64)> = values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| {
                    let x0 = i as f64 + offset;
                    v.map(|v| (i, x0, x0 + BAR_WIDTH, v))
                })
                .collect();

            chart
                .draw_series(
                    bars.iter()
                        .map(|&(_, x0, x1, v)| Rectangle::new([(x0, 0.0), (x1, v)], color.filled())),
                )?
                .label(kind.series_label())
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
            chart.draw_series(bars.iter().map(|&(_, x0, x1, v)| {
                Rectangle::new([(x0, 0.0), (x1, v)], BLACK.stroke_width(1))
            }))?;

            let raw = record.column(kind);
            for &(i, x0, x1, v) in &bars {
                hotspots.push(ChartHotspot::rect(
                    chart.backend_coord(&(x0, 0.0)),
                    chart.backend_coord(&(x1, v)),
                    format!("{} · {}: {}", quarters[i], kind.series_label(), raw[i]),
                ));
            }
        }

        let eps_points: Vec<(usize, f64)> = eps
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
            .collect();

        chart
            .draw_secondary_series(LineSeries::new(
                eps_points.iter().map(|&(i, v)| (i as f64, v)),
                EPS_COLOR.stroke_width(2),
            ))?
            .label(RowKind::Eps.series_label())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], EPS_COLOR.stroke_width(2)));
        chart.draw_secondary_series(
            eps_points
                .iter()
                .map(|&(i, v)| Circle::new((i as f64, v), 4, EPS_COLOR.filled())),
        )?;

        let eps_raw = record.column(RowKind::Eps);
        for &(i, v) in &eps_points {
            hotspots.push(ChartHotspot::circle(
                chart.borrow_secondary().backend_coord(&(i as f64, v)),
                6,
                format!("{} · EPS: {}", quarters[i], eps_raw[i]),
            ));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
    }

    Ok(SvgChart { svg, hotspots })
}

/// Left axis range: always includes zero so bars grow from the baseline
fn bar_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo == 0.0 && hi == 0.0 {
        return (0.0, 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { 0.0 }, if hi > 0.0 { hi + pad } else { 0.0 })
}
