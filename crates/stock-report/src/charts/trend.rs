//! Close price and EMA trend chart

use chrono::NaiveDate;
use plotters::prelude::*;

use super::{ChartHotspot, SvgChart, padded_range};
use crate::error::{ReportError, Result};
use crate::indicators::PriceHistory;

/// Colors for the EMA overlays, shortest span first
const EMA_PALETTE: [RGBColor; 5] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
];

/// Overlays before this index are drawn dashed
const DASHED_OVERLAYS: usize = 2;

pub fn draw(ticker: &str, history: &PriceHistory, size: (u32, u32)) -> Result<SvgChart> {
    let (start, mut end) = history
        .date_range()
        .ok_or_else(|| ReportError::Chart(format!("{ticker}: no price history to plot")))?;
    if end == start {
        end = start.succ_opt().unwrap_or(start);
    }

    let (lo, hi) = history.value_range().map_or((0.0, 1.0), |(lo, hi)| padded_range(lo, hi));

    let mut svg = String::new();
    let mut hotspots = Vec::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{ticker} – Close Price & EMA Trends (1 Year)"),
                ("sans-serif", 26),
            )
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(start..end, lo..hi)?;

        chart
            .configure_mesh()
            .x_labels(12)
            .x_label_formatter(&|date: &NaiveDate| date.format("%b %Y").to_string())
            .x_desc("Date")
            .y_desc("Price (₹)")
            .bold_line_style(BLACK.mix(0.12))
            .light_line_style(WHITE)
            .draw()?;

        let points = history.points();

        chart
            .draw_series(LineSeries::new(
                points.iter().map(|p| (p.date, p.close)),
                BLACK.stroke_width(2),
            ))?
            .label("Close Price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));

        for (i, series) in history.emas().iter().enumerate() {
            let color = EMA_PALETTE[i % EMA_PALETTE.len()];
            let data = points
                .iter()
                .zip(&series.values)
                .map(|(p, &v)| (p.date, v));

            let anno = if i < DASHED_OVERLAYS {
                chart.draw_series(DashedLineSeries::new(data, 8, 4, color.stroke_width(1)))?
            } else {
                chart.draw_series(LineSeries::new(data, color.stroke_width(1)))?
            };
            anno.label(series.label()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        }

        for (i, point) in points.iter().enumerate() {
            let mut tooltip = format!("{} · Close {:.2}", point.date, point.close);
            for series in history.emas() {
                tooltip.push_str(&format!(" · {} {:.2}", series.label(), series.values[i]));
            }
            hotspots.push(ChartHotspot::circle(
                chart.backend_coord(&(point.date, point.close)),
                4,
                tooltip,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::PricePoint;

    fn history(closes: &[f64]) -> PriceHistory {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Days::new(i as u64),
                close,
            })
            .collect();
        PriceHistory::with_emas(points, &[9, 20, 50, 100, 200]).unwrap()
    }

    #[test]
    fn test_draw_has_title_and_legend() {
        let chart = draw("RELIANCE", &history(&[10.0, 12.0, 11.0, 13.0]), (800, 400)).unwrap();

        assert!(chart.svg.contains("RELIANCE – Close Price"));
        assert!(chart.svg.contains("EMA Trends (1 Year)"));
        assert!(chart.svg.contains("Close Price"));
        for label in ["EMA 9", "EMA 20", "EMA 50", "EMA 100", "EMA 200"] {
            assert!(chart.svg.contains(label), "missing legend entry {label}");
        }
    }

    #[test]
    fn test_one_hotspot_per_day() {
        let chart = draw("TCS", &history(&[10.0, 12.0, 11.0, 13.0]), (800, 400)).unwrap();

        assert_eq!(chart.hotspots.len(), 4);
        assert_eq!(
            chart.hotspots[1].tooltip(),
            "2024-03-02 · Close 12.00 · EMA 9 10.40 · EMA 20 10.19 · EMA 50 10.08 · EMA 100 10.04 · EMA 200 10.02"
        );
    }

    #[test]
    fn test_single_day_history() {
        let chart = draw("TCS", &history(&[3500.0]), (800, 400)).unwrap();
        assert_eq!(chart.hotspots.len(), 1);
    }

    #[test]
    fn test_empty_history_is_an_error() {
        let empty = PriceHistory::with_emas(Vec::new(), &[9]).unwrap();
        assert!(matches!(
            draw("TCS", &empty, (800, 400)),
            Err(ReportError::Chart(_))
        ));
    }
}
