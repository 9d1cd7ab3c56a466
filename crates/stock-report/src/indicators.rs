//! Daily price history and exponential moving averages

use chrono::NaiveDate;
use ta::{Next, indicators::ExponentialMovingAverage};

use crate::error::{ReportError, Result};

/// One daily close
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// EMA values aligned index-for-index with the history's points
#[derive(Debug, Clone, PartialEq)]
pub struct EmaSeries {
    pub span: usize,
    pub values: Vec<f64>,
}

impl EmaSeries {
    pub fn label(&self) -> String {
        format!("EMA {}", self.span)
    }
}

/// Daily closes plus their EMA overlays
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    points: Vec<PricePoint>,
    emas: Vec<EmaSeries>,
}

impl PriceHistory {
    /// Sort the points by date and compute one EMA series per span
    pub fn with_emas(mut points: Vec<PricePoint>, spans: &[usize]) -> Result<Self> {
        points.sort_by_key(|p| p.date);

        let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
        let emas = spans
            .iter()
            .map(|&span| {
                Ok(EmaSeries {
                    span,
                    values: ema(&closes, span)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { points, emas })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn emas(&self) -> &[EmaSeries] {
        &self.emas
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last date, if any
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }

    /// Lowest and highest value over closes and all EMAs
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .map(|p| p.close)
            .chain(self.emas.iter().flat_map(|e| e.values.iter().copied()))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Exponential moving average with `α = 2 / (span + 1)`, seeded by the first value
pub fn ema(values: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut indicator = ExponentialMovingAverage::new(span)
        .map_err(|e| ReportError::Indicator(format!("EMA span {span}: {e}")))?;

    Ok(values.iter().map(|&v| indicator.next(v)).collect())
}
