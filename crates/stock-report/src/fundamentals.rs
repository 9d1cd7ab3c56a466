//! Quarterly fundamentals record

use serde::Serialize;

/// Column headers used when the record is shown as a table
pub const TABLE_HEADERS: [&str; 4] = ["Quarter", "Revenue (Cr)", "Net Profit (Cr)", "EPS"];

/// The three result rows picked out of the quarterly table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RowKind {
    Sales,
    NetProfit,
    Eps,
}

impl RowKind {
    /// All kinds, in the order rows are tested against them
    pub const ALL: [RowKind; 3] = [RowKind::Sales, RowKind::NetProfit, RowKind::Eps];

    /// Lowercase substring that identifies the row's label
    pub fn needle(&self) -> &'static str {
        match self {
            RowKind::Sales => "sales",
            RowKind::NetProfit => "net profit",
            RowKind::Eps => "eps",
        }
    }

    /// Series name used in tables, legends and tooltips
    pub fn series_label(&self) -> &'static str {
        match self {
            RowKind::Sales => "Revenue (Cr)",
            RowKind::NetProfit => "Net Profit (Cr)",
            RowKind::Eps => "EPS",
        }
    }

    /// Whether a lowercased row label belongs to this kind
    pub fn matches(&self, label: &str) -> bool {
        label.contains(self.needle())
    }
}

/// Quarterly revenue, net profit and EPS for one company.
///
/// Values are kept as scraped text; [`FundamentalsRecord::numeric`] coerces
/// them, turning anything unparsable into `None`. All four sequences always
/// have the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundamentalsRecord {
    quarters: Vec<String>,
    revenue: Vec<String>,
    net_profit: Vec<String>,
    eps: Vec<String>,
}

impl FundamentalsRecord {
    /// Build a record, truncating every sequence to the shortest one
    pub fn new(
        quarters: Vec<String>,
        revenue: Vec<String>,
        net_profit: Vec<String>,
        eps: Vec<String>,
    ) -> Self {
        let len = quarters
            .len()
            .min(revenue.len())
            .min(net_profit.len())
            .min(eps.len());

        let truncate = |mut v: Vec<String>| {
            v.truncate(len);
            v
        };

        Self {
            quarters: truncate(quarters),
            revenue: truncate(revenue),
            net_profit: truncate(net_profit),
            eps: truncate(eps),
        }
    }

    /// Number of quarters
    pub fn len(&self) -> usize {
        self.quarters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quarters.is_empty()
    }

    /// Quarter labels, oldest first as listed on the page
    pub fn quarters(&self) -> &[String] {
        &self.quarters
    }

    /// Raw text values of one row
    pub fn column(&self, kind: RowKind) -> &[String] {
        match kind {
            RowKind::Sales => &self.revenue,
            RowKind::NetProfit => &self.net_profit,
            RowKind::Eps => &self.eps,
        }
    }

    /// Values of one row coerced to numbers
    pub fn numeric(&self, kind: RowKind) -> Vec<Option<f64>> {
        self.column(kind).iter().map(|v| coerce_numeric(v)).collect()
    }

    /// Table body rows: quarter, revenue, net profit, EPS
    pub fn table_rows(&self) -> Vec<[&str; 4]> {
        (0..self.len())
            .map(|i| {
                [
                    self.quarters[i].as_str(),
                    self.revenue[i].as_str(),
                    self.net_profit[i].as_str(),
                    self.eps[i].as_str(),
                ]
            })
            .collect()
    }
}

/// Best-effort numeric coercion of a scraped cell.
///
/// Thousands separators are ignored; empty, non-numeric and non-finite cells
/// become `None`.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_row_kind_matching() {
        assert!(RowKind::Sales.matches("sales +"));
        assert!(RowKind::NetProfit.matches("net profit +"));
        assert!(RowKind::Eps.matches("eps in rs"));
        assert!(!RowKind::Eps.matches("expenses +"));
        assert!(!RowKind::Sales.matches(""));
    }

    #[test]
    fn test_record_truncates_to_shortest() {
        let record = FundamentalsRecord::new(
            strings(&["Jun 2024", "Sep 2024", "Dec 2024"]),
            strings(&["100", "110", "120"]),
            strings(&["10", "11"]),
            strings(&["1.0", "1.1", "1.2"]),
        );

        assert_eq!(record.len(), 2);
        for kind in RowKind::ALL {
            assert_eq!(record.column(kind).len(), 2);
        }
        assert_eq!(record.quarters(), &strings(&["Jun 2024", "Sep 2024"])[..]);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(coerce_numeric("1234.5"), Some(1234.5));
        assert_eq!(coerce_numeric(" 62,613 "), Some(62613.0));
        assert_eq!(coerce_numeric("-42"), Some(-42.0));
        assert_eq!(coerce_numeric(""), None);
        assert_eq!(coerce_numeric("12%"), None);
        assert_eq!(coerce_numeric("inf"), None);
        assert_eq!(coerce_numeric("NaN"), None);
    }

    #[test]
    fn test_numeric_column_marks_missing() {
        let record = FundamentalsRecord::new(
            strings(&["Q1", "Q2", "Q3"]),
            strings(&["100", "", "120"]),
            strings(&["10", "11", "n/a"]),
            strings(&["1.5", "1.6", "1.7"]),
        );

        assert_eq!(record.numeric(RowKind::Sales), vec![Some(100.0), None, Some(120.0)]);
        assert_eq!(record.numeric(RowKind::NetProfit), vec![Some(10.0), Some(11.0), None]);
    }

    #[test]
    fn test_table_rows() {
        let record = FundamentalsRecord::new(
            strings(&["Q1", "Q2"]),
            strings(&["100", "110"]),
            strings(&["10", "11"]),
            strings(&["1.5", "1.6"]),
        );

        let rows = record.table_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], ["Q2", "110", "11", "1.6"]);
    }
}
