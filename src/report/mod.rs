//! Candidate report: ordering, CSV snapshot, and console preview.
//!
//! Order is margin descending with unknown margins last; candidates with
//! equal margins keep discovery order. `Unknown` renders as `n/a` here and
//! nowhere else.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use tracing::info;

use crate::types::{Candidate, Figure};

/// Rows shown in the console preview.
pub const PREVIEW_ROWS: usize = 20;

/// Total order on margins: known values descending, then unknowns.
fn margin_order(a: &Figure, b: &Figure) -> Ordering {
    match (a, b) {
        (Figure::Known(x), Figure::Known(y)) => y.cmp(x),
        (Figure::Known(_), Figure::Unknown) => Ordering::Less,
        (Figure::Unknown, Figure::Known(_)) => Ordering::Greater,
        (Figure::Unknown, Figure::Unknown) => Ordering::Equal,
    }
}

/// Sort candidates into report order (stable).
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| margin_order(&a.margin_pct(), &b.margin_pct()));
}

/// `product_candidates_<YYYYmmdd_HHMM>.csv` in UTC.
pub fn report_file_name(now: DateTime<Utc>) -> String {
    format!("product_candidates_{}.csv", now.format("%Y%m%d_%H%M"))
}

fn render(figure: Figure, dp: usize) -> String {
    match figure {
        Figure::Known(v) => format!("{:.*}", dp, v),
        Figure::Unknown => "n/a".to_string(),
    }
}

/// One rendered report line, shared by the CSV writer and the preview.
#[derive(Debug, Clone, Serialize, Tabled, PartialEq, Eq)]
pub struct ReportRow {
    #[tabled(rename = "keyword")]
    pub keyword: String,
    #[tabled(rename = "region")]
    pub region: String,
    #[tabled(rename = "sell_price")]
    pub sell_price: String,
    #[tabled(rename = "cost_price")]
    pub cost_price: String,
    #[tabled(rename = "margin_pct")]
    pub margin_pct: String,
    #[tabled(rename = "listing_count")]
    pub listing_count: u64,
}

impl From<&Candidate> for ReportRow {
    fn from(c: &Candidate) -> Self {
        Self {
            keyword: c.keyword().to_string(),
            region: c.region().to_string(),
            sell_price: format!("{:.2}", c.sell_price()),
            cost_price: render(c.cost_price(), 2),
            margin_pct: render(c.margin_pct(), 1),
            listing_count: c.listing_count(),
        }
    }
}

/// Write candidates (already in report order) as CSV.
pub fn write_csv(path: &Path, candidates: &[Candidate]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    for c in candidates {
        writer
            .serialize(ReportRow::from(c))
            .context("Failed to write report row")?;
    }
    writer.flush().context("Failed to flush report file")?;
    Ok(())
}

/// Sort, then write a timestamped report into `dir`. Returns the file path.
pub fn write_report(
    dir: &Path,
    candidates: &mut [Candidate],
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    sort_candidates(candidates);
    let path = dir.join(report_file_name(now));
    write_csv(&path, candidates)?;
    info!(path = %path.display(), rows = candidates.len(), "Report written");
    Ok(path)
}

/// Table of the first `limit` candidates for console output.
pub fn preview_table(candidates: &[Candidate], limit: usize) -> String {
    let rows: Vec<ReportRow> = candidates.iter().take(limit).map(ReportRow::from).collect();
    Table::new(rows).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Region, TrendKeyword};
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn candidate(name: &str, margin: Figure, cost: Figure) -> Candidate {
        Candidate::new(
            TrendKeyword::new(name).unwrap(),
            Region::Us,
            dec!(20.0),
            cost,
            margin,
            42,
        )
    }

    fn margins(candidates: &[Candidate]) -> Vec<Figure> {
        candidates.iter().map(|c| c.margin_pct()).collect()
    }

    #[test]
    fn test_sort_known_desc_unknown_last() {
        let mut cs = vec![
            candidate("a", Figure::Known(dec!(50.0)), Figure::Known(dec!(10))),
            candidate("b", Figure::Unknown, Figure::Unknown),
            candidate("c", Figure::Known(dec!(80.0)), Figure::Known(dec!(4))),
        ];
        sort_candidates(&mut cs);
        assert_eq!(
            margins(&cs),
            vec![Figure::Known(dec!(80.0)), Figure::Known(dec!(50.0)), Figure::Unknown]
        );
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut cs = vec![
            candidate("first", Figure::Unknown, Figure::Unknown),
            candidate("second", Figure::Unknown, Figure::Unknown),
            candidate("x", Figure::Known(dec!(40)), Figure::Known(dec!(12))),
        ];
        sort_candidates(&mut cs);
        let names: Vec<&str> = cs.iter().map(|c| c.keyword().as_str()).collect();
        assert_eq!(names, vec!["x", "first", "second"]);
    }

    #[test]
    fn test_report_file_name() {
        let now = Utc.with_ymd_and_hms(2025, 7, 16, 9, 5, 0).unwrap();
        assert_eq!(report_file_name(now), "product_candidates_20250716_0905.csv");
    }

    #[test]
    fn test_row_rendering() {
        let row = ReportRow::from(&candidate("mug", Figure::Unknown, Figure::Unknown));
        assert_eq!(row.sell_price, "20.00");
        assert_eq!(row.cost_price, "n/a");
        assert_eq!(row.margin_pct, "n/a");

        let row = ReportRow::from(&candidate(
            "mug",
            Figure::Known(dec!(50)),
            Figure::Known(Decimal::TEN),
        ));
        assert_eq!(row.cost_price, "10.00");
        assert_eq!(row.margin_pct, "50.0");
    }

    #[test]
    fn test_write_report_sorted_csv() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 0).unwrap();
        let mut cs = vec![
            candidate("a", Figure::Known(dec!(50.0)), Figure::Known(dec!(10))),
            candidate("b", Figure::Unknown, Figure::Unknown),
            candidate("c", Figure::Known(dec!(80.0)), Figure::Known(dec!(4))),
        ];

        let path = write_report(dir.path(), &mut cs, now).unwrap();
        assert!(path.ends_with("product_candidates_20250102_0304.csv"));

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "keyword,region,sell_price,cost_price,margin_pct,listing_count",
                "c,US,20.00,4.00,80.0,42",
                "a,US,20.00,10.00,50.0,42",
                "b,US,20.00,n/a,n/a,42",
            ]
        );
    }

    #[test]
    fn test_preview_limits_rows() {
        let cs: Vec<Candidate> = (0..25)
            .map(|i| candidate(&format!("kw{i}"), Figure::Unknown, Figure::Unknown))
            .collect();
        let table = preview_table(&cs, PREVIEW_ROWS);
        assert!(table.contains("kw19"));
        assert!(!table.contains("kw20"));
        assert!(table.contains("margin_pct"));
    }
}
