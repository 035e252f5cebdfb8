use anyhow::{Context, Result};
use arrow::{array::BooleanArray, compute::filter_record_batch};
use tracing::info;

use crate::report::ReportTable;

/// Negative-reporting terms the scan looks for. Fixed, lowercase, matched
/// as substrings of the folded status value.
pub const KEYWORDS: &[&str] = &[
    "late",
    "collection",
    "charge off",
    "charged off",
    "default",
    "repossession",
    "foreclosure",
];

/// Column-name fragments that mark a column as status-like.
const STATUS_NAME_HINTS: &[&str] = &["status", "remark"];

/// The status-like column picked for a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusColumn {
    pub index: usize,
    pub name: String,
}

/// Result of one scan pass over a parsed report.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// No column name contained "status" or "remark". A handled outcome,
    /// not a failure; the caller reports it and skips the scan.
    NoStatusColumn,
    /// A status-like column was found and no row matched a keyword.
    Clean { column: StatusColumn },
    /// At least one row matched. `matches` keeps the original cell values.
    Flagged {
        column: StatusColumn,
        matches: ReportTable,
    },
}

/// Pick the first column whose name, lower-cased, contains a status hint.
pub fn detect_status_column(report: &ReportTable) -> Option<StatusColumn> {
    report
        .column_names()
        .into_iter()
        .enumerate()
        .find_map(|(index, name)| {
            let folded = name.to_lowercase();
            STATUS_NAME_HINTS
                .iter()
                .any(|hint| folded.contains(hint))
                .then(|| StatusColumn { index, name })
        })
}

fn value_is_flagged(value: &str) -> bool {
    let folded = value.to_lowercase();
    KEYWORDS.iter().any(|kw| folded.contains(kw))
}

/// Scan the report's status-like column for negative-reporting keywords.
///
/// Values are folded to lowercase transiently for matching only; the
/// returned subset carries the rows exactly as uploaded. Null cells never
/// match.
pub fn scan_report(report: &ReportTable) -> Result<ScanOutcome> {
    let Some(column) = detect_status_column(report) else {
        return Ok(ScanOutcome::NoStatusColumn);
    };

    let values = report
        .column(column.index)
        .with_context(|| format!("reading column `{}`", column.name))?;
    let mask: BooleanArray = values
        .iter()
        .map(|opt| Some(opt.is_some_and(value_is_flagged)))
        .collect();

    let matches = filter_record_batch(report.batch(), &mask).context("filtering matched rows")?;
    info!(
        column = %column.name,
        matched = matches.num_rows(),
        scanned = report.num_rows(),
        "scan complete"
    );

    if matches.num_rows() == 0 {
        Ok(ScanOutcome::Clean { column })
    } else {
        Ok(ScanOutcome::Flagged {
            column,
            matches: ReportTable::new(matches),
        })
    }
}
