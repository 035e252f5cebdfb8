use anyhow::{anyhow, Context, Result};
use arrow::{
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{io::Cursor, sync::Arc};
use tracing::debug;

use crate::report::table::ReportTable;

/// Rows per read batch. Uploads are small; one batch is the common case.
const BATCH_SIZE: usize = 8192;

/// Parse an uploaded delimited-text report into a [`ReportTable`].
///
/// The header row supplies the column names; every column is read as
/// nullable Utf8 so mixed-type sources survive intact. Any reader failure
/// is propagated with context so the caller can surface the cause.
pub fn parse_report(data: &[u8]) -> Result<ReportTable> {
    let format = Format::default().with_header(true);

    let (inferred, _) = format
        .infer_schema(Cursor::new(data), Some(0))
        .context("reading the header row")?;

    if inferred.fields().is_empty() {
        return Err(anyhow!("the file contains no columns"));
    }

    // Re-type every column as nullable Utf8; values stay textual.
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .with_quote(b'"')
        .with_escape(b'"')
        .with_delimiter(b',')
        .build(Cursor::new(data))
        .context("creating CSV reader")?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch.context("reading CSV rows")?);
    }

    let batch = if batches.is_empty() {
        RecordBatch::new_empty(schema)
    } else {
        arrow::compute::concat_batches(&schema, &batches).context("concatenating CSV batches")?
    };

    debug!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "parsed report"
    );
    Ok(ReportTable::new(batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_parse_simple_report() -> Result<()> {
        let csv = "Account,Status,Balance\nChase,Open,100\nAmex,Late,2500\n";
        let table = parse_report(csv.as_bytes())?;

        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column_names(), vec!["Account", "Status", "Balance"]);
        assert_eq!(table.column(1)?.value(1), "Late");
        Ok(())
    }

    #[test]
    fn test_numeric_columns_stay_textual() -> Result<()> {
        let csv = "Account,Balance\nChase,100\nAmex,99.5\n";
        let table = parse_report(csv.as_bytes())?;

        let balances = table.column(1)?;
        assert_eq!(balances.value(0), "100");
        assert_eq!(balances.value(1), "99.5");
        Ok(())
    }

    #[test]
    fn test_quoted_fields_with_embedded_commas() -> Result<()> {
        let csv = "Account,Remarks\n\"Chase, N.A.\",\"Paid, as agreed\"\n";
        let table = parse_report(csv.as_bytes())?;

        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.column(0)?.value(0), "Chase, N.A.");
        assert_eq!(table.column(1)?.value(0), "Paid, as agreed");
        Ok(())
    }

    #[test]
    fn test_header_only_report_is_empty() -> Result<()> {
        let table = parse_report(b"Account,Status\n")?;

        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 2);
        Ok(())
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(parse_report(b"").is_err());
    }

    #[test]
    fn test_ragged_rows_surface_the_cause() {
        let err = parse_report(b"Account,Status\nChase,Open,extra,fields\n").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("reading CSV rows"), "unexpected error: {msg}");
    }

    #[test]
    fn test_head_slices_first_rows() -> Result<()> {
        let csv = "N\n1\n2\n3\n4\n5\n6\n7\n";
        let table = parse_report(csv.as_bytes())?;

        let head = table.head(5);
        assert_eq!(head.num_rows(), 5);
        assert_eq!(head.column(0)?.value(4), "5");

        // Shorter tables are returned whole.
        assert_eq!(table.head(100).num_rows(), 7);
        Ok(())
    }

    #[test]
    fn test_rows_render_textually() -> Result<()> {
        let csv = "Account,Balance\nChase,100\n";
        let table = parse_report(csv.as_bytes())?;

        assert_eq!(table.rows()?, vec![vec!["Chase".to_string(), "100".to_string()]]);
        Ok(())
    }
}
