use anyhow::{anyhow, Result};
use arrow::{
    array::{Array, StringArray},
    record_batch::RecordBatch,
};

/// An uploaded report held as a single record batch with all-Utf8 columns.
///
/// Column names and order come straight from the file's header row; every
/// cell is kept in its textual form so mixed-type source columns behave
/// uniformly downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    batch: RecordBatch,
}

impl ReportTable {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Column names in their original file order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// The column at `idx` as a string array. Columns are Utf8 by construction.
    pub fn column(&self, idx: usize) -> Result<&StringArray> {
        self.batch
            .column(idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| anyhow!("column {} is not a string column", idx))
    }

    /// The first `n` rows as a zero-copy slice of the underlying batch.
    pub fn head(&self, n: usize) -> ReportTable {
        let n = n.min(self.batch.num_rows());
        Self {
            batch: self.batch.slice(0, n),
        }
    }

    /// Materialize every row as textual cells. Null cells render empty.
    pub fn rows(&self) -> Result<Vec<Vec<String>>> {
        let cols: Vec<&StringArray> = (0..self.num_columns())
            .map(|i| self.column(i))
            .collect::<Result<_>>()?;

        let mut rows = Vec::with_capacity(self.num_rows());
        for r in 0..self.num_rows() {
            rows.push(
                cols.iter()
                    .map(|c| {
                        if c.is_null(r) {
                            String::new()
                        } else {
                            c.value(r).to_string()
                        }
                    })
                    .collect(),
            );
        }
        Ok(rows)
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }
}
