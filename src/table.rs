// src/table.rs

use anyhow::{Context, Result};
use arrow::array::{Array, Int32Array};
use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use std::collections::BTreeSet;

use crate::schema::raw_schema;

/// Running table of every year merged so far.
///
/// The schema is fixed up front, so an early year with all-null incomes
/// cannot narrow a column's type for the years after it.
pub struct ResultTable {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Default for ResultTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultTable {
    pub fn new() -> Self {
        Self {
            schema: raw_schema(),
            batches: Vec::new(),
        }
    }

    /// Append one year's batch. The batch must carry the table schema exactly.
    pub fn append(&mut self, batch: RecordBatch) -> Result<()> {
        anyhow::ensure!(
            *batch.schema() == *self.schema,
            "batch schema {:?} does not match table schema",
            batch.schema()
        );
        self.batches.push(batch);
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Distinct years present in the table.
    pub fn years(&self) -> BTreeSet<i32> {
        let idx = self.schema.fields().len() - 1;
        self.batches
            .iter()
            .filter_map(|b| b.column(idx).as_any().downcast_ref::<Int32Array>())
            .flat_map(|arr| arr.values().to_vec())
            .collect()
    }

    /// Concatenate everything into one batch; an empty table yields a
    /// zero-row batch with the full schema.
    pub fn finish(self) -> Result<RecordBatch> {
        if self.batches.is_empty() {
            return Ok(RecordBatch::new_empty(self.schema));
        }
        concat_batches(&self.schema, &self.batches).context("concatenating yearly batches")
    }
}
