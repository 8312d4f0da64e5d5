// src/schema.rs

use anyhow::{Context, Result};
use arrow::array::{Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Place name, e.g. "Juneau city and borough, Alaska".
pub const NAME: &str = "NAME";
/// ACS variable: estimated total population.
pub const POPULATION_VAR: &str = "B01003_001E";
/// ACS variable: median household income (inflation-adjusted dollars).
pub const INCOME_VAR: &str = "B19013_001E";
pub const STATE: &str = "state";
pub const PLACE: &str = "place";
pub const YEAR: &str = "year";

/// Variables requested in the `get=` clause, in response order.
pub const REQUESTED_VARS: [&str; 3] = [NAME, POPULATION_VAR, INCOME_VAR];

/// The five columns every yearly response must carry, in table order.
pub const VALUE_COLUMNS: [&str; 5] = [NAME, POPULATION_VAR, INCOME_VAR, STATE, PLACE];

/// Map a raw column name to the name used in the final export.
pub fn export_name(raw: &str) -> &str {
    match raw {
        NAME => "name",
        POPULATION_VAR => "population",
        INCOME_VAR => "median_hh_income",
        other => other,
    }
}

fn fields(rename: bool) -> Vec<Field> {
    let name = |raw: &'static str| if rename { export_name(raw) } else { raw };
    vec![
        Field::new(name(NAME), DataType::Utf8, true),
        Field::new(name(POPULATION_VAR), DataType::Int64, true),
        Field::new(name(INCOME_VAR), DataType::Int64, true),
        Field::new(STATE, DataType::Utf8, true),
        Field::new(PLACE, DataType::Utf8, true),
        Field::new(YEAR, DataType::Int32, false),
    ]
}

/// Schema of reshaped yearly batches and of the accumulated table.
pub fn raw_schema() -> SchemaRef {
    Arc::new(Schema::new(fields(false)))
}

/// Same layout as [`raw_schema`] with the human-readable export names.
pub fn export_schema() -> SchemaRef {
    Arc::new(Schema::new(fields(true)))
}

/// One place in one survey year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceRow {
    pub name: Option<String>,
    pub population: Option<i64>,
    pub median_household_income: Option<i64>,
    pub state: Option<String>,
    pub place: Option<String>,
    pub year: i32,
}

fn string_col<'a>(batch: &'a RecordBatch, idx: usize) -> Result<&'a StringArray> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .with_context(|| format!("column {} is not Utf8", batch.schema().field(idx).name()))
}

fn int64_col<'a>(batch: &'a RecordBatch, idx: usize) -> Result<&'a Int64Array> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<Int64Array>()
        .with_context(|| format!("column {} is not Int64", batch.schema().field(idx).name()))
}

fn opt_str(arr: &StringArray, row: usize) -> Option<String> {
    (!arr.is_null(row)).then(|| arr.value(row).to_string())
}

fn opt_i64(arr: &Int64Array, row: usize) -> Option<i64> {
    (!arr.is_null(row)).then(|| arr.value(row))
}

impl PlaceRow {
    /// Read every row out of a batch laid out like [`raw_schema`] (or
    /// [`export_schema`]; only positions and types are checked).
    pub fn from_batch(batch: &RecordBatch) -> Result<Vec<PlaceRow>> {
        anyhow::ensure!(
            batch.num_columns() == VALUE_COLUMNS.len() + 1,
            "expected {} columns, found {}",
            VALUE_COLUMNS.len() + 1,
            batch.num_columns()
        );
        let names = string_col(batch, 0)?;
        let population = int64_col(batch, 1)?;
        let income = int64_col(batch, 2)?;
        let state = string_col(batch, 3)?;
        let place = string_col(batch, 4)?;
        let year = batch
            .column(5)
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("column year is not Int32")?;

        Ok((0..batch.num_rows())
            .map(|i| PlaceRow {
                name: opt_str(names, i),
                population: opt_i64(population, i),
                median_household_income: opt_i64(income, i),
                state: opt_str(state, i),
                place: opt_str(place, i),
                year: year.value(i),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_schema_renames_only_the_coded_columns() {
        let names: Vec<String> = export_schema()
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        assert_eq!(
            names,
            ["name", "population", "median_hh_income", "state", "place", "year"]
        );
    }

    #[test]
    fn raw_and_export_schema_share_types() {
        let raw = raw_schema();
        let export = export_schema();
        for (r, e) in raw.fields().iter().zip(export.fields()) {
            assert_eq!(r.data_type(), e.data_type());
            assert_eq!(r.is_nullable(), e.is_nullable());
        }
    }

    #[test]
    fn from_batch_on_empty_table() {
        let batch = RecordBatch::new_empty(raw_schema());
        assert!(PlaceRow::from_batch(&batch).unwrap().is_empty());
    }
}
