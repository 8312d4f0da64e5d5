// src/process/mod.rs
use anyhow::{bail, Context, Result};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use tracing::trace;

use crate::schema::{raw_schema, INCOME_VAR, NAME, PLACE, POPULATION_VAR, STATE, VALUE_COLUMNS};

pub mod convert;

/// A yearly response split into header and data rows.
///
/// The API answers with `[[header...], [row...], ...]`: every inner array is
/// one record, and the first one names the fields.
#[derive(Debug)]
pub struct RawTable {
    /// Field names from the first row.
    pub headers: Vec<String>,
    /// Remaining rows, each exactly `headers.len()` wide.
    pub rows: Vec<Vec<Option<String>>>,
}

fn cell_to_text(cell: &Value) -> Result<Option<String>> {
    Ok(match cell {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => bail!("unexpected nested value {}", other),
    })
}

impl RawTable {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let outer = payload.as_array().context("payload is not an array")?;
        let (head, body) = outer.split_first().context("payload is empty")?;

        let headers = head
            .as_array()
            .context("header row is not an array")?
            .iter()
            .map(|h| {
                h.as_str()
                    .map(str::to_string)
                    .with_context(|| format!("header cell {} is not a string", h))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(body.len());
        for (idx, row) in body.iter().enumerate() {
            let cells = row
                .as_array()
                .with_context(|| format!("row {} is not an array", idx + 1))?;
            if cells.len() != headers.len() {
                bail!(
                    "row {} has {} cells, header has {}",
                    idx + 1,
                    cells.len(),
                    headers.len()
                );
            }
            let cells = cells
                .iter()
                .map(cell_to_text)
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("row {}", idx + 1))?;
            rows.push(cells);
        }

        Ok(Self { headers, rows })
    }

    /// Transpose rows into one value vector per header field.
    pub fn columns(&self) -> Vec<Vec<Option<String>>> {
        (0..self.headers.len())
            .map(|c| self.rows.iter().map(|r| r[c].clone()).collect())
            .collect()
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("response has no {} column", name))
    }
}

/// Reshape one year's payload into a batch with the table schema.
///
/// Fails on anything that would leave the year half-loaded: an empty or
/// ragged payload, a header that does not name exactly the expected
/// columns, or a population/income cell that is not an integer.
pub fn reshape_year(payload: &Value, year: i32) -> Result<RecordBatch> {
    let raw = RawTable::from_payload(payload)?;

    if raw.headers.len() != VALUE_COLUMNS.len() {
        bail!(
            "expected columns {:?}, response has {:?}",
            VALUE_COLUMNS,
            raw.headers
        );
    }
    let mut columns = raw.columns();
    let mut take = |name: &str| -> Result<Vec<Option<String>>> {
        let idx = raw.index_of(name)?;
        Ok(std::mem::take(&mut columns[idx]))
    };

    let name = take(NAME)?;
    let population = take(POPULATION_VAR)?;
    let income = take(INCOME_VAR)?;
    let state = take(STATE)?;
    let place = take(PLACE)?;

    let len = raw.rows.len();
    trace!(year, rows = len, "reshaped");

    let arrays = vec![
        convert::to_utf8(&name),
        convert::to_int64(POPULATION_VAR, &population)?,
        convert::to_int64(INCOME_VAR, &income)?,
        convert::to_utf8(&state),
        convert::to_utf8(&place),
        convert::year_column(year, len),
    ];

    RecordBatch::try_new(raw_schema(), arrays)
        .with_context(|| format!("building batch for {}", year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PlaceRow;
    use serde_json::json;

    fn header() -> Value {
        json!(["NAME", "B01003_001E", "B19013_001E", "state", "place"])
    }

    #[test]
    fn juneau_2020() {
        let payload = json!([
            header(),
            ["Juneau city and borough, Alaska", "32000", "85000", "02", "05"]
        ]);
        let batch = reshape_year(&payload, 2020).unwrap();
        assert_eq!(batch.schema(), raw_schema());

        let rows = PlaceRow::from_batch(&batch).unwrap();
        assert_eq!(
            rows,
            vec![PlaceRow {
                name: Some("Juneau city and borough, Alaska".into()),
                population: Some(32000),
                median_household_income: Some(85000),
                state: Some("02".into()),
                place: Some("05".into()),
                year: 2020,
            }]
        );
    }

    #[test]
    fn header_only_gives_zero_rows() {
        let batch = reshape_year(&json!([header()]), 2011).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 6);
    }

    #[test]
    fn empty_payload_fails() {
        assert!(reshape_year(&json!([]), 2005).is_err());
        assert!(reshape_year(&json!({"error": "unknown variable"}), 2005).is_err());
    }

    #[test]
    fn ragged_row_fails() {
        let payload = json!([header(), ["Anchor Point CDP, Alaska", "2000", "50000", "02"]]);
        let err = reshape_year(&payload, 2010).unwrap_err();
        assert!(err.to_string().contains("row 1 has 4 cells"));
    }

    #[test]
    fn non_numeric_estimate_fails_the_year() {
        let payload = json!([
            header(),
            ["Adak city, Alaska", "300", "60000", "02", "00065"],
            ["Akhiok city, Alaska", "N/A", "40000", "02", "00140"]
        ]);
        assert!(reshape_year(&payload, 2014).is_err());
    }

    #[test]
    fn header_order_does_not_matter() {
        let payload = json!([
            ["state", "place", "NAME", "B19013_001E", "B01003_001E"],
            ["02", "00065", "Adak city, Alaska", "60000", "300"]
        ]);
        let rows = PlaceRow::from_batch(&reshape_year(&payload, 2016).unwrap()).unwrap();
        assert_eq!(rows[0].name.as_deref(), Some("Adak city, Alaska"));
        assert_eq!(rows[0].population, Some(300));
        assert_eq!(rows[0].median_household_income, Some(60000));
        assert_eq!(rows[0].place.as_deref(), Some("00065"));
    }

    #[test]
    fn unexpected_header_fails() {
        let missing = json!([
            ["NAME", "B01003_001E", "B19013_001E", "state", "county"],
            ["x", "1", "2", "02", "013"]
        ]);
        assert!(reshape_year(&missing, 2018).is_err());

        let extra = json!([
            ["NAME", "B01003_001E", "B19013_001E", "state", "place", "county"],
            ["x", "1", "2", "02", "05", "013"]
        ]);
        assert!(reshape_year(&extra, 2018).is_err());
    }

    #[test]
    fn null_and_numeric_cells() {
        let payload = json!([
            header(),
            ["Alatna CDP, Alaska", 12, null, "02", "01090"]
        ]);
        let rows = PlaceRow::from_batch(&reshape_year(&payload, 2019).unwrap()).unwrap();
        assert_eq!(rows[0].population, Some(12));
        assert_eq!(rows[0].median_household_income, None);
        assert_eq!(rows[0].year, 2019);
    }

    #[test]
    fn columns_transposes_rows() {
        let raw = RawTable::from_payload(&json!([["a", "b"], ["1", "2"], ["3", "4"]])).unwrap();
        assert_eq!(
            raw.columns(),
            vec![
                vec![Some("1".to_string()), Some("3".to_string())],
                vec![Some("2".to_string()), Some("4".to_string())],
            ]
        );
    }
}
