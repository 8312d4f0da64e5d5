use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int32Array, Int64Builder, StringArray};
use std::sync::Arc;

/// Text column as-is; nulls stay null.
pub fn to_utf8(values: &[Option<String>]) -> ArrayRef {
    Arc::new(values.iter().map(|v| v.as_deref()).collect::<StringArray>())
}

/// Strict text → Int64 cast. Any non-null cell that is not an integer fails
/// the whole column.
pub fn to_int64(column: &str, values: &[Option<String>]) -> Result<ArrayRef> {
    let mut b = Int64Builder::with_capacity(values.len());
    for (row, v) in values.iter().enumerate() {
        match v {
            Some(s) => {
                let n = s.parse::<i64>().with_context(|| {
                    format!("casting {} row {} ({:?}) to Int64", column, row, s)
                })?;
                b.append_value(n);
            }
            None => b.append_null(),
        }
    }
    Ok(Arc::new(b.finish()))
}

/// Constant `year` column of length `len`.
pub fn year_column(year: i32, len: usize) -> ArrayRef {
    Arc::new(Int32Array::from(vec![year; len]))
}
