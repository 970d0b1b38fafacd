//! Arrow record batch ingestion

use arrow::array::*;
use arrow::record_batch::RecordBatch;
use reader_core::{ReaderError, Result, Row, Value};

/// Convert record batches into rows, keeping column order.
///
/// Supports Boolean, Int32, Int64, Float64 and Utf8 columns.
pub fn rows_from_batches(batches: &[RecordBatch]) -> Result<Vec<Row>> {
    let mut rows = Vec::with_capacity(batches.iter().map(|b| b.num_rows()).sum());

    for batch in batches {
        let schema = batch.schema();
        let columns = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, array)| {
                column_values(array).ok_or_else(|| {
                    ReaderError::ExecutionError(format!(
                        "Unsupported type {} for column '{}'",
                        field.data_type(),
                        field.name()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for row_idx in 0..batch.num_rows() {
            let mut row = Row::new();
            for (field, values) in schema.fields().iter().zip(&columns) {
                row.set(field.name().as_str(), values[row_idx].clone());
            }
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Extract every value of a column, `None` for unsupported array types
fn column_values(array: &ArrayRef) -> Option<Vec<Value>> {
    fn collect<A: Array>(array: &A, value: impl Fn(&A, usize) -> Value) -> Vec<Value> {
        (0..array.len())
            .map(|i| {
                if array.is_null(i) {
                    Value::Null
                } else {
                    value(array, i)
                }
            })
            .collect()
    }

    let any = array.as_any();
    if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Some(collect(arr, |a, i| Value::Int64(a.value(i))))
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Some(collect(arr, |a, i| Value::Int64(a.value(i) as i64)))
    } else if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Some(collect(arr, |a, i| Value::Float64(a.value(i))))
    } else if let Some(arr) = any.downcast_ref::<StringArray>() {
        Some(collect(arr, |a, i| Value::Utf8(a.value(i).to_string())))
    } else if let Some(arr) = any.downcast_ref::<BooleanArray>() {
        Some(collect(arr, |a, i| Value::Boolean(a.value(i))))
    } else {
        None
    }
}
