//! Shared fixtures for the demos

use anyhow::Result;
use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use reader_core::Row;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Log to stderr, `RUST_LOG` overrides the `debug` default
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();
}

/// Six users with id, name, status and rating
pub fn sample_users() -> Vec<Row> {
    let users = [
        (1, "Alice", "active", 4.5),
        (2, "Bob", "disabled", 3.0),
        (3, "Carol", "active", 4.9),
        (4, "Dave", "active", 2.1),
        (5, "Eve", "pending", 3.7),
        (6, "Mallory", "disabled", 1.2),
    ];
    users
        .iter()
        .map(|(id, name, status, rating)| {
            Row::new()
                .with("id", *id)
                .with("name", *name)
                .with("status", *status)
                .with("rating", *rating)
        })
        .collect()
}

/// Five orders as one Arrow record batch
pub fn sample_orders_batch() -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("order_id", DataType::Int64, false),
        Field::new("customer", DataType::Utf8, false),
        Field::new("amount", DataType::Float64, false),
        Field::new("shipped", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(vec![100, 101, 102, 103, 104])),
            Arc::new(StringArray::from(vec![
                "Alice", "Bob", "Alice", "Carol", "Dave",
            ])),
            Arc::new(Float64Array::from(vec![25.0, 99.5, 12.75, 310.0, 45.0])),
            Arc::new(BooleanArray::from(vec![true, false, true, true, false])),
        ],
    )?;
    Ok(batch)
}
