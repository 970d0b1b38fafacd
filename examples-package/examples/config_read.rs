//! Config Read Example
//!
//! Loads reader settings from JSON and applies them to an Arrow-backed table.

use anyhow::Result;
use examples_package::{init_tracing, sample_orders_batch};
use reader_select::{ReaderConfig, SelectDataReader};
use reader_storage::MemoryQuery;

const CONFIG: &str = r#"{
    "limit": 2,
    "sort": [["amount", "desc"]],
    "filter": ["all", ["equals", "shipped", true], ["greaterThanOrEqual", "amount", 20]]
}"#;

fn main() -> Result<()> {
    init_tracing();
    println!("=== Config Read Example ===\n");

    let query = MemoryQuery::from_batches("orders", &[sample_orders_batch()?])?;
    let config = ReaderConfig::from_json(CONFIG)?;
    let reader = SelectDataReader::new(query)?.with_config(config);

    println!("Statement: {}", reader.statement()?);
    println!("Shipped orders >= 20: {}", reader.count()?);
    for row in reader.read()?.iter() {
        println!("  {}", row);
    }

    // Page through the same filter
    for page in 1..=2 {
        let paged = reader.with_config(ReaderConfig {
            sort: reader.sort().cloned(),
            filter: reader.filter().cloned(),
            ..ReaderConfig::page(page, 1)
        });
        println!("\nPage {}: {}", page, paged.statement()?);
        for row in paged.read()?.iter() {
            println!("  {}", row);
        }
    }

    println!("\n=== Done ===");
    Ok(())
}
