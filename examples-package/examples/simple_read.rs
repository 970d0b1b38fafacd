//! Simple Read Example
//!
//! Filters, sorts and pages an in-memory table and shows which calls hit the
//! engine and which are served from the reader's caches.

use anyhow::Result;
use examples_package::{init_tracing, sample_users};
use reader_core::Sort;
use reader_filter::FilterExpr;
use reader_select::SelectDataReader;
use reader_storage::MemoryQuery;

fn main() -> Result<()> {
    init_tracing();
    println!("=== Simple Read Example ===\n");

    let reader = SelectDataReader::new(MemoryQuery::new("users", sample_users()))?
        .with_filter(FilterExpr::any([
            FilterExpr::equals("status", "active"),
            FilterExpr::greater_than("rating", 3.5),
        ]))
        .with_sort(Sort::parse("-rating"));

    println!("Statement: {}", reader.statement()?);
    println!("Matching users: {}", reader.count()?);

    let page = reader.with_limit(2);
    println!("\nFirst page:");
    for row in page.read()?.iter() {
        println!("  {}", row);
    }

    // Served from the page just read, no new query
    if let Some(best) = page.read_one()? {
        println!("\nBest rated: {}", best);
    }

    let next = page.with_offset(2);
    println!("\nSecond page (streamed, not cached):");
    for row in next.iter()? {
        println!("  {}", row?);
    }

    println!("\nFirst page rows cache: {}", page.items_cache().stats().snapshot());
    println!("\n=== Done ===");
    Ok(())
}
