//! Custom Processor Example
//!
//! Registers the opt-in `not` processor and a user-defined `between`
//! operator, then shows what happens with an unknown tag.

use anyhow::Result;
use examples_package::{init_tracing, sample_users};
use reader_core::{CompareOp, Condition, ReaderError};
use reader_filter::{FilterExpr, FilterProcessor, Not, Operand, ProcessorRegistry};
use reader_select::SelectDataReader;
use reader_storage::MemoryQuery;
use std::sync::Arc;

/// `["between", field, low, high]`, both bounds inclusive
#[derive(Debug)]
struct Between;

impl FilterProcessor for Between {
    fn operator(&self) -> &str {
        "between"
    }

    fn condition(&self, operands: &[Operand], _: &ProcessorRegistry) -> reader_core::Result<Condition> {
        let (field, low, high) = match operands {
            [field, low, high] => (field.as_field(), low.as_value(), high.as_value()),
            _ => (None, None, None),
        };
        match (field, low, high) {
            (Some(field), Some(low), Some(high)) => Ok(Condition::All(vec![
                Condition::compare(field, CompareOp::GreaterEqual, low.clone()),
                Condition::compare(field, CompareOp::LessEqual, high.clone()),
            ])),
            _ => Err(ReaderError::InvalidFilter(
                "\"between\" expects a field name and two bounds".to_string(),
            )),
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    println!("=== Custom Processor Example ===\n");

    let reader = SelectDataReader::new(MemoryQuery::new("users", sample_users()))?
        .with_filter_processors([Arc::new(Not) as Arc<dyn FilterProcessor>, Arc::new(Between)]);

    println!("Registered operators: {:?}", reader.processors().operators());

    let mid_rated = reader.with_filter(FilterExpr::parse(r#"["between", "rating", 3, 4.6]"#)?);
    println!("\n{}", mid_rated.statement()?);
    for row in mid_rated.read()?.iter() {
        println!("  {}", row);
    }

    let not_disabled = reader.with_filter(FilterExpr::not(FilterExpr::equals("status", "disabled")));
    println!("\n{}", not_disabled.statement()?);
    println!("  {} users", not_disabled.count()?);

    // Unknown tags only fail once the reader is used
    let unknown = reader.with_filter(FilterExpr::new("regex", vec![]));
    match unknown.read() {
        Err(err) => println!("\nUnknown operator: {}", err),
        Ok(rows) => println!("\nUnexpected {} rows", rows.len()),
    }

    println!("\n=== Done ===");
    Ok(())
}
