use crate::expr::FilterExpr;
use crate::processor::ProcessorRegistry;
use reader_core::{Condition, Predicate, Result, WhereBuilder};
use std::sync::Arc;
use tracing::trace;

/// A filter bound to the registry it will be translated with.
///
/// This is what the reader hands to the engine's `and_where`; translation
/// happens when the engine invokes [`Predicate::build`].
#[derive(Debug, Clone)]
pub struct FilterPredicate {
    filter: Arc<FilterExpr>,
    processors: ProcessorRegistry,
}

impl FilterPredicate {
    /// Bind `filter` to `processors`
    pub fn new(filter: Arc<FilterExpr>, processors: ProcessorRegistry) -> Self {
        Self { filter, processors }
    }

    /// The untranslated filter
    pub fn filter(&self) -> &FilterExpr {
        &self.filter
    }

    /// Translate the filter through the bound registry
    pub fn condition(&self) -> Result<Condition> {
        self.processors.translate(&self.filter)
    }
}

impl Predicate for FilterPredicate {
    fn build(&self, builder: &mut dyn WhereBuilder) -> Result<()> {
        let condition = self.condition()?;
        trace!("Filter {} translated to {}", self.filter, condition);
        builder.where_condition(condition);
        Ok(())
    }
}
