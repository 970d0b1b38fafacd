use crate::expr::{FilterExpr, Operand};
use crate::processors::{
    All, Any, Equals, GreaterThan, GreaterThanOrEqual, In, LessThan, LessThanOrEqual, Like,
};
use reader_core::{Condition, ReaderError, Result};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Translates the operands of one operator tag into a [`Condition`].
pub trait FilterProcessor: Debug + Send + Sync {
    /// Tag this processor is registered under
    fn operator(&self) -> &str;

    /// Build the condition. `processors` is the full registry so composite
    /// operators can resolve nested expressions.
    fn condition(&self, operands: &[Operand], processors: &ProcessorRegistry) -> Result<Condition>;
}

/// Processors keyed by operator tag.
///
/// Cloning is cheap; registration copies the table only when it is shared.
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    processors: Arc<HashMap<String, Arc<dyn FilterProcessor>>>,
}

impl ProcessorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in processor except `not`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.extend([
            Arc::new(All) as Arc<dyn FilterProcessor>,
            Arc::new(Any),
            Arc::new(Equals),
            Arc::new(GreaterThan),
            Arc::new(GreaterThanOrEqual),
            Arc::new(In),
            Arc::new(LessThan),
            Arc::new(LessThanOrEqual),
            Arc::new(Like),
        ]);
        registry
    }

    /// Register a processor, replacing any previous one with the same tag
    pub fn register(&mut self, processor: Arc<dyn FilterProcessor>) {
        Arc::make_mut(&mut self.processors).insert(processor.operator().to_string(), processor);
    }

    /// Register several processors in order; later ones win on equal tags
    pub fn extend(&mut self, processors: impl IntoIterator<Item = Arc<dyn FilterProcessor>>) {
        for processor in processors {
            self.register(processor);
        }
    }

    /// Processor registered for `operator`
    pub fn get(&self, operator: &str) -> Option<&Arc<dyn FilterProcessor>> {
        self.processors.get(operator)
    }

    /// Whether `operator` has a processor
    pub fn contains(&self, operator: &str) -> bool {
        self.processors.contains_key(operator)
    }

    /// Registered tags, sorted
    pub fn operators(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.processors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Number of registered processors
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether no processor is registered
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Translate a filter expression by dispatching on its tag
    pub fn translate(&self, filter: &FilterExpr) -> Result<Condition> {
        let processor = self
            .get(filter.tag())
            .ok_or_else(|| ReaderError::UnsupportedOperator(filter.tag().to_string()))?;
        processor.condition(filter.operands(), self)
    }
}

impl Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("operators", &self.operators())
            .finish()
    }
}
