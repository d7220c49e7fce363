//! Implementation of the template language.
//!
//! Includes the parser and runtime.
pub mod expression;
pub mod program;
pub mod statement;
pub mod term;

pub use expression::Expression;
pub use program::Program;
pub use statement::Statement;
pub use term::Term;

use super::escape::EscapeContext;
use super::helpers::HelperRegistry;

/// State carried through a single render call: the helper registry,
/// the active escape context, and the unresolved variable references
/// accumulated so far. One is constructed per render and discarded after.
pub struct RenderState<'a> {
    helpers: &'a HelperRegistry,
    context: EscapeContext,
    missing: Vec<String>,
}

impl<'a> RenderState<'a> {
    pub fn new(helpers: &'a HelperRegistry, context: EscapeContext) -> Self {
        Self {
            helpers,
            context,
            missing: Vec::new(),
        }
    }

    pub fn helpers(&self) -> &HelperRegistry {
        self.helpers
    }

    pub fn context(&self) -> EscapeContext {
        self.context
    }

    /// Record an unresolved variable reference. Recorded once per name,
    /// in order of first appearance.
    pub fn missing(&mut self, path: &str) {
        if !self.missing.iter().any(|p| p == path) {
            tracing::warn!(variable = path, "undefined template variable rendered as empty string");
            self.missing.push(path.to_string());
        }
    }

    pub fn into_missing(self) -> Vec<String> {
        self.missing
    }
}
