use indexmap::IndexSet;

use crate::expression::Expression;

/// Every distinct expression compiled for the statement, subexpressions
/// included, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionManager {
    expressions: IndexSet<Expression>,
}

impl ExpressionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when a structurally equal expression is already known.
    pub fn add_if_absent(&mut self, expression: Expression) -> bool {
        self.expressions.insert(expression)
    }

    pub fn contains(&self, expression: &Expression) -> bool {
        self.expressions.contains(expression)
    }

    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.expressions.iter()
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}
