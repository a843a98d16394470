use crate::{
    compile::{CompileError, ExpressionCompiler, StatementContext},
    expression::Expression,
    parser::ParseNode,
};

/// Compiled GROUP BY clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupBy {
    expressions: Vec<Expression>,
}

impl GroupBy {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(expressions: Vec<Expression>) -> Self {
        Self { expressions }
    }

    /// Compiles the GROUP BY nodes and records their column reads in the
    /// context's scan. Aggregates may not appear in a grouping key.
    pub fn compile(ctx: &mut StatementContext, nodes: &[ParseNode]) -> Result<Self, CompileError> {
        let none = GroupBy::empty();
        let mut compiler = ExpressionCompiler::new(ctx, &none);
        let mut expressions = Vec::with_capacity(nodes.len());
        for node in nodes {
            let expression = compiler.compile(node)?;
            let mut has_aggregate = false;
            expression.for_each_aggregate(&mut |_| has_aggregate = true);
            if has_aggregate {
                return Err(CompileError::AggregateInGroupBy(node.to_string()));
            }
            expressions.push(expression);
        }

        let (read_set, recorded) = compiler.into_parts();
        ctx.scan.set_read_set(read_set.build());
        ctx.expression_manager = recorded;
        Ok(Self::new(expressions))
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    pub fn position_of(&self, expression: &Expression) -> Option<usize> {
        self.expressions.iter().position(|e| e == expression)
    }
}
