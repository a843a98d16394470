use std::sync::Arc;

use crate::{
    aggregator::{AggregateFunction, AggregateImpl, AggregateKind},
    compile::{CompileError, ExpressionManager, GroupBy, StatementContext},
    expression::{Expression, TypeInference},
    parser::{ColumnParseNode, FunctionParseNode, ParseNode},
    scan::ReadSetBuilder,
    schema::ColumnDef,
};

/// Callbacks fired while a parse tree is compiled.
pub trait CompileHooks {
    /// A column reference was resolved against the table.
    fn resolve_column(&mut self, _node: &ColumnParseNode, _column: &ColumnDef) {}

    /// A compiled child was attached to a composite expression.
    fn add_element(&mut self, _element: &Expression) {}
}

impl CompileHooks for () {}

/// Turns parse nodes into typed expressions.
///
/// Column reads and compiled nodes are collected in the compiler's own
/// read-set builder and expression set, seeded from the statement context.
/// Nothing is written back to the context until the caller takes them with
/// [`ExpressionCompiler::into_parts`], so a failed compilation leaves the
/// context untouched.
pub struct ExpressionCompiler<'c, 'a> {
    ctx: &'c StatementContext<'a>,
    group_by: &'c GroupBy,
    read_set: ReadSetBuilder,
    expressions: ExpressionManager,
    aggregate_depth: usize,
}

impl<'c, 'a> ExpressionCompiler<'c, 'a> {
    pub fn new(ctx: &'c StatementContext<'a>, group_by: &'c GroupBy) -> Self {
        Self {
            ctx,
            group_by,
            read_set: ReadSetBuilder::from(ctx.scan.read_set()),
            expressions: ctx.expression_manager.clone(),
            aggregate_depth: 0,
        }
    }

    pub fn compile(&mut self, node: &ParseNode) -> Result<Expression, CompileError> {
        self.compile_with(node, &mut ())
    }

    pub fn compile_with<H: CompileHooks>(&mut self, node: &ParseNode, hooks: &mut H) -> Result<Expression, CompileError> {
        let expression = match node {
            ParseNode::Literal(value) => Expression::literal(value.clone()),
            ParseNode::Bind(index) => Expression::Parameter { index: *index, data_type: None },
            ParseNode::Column(column) => self.compile_column(column, hooks)?,
            ParseNode::Function(function) => {
                let registry = self.ctx.registry;
                match registry.get(&function.name) {
                    Some(aggregate) => self.compile_aggregate(node, function, aggregate, hooks)?,
                    None => self.compile_function(function, hooks)?,
                }
            }
            ParseNode::Arithmetic { op, left, right } => {
                let left = self.compile_element(left, hooks)?;
                let right = self.compile_element(right, hooks)?;
                let data_type = TypeInference::infer_arithmetic(*op, &left, &right)?;
                Expression::Arithmetic { op: *op, left: Box::new(left), right: Box::new(right), data_type }
            }
            // only valid as a whole select item or inside COUNT(*)
            ParseNode::Wildcard | ParseNode::FamilyWildcard { .. } => {
                return Err(CompileError::ColumnNotFound { name: node.to_string(), candidates: Vec::new() });
            }
        };

        let expression = self.wrap_group_by_expression(expression);
        self.expressions.add_if_absent(expression.clone());
        Ok(expression)
    }

    fn compile_element<H: CompileHooks>(&mut self, node: &ParseNode, hooks: &mut H) -> Result<Expression, CompileError> {
        let element = self.compile_with(node, hooks)?;
        hooks.add_element(&element);
        Ok(element)
    }

    fn compile_column<H: CompileHooks>(&mut self, node: &ColumnParseNode, hooks: &mut H) -> Result<Expression, CompileError> {
        let table = self.ctx.table;
        let column = table.column(node.family.as_deref(), &node.name)?;
        hooks.resolve_column(node, column);
        // row-key columns come with every row
        if let Some(family) = &column.family {
            self.read_set.add_column(family, &column.name);
        }
        Ok(Expression::column(column))
    }

    fn compile_function<H: CompileHooks>(&mut self, function: &FunctionParseNode, hooks: &mut H) -> Result<Expression, CompileError> {
        if function.distinct {
            return Err(CompileError::FunctionArgMismatch {
                name: function.name.clone(),
                expected: "no DISTINCT".into(),
                got: Vec::new(),
            });
        }
        let args = function
            .args
            .iter()
            .map(|arg| self.compile_element(arg, hooks))
            .collect::<Result<Vec<_>, _>>()?;
        let (data_type, nullable) = TypeInference::infer_function(&function.name, &args)?;
        Ok(Expression::Function { name: function.name.clone(), args, data_type, nullable })
    }

    fn compile_aggregate<H: CompileHooks>(
        &mut self,
        node: &ParseNode,
        function: &FunctionParseNode,
        aggregate: Arc<dyn AggregateImpl>,
        hooks: &mut H,
    ) -> Result<Expression, CompileError> {
        if self.aggregate_depth > 0 {
            return Err(CompileError::AggregateInAggregate(node.to_string()));
        }
        if function.distinct && !aggregate.allow_distinct() {
            return Err(CompileError::FunctionArgMismatch {
                name: function.name.clone(),
                expected: "no DISTINCT".into(),
                got: Vec::new(),
            });
        }

        let kind = aggregate.kind();
        // COUNT(*) aggregates no expression
        let arg_nodes: &[ParseNode] = match function.args.as_slice() {
            [ParseNode::Wildcard] if kind == AggregateKind::Count && !function.distinct => &[],
            args => args,
        };

        self.aggregate_depth += 1;
        let args = arg_nodes
            .iter()
            .map(|arg| self.compile_element(arg, hooks))
            .collect::<Result<Vec<_>, _>>();
        self.aggregate_depth -= 1;
        let args = args?;

        let data_type = aggregate.infer_type(&args)?;
        Ok(Expression::Aggregate(AggregateFunction::new(kind, function.distinct, args, data_type)))
    }

    /// Outside of aggregate arguments, an expression equal to a GROUP BY
    /// expression is read back from the aggregated row key.
    fn wrap_group_by_expression(&self, expression: Expression) -> Expression {
        if self.aggregate_depth > 0 || expression.is_constant() {
            return expression;
        }
        match self.group_by.position_of(&expression) {
            Some(index) => Expression::GroupKey { index, expression: Box::new(expression) },
            None => expression,
        }
    }

    pub fn expressions(&self) -> &ExpressionManager {
        &self.expressions
    }

    pub fn into_parts(self) -> (ReadSetBuilder, ExpressionManager) {
        (self.read_set, self.expressions)
    }
}
