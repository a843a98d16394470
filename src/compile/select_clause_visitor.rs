use tracing::trace;

use crate::{
    compile::{BindManager, CompileError, CompileHooks, ExpressionCompiler, ExpressionManager, GroupBy, Projector, StatementContext},
    expression::Expression,
    parser::{AliasedNode, ColumnParseNode, ParseNode, SelectStatement},
    scan::ReadSetBuilder,
    schema::{ColumnDef, Table},
};

/// Case-sensitivity tracking for the item being compiled.
#[derive(Debug)]
struct ItemTracker {
    case_sensitive: bool,
    column_count: usize,
    element_count: usize,
}

impl ItemTracker {
    fn new() -> Self {
        Self { case_sensitive: true, column_count: 0, element_count: 0 }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    /// A bare reference to one quoted column.
    fn is_case_sensitive(&self) -> bool {
        self.case_sensitive && self.column_count == 1 && self.element_count == 0
    }
}

impl CompileHooks for ItemTracker {
    fn resolve_column(&mut self, node: &ColumnParseNode, _column: &ColumnDef) {
        self.column_count += 1;
        self.case_sensitive &= node.case_sensitive;
    }

    fn add_element(&mut self, _element: &Expression) {
        self.element_count += 1;
    }
}

/// What the visitor accumulated over the whole select list.
#[derive(Debug)]
pub struct VisitedSelect {
    pub read_set: ReadSetBuilder,
    pub expressions: ExpressionManager,
    pub bind_manager: BindManager,
}

/// Compiles ordinary select items one at a time.
pub struct SelectClauseVisitor<'c, 'a> {
    compiler: ExpressionCompiler<'c, 'a>,
    statement: &'c SelectStatement,
    table_name: &'a str,
    bind_manager: BindManager,
    tracker: ItemTracker,
}

impl<'c, 'a> SelectClauseVisitor<'c, 'a> {
    pub fn new(ctx: &'c StatementContext<'a>, statement: &'c SelectStatement, group_by: &'c GroupBy) -> Self {
        let table: &'a Table = ctx.table;
        Self {
            compiler: ExpressionCompiler::new(ctx, group_by),
            statement,
            table_name: &table.name,
            bind_manager: ctx.bind_manager.clone(),
            tracker: ItemTracker::new(),
        }
    }

    /// Compiles one non-wildcard item. `target` is the column the value is
    /// written to by an UPSERT SELECT; a differing type is coerced to it.
    pub fn compile_item(&mut self, item: &AliasedNode, target: Option<&ColumnDef>) -> Result<Projector, CompileError> {
        self.tracker.reset();
        let mut expression = self.compiler.compile_with(&item.node, &mut self.tracker)?;

        if let Some(target) = target {
            match expression.data_type() {
                Some(actual) if actual == target.data_type => {}
                Some(actual) if !actual.is_comparable_to(target.data_type) => {
                    return Err(CompileError::TypeMismatch {
                        expected: target.data_type,
                        actual,
                        context: format!("column: {}", target.qualified_name()),
                    });
                }
                _ => expression = Expression::coerce(expression, target.data_type),
            }
        }

        if let ParseNode::Bind(index) = &item.node {
            self.bind_manager.add_param_meta_data(*index, &expression);
        }

        if self.statement.is_aggregate && !expression.is_constant() && !expression.is_aggregate() {
            return Err(CompileError::non_aggregate(&item.node));
        }

        let name = match &item.alias {
            Some(alias) => alias.clone(),
            None => Self::default_name(&item.node),
        };
        let case_sensitive = item.alias_case_sensitive() && self.tracker.is_case_sensitive();
        trace!(name = %name, expression = %expression, case_sensitive, "compiled select item");

        Ok(Projector::new(name, self.table_name, expression, case_sensitive))
    }

    /// Column references are named without quoting; other nodes by their text.
    fn default_name(node: &ParseNode) -> String {
        match node {
            ParseNode::Column(ColumnParseNode { family: Some(family), name, .. }) => format!("{}.{}", family, name),
            ParseNode::Column(ColumnParseNode { family: None, name, .. }) => name.clone(),
            other => other.to_string(),
        }
    }

    pub fn finish(self) -> VisitedSelect {
        let (read_set, expressions) = self.compiler.into_parts();
        VisitedSelect { read_set, expressions, bind_manager: self.bind_manager }
    }
}
