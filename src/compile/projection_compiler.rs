use std::collections::HashMap;

use tracing::debug;

use crate::{
    aggregator::AGGREGATORS,
    compile::{
        AggregatePlanCompiler, CompileError, GroupBy, Projector, RowProjector, ScanProjectionPlanner,
        SelectClauseVisitor, StatementContext,
    },
    expression::Expression,
    parser::{ParseNode, SelectStatement},
    schema::ColumnDef,
};

/// Compiles a SELECT list into projectors, the scan read-set and the
/// aggregation push-down.
///
/// The statement context is only updated once the whole list compiled:
/// on error the scan, bind metadata and aggregators are left as they were.
pub struct ProjectionCompiler;

impl ProjectionCompiler {
    pub fn compile(ctx: &mut StatementContext, statement: &SelectStatement, group_by: &GroupBy) -> Result<RowProjector, CompileError> {
        Self::compile_with_targets(ctx, statement, group_by, &[])
    }

    /// As [`ProjectionCompiler::compile`], coercing the i-th select item to
    /// the type of `target_columns[i]` when there is one (UPSERT SELECT).
    pub fn compile_with_targets(
        ctx: &mut StatementContext,
        statement: &SelectStatement,
        group_by: &GroupBy,
        target_columns: &[ColumnDef],
    ) -> Result<RowProjector, CompileError> {
        let table = ctx.table;
        let mut projectors = Vec::with_capacity(statement.select.len());
        let mut wildcard = false;
        let mut projected_families: Vec<String> = Vec::new();

        let visited = {
            let mut visitor = SelectClauseVisitor::new(ctx, statement, group_by);
            for (index, item) in statement.select.iter().enumerate() {
                match &item.node {
                    ParseNode::Wildcard => {
                        if statement.is_aggregate {
                            return Err(CompileError::non_aggregate(&item.node));
                        }
                        wildcard = true;
                        for column in table.columns.iter().skip(table.first_projectable_position()) {
                            projectors.push(Projector::new(column.name.clone(), table.name.clone(), Expression::column(column), false));
                        }
                    }
                    ParseNode::FamilyWildcard { family, .. } => {
                        if statement.is_aggregate {
                            return Err(CompileError::non_aggregate(&item.node));
                        }
                        let family = table.column_family(family)?;
                        projected_families.push(family.name.clone());
                        for column in family.columns.values() {
                            projectors.push(Projector::new(column.name.clone(), table.name.clone(), Expression::column(column), false));
                        }
                    }
                    _ => projectors.push(visitor.compile_item(item, target_columns.get(index))?),
                }
            }
            visitor.finish()
        };

        let plan = AggregatePlanCompiler::compile(&visited.expressions, group_by);
        let read_set = ScanProjectionPlanner::plan(table, visited.read_set, wildcard, &projected_families);
        let estimated_byte_size = RowProjector::estimate_byte_size(table, &read_set, &ctx.config)?;
        let aggregation = match &plan {
            Some(plan) => Some((plan.server_descriptor()?, plan.client_aggregators(ctx.registry)?)),
            None => None,
        };

        ctx.scan.set_read_set(read_set);
        ctx.expression_manager = visited.expressions;
        ctx.bind_manager = visited.bind_manager;
        match aggregation {
            Some((descriptor, aggregators)) => {
                ctx.scan.set_attribute(AGGREGATORS, descriptor);
                ctx.aggregation_manager.set_aggregators(aggregators);
            }
            None => {
                ctx.scan.remove_attribute(AGGREGATORS);
                ctx.aggregation_manager.clear();
            }
        }

        let project_empty_marker = ScanProjectionPlanner::must_project_empty_marker(table, wildcard);
        debug!(
            table = %table.name,
            projectors = projectors.len(),
            estimated_byte_size,
            project_empty_marker,
            "compiled projection"
        );
        Ok(RowProjector::new(projectors, estimated_byte_size, project_empty_marker))
    }

    /// Alias to select node, for clauses that may refer to select items by
    /// their alias.
    pub fn build_alias_map(statement: &SelectStatement) -> HashMap<String, ParseNode> {
        statement
            .select
            .iter()
            .filter_map(|item| item.alias.as_ref().map(|alias| (alias.clone(), item.node.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregator::{AggregateFunction, ClientAggregators, ServerAggregators},
        compile::CompilerConfig,
        parser::{AliasedNode, ArithmeticOp},
        scan::FamilySelection,
        schema::{DataType, Table, TableBuilder},
    };

    fn orders() -> Table {
        TableBuilder::new("ORDERS")
            .salted(4)
            .pk("ID", DataType::BigInt)
            .pk("REGION", DataType::Varchar)
            .column("A", "QTY", DataType::Integer, true)
            .column("A", "PRICE", DataType::Double, false)
            .column("A", "NOTE", DataType::Varchar, true)
            .column("B", "QTY", DataType::Integer, false)
            .column_with_length("B", "CODE", DataType::Char, true, 3)
            .build()
    }

    fn item(node: ParseNode) -> AliasedNode {
        AliasedNode::new(node)
    }

    fn a(name: &str) -> ParseNode {
        ParseNode::family_column("a", name)
    }

    fn b(name: &str) -> ParseNode {
        ParseNode::family_column("b", name)
    }

    fn names(projector: &RowProjector) -> Vec<&str> {
        projector.projectors().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn projectors_follow_select_order() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(
            vec![
                item(b("code")),
                AliasedNode::aliased(a("price"), "cost"),
                item(ParseNode::column("id")),
                item(ParseNode::function("upper", vec![a("note")])),
            ],
            vec![],
        );
        let projector = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile");
        assert_eq!(names(&projector), vec!["B.CODE", "COST", "ID", "UPPER(A.NOTE)"]);
        assert!(projector.projectors().iter().all(|p| p.table_name == "ORDERS"));
        assert!(projector.must_project_empty_marker());

        let read_set = ctx.scan.read_set();
        assert!(read_set.reads_column("A", "PRICE"));
        assert!(read_set.reads_column("A", "NOTE"));
        assert!(!read_set.reads_column("A", "QTY"));
        assert!(read_set.reads_column("B", "CODE"));
        assert!(ctx.aggregation_manager.aggregators().is_none());
        assert!(ctx.scan.attribute(AGGREGATORS).is_none());
    }

    #[test]
    fn wildcard_expands_every_column_but_the_salt_byte() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(vec![item(ParseNode::Wildcard)], vec![]);
        let projector = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile");

        assert_eq!(names(&projector), vec!["ID", "REGION", "QTY", "PRICE", "NOTE", "QTY", "CODE"]);
        assert!(projector.projectors().iter().all(|p| !p.case_sensitive));
        assert!(!projector.must_project_empty_marker());
        assert!(ctx.scan.read_set().reads_whole_family("A"));
        assert!(ctx.scan.read_set().reads_whole_family("B"));
    }

    #[test]
    fn family_wildcard_reads_the_whole_family() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(
            vec![item(a("qty")), item(ParseNode::family_wildcard("a")), item(b("qty"))],
            vec![],
        );
        let projector = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile");

        assert_eq!(names(&projector), vec!["A.QTY", "QTY", "PRICE", "NOTE", "B.QTY"]);
        let read_set = ctx.scan.read_set();
        assert_eq!(read_set.selection("A"), Some(&FamilySelection::All));
        assert!(matches!(read_set.selection("B"), Some(FamilySelection::Columns(cols)) if cols.len() == 1));
        assert!(projector.must_project_empty_marker());
    }

    #[test]
    fn unknown_family_wildcard_fails() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(vec![item(ParseNode::family_wildcard("z"))], vec![]);
        let err = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).unwrap_err();
        assert_eq!(err, CompileError::ColumnFamilyNotFound { family: "Z".into() });
    }

    #[test]
    fn wildcard_in_aggregate_statement_fails_without_side_effects() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(vec![item(ParseNode::count_star()), item(ParseNode::Wildcard)], vec![]);
        assert!(statement.is_aggregate);

        let err = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).unwrap_err();
        assert_eq!(err, CompileError::non_aggregate("*"));
        assert!(ctx.scan.read_set().is_empty());
        assert!(ctx.expression_manager.is_empty());
        assert!(ctx.aggregation_manager.aggregators().is_none());
    }

    #[test]
    fn plain_column_next_to_an_aggregate_fails() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(vec![item(a("note")), item(ParseNode::count_star())], vec![]);
        let err = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).unwrap_err();
        assert_eq!(err, CompileError::NonAggregateInAggregate { expression: "A.NOTE".into() });
        assert!(ctx.scan.read_set().is_empty());
    }

    #[test]
    fn grouped_sum_nullability_follows_the_summed_column() {
        let table = orders();
        for (column, expected) in [(a("qty"), 0), (b("qty"), 1)] {
            let mut ctx = StatementContext::new(&table);
            let group_nodes = vec![ParseNode::column("region")];
            let group_by = GroupBy::compile(&mut ctx, &group_nodes).expect("group by");
            let statement = SelectStatement::new(
                vec![item(ParseNode::function("sum", vec![column])), item(ParseNode::column("region"))],
                group_nodes,
            );
            let projector = ProjectionCompiler::compile(&mut ctx, &statement, &group_by).expect("compile");

            assert!(matches!(projector.projectors()[1].expression, Expression::GroupKey { index: 0, .. }));
            let aggregators = ctx.aggregation_manager.aggregators().expect("aggregators");
            assert_eq!(aggregators.len(), 1);
            assert_eq!(aggregators.functions()[0].to_string(), projector.projectors()[0].name);
            assert_eq!(aggregators.min_nullable_index(), expected);
        }
    }

    #[test]
    fn expressions_over_group_keys_are_allowed() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let group_nodes = vec![b("qty")];
        let group_by = GroupBy::compile(&mut ctx, &group_nodes).expect("group by");
        let statement = SelectStatement::new(
            vec![item(ParseNode::arithmetic(ArithmeticOp::Add, b("qty"), ParseNode::int(1))), item(ParseNode::count_star())],
            group_nodes,
        );
        let projector = ProjectionCompiler::compile(&mut ctx, &statement, &group_by).expect("compile");
        assert_eq!(names(&projector), vec!["(B.QTY + 1)", "COUNT(*)"]);
    }

    #[test]
    fn ungrouped_aggregates_use_aggregator_nullability() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(
            vec![item(ParseNode::function("sum", vec![b("qty")])), item(ParseNode::count_star())],
            vec![],
        );
        ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile");

        let aggregators = ctx.aggregation_manager.aggregators().expect("aggregators");
        let kinds: Vec<String> = aggregators.functions().iter().map(AggregateFunction::to_string).collect();
        assert_eq!(kinds, vec!["COUNT(*)", "SUM(B.QTY)"]);
        // B.QTY is NOT NULL, yet SUM over no rows is NULL
        assert_eq!(aggregators.min_nullable_index(), 1);
    }

    #[test]
    fn repeated_aggregates_share_one_slot() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let sum = ParseNode::function("sum", vec![a("qty")]);
        let statement = SelectStatement::new(
            vec![item(sum.clone()), item(ParseNode::arithmetic(ArithmeticOp::Multiply, sum, ParseNode::int(2)))],
            vec![],
        );
        ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile");
        assert_eq!(ctx.aggregation_manager.aggregators().expect("aggregators").len(), 1);
    }

    #[test]
    fn server_descriptor_matches_client_aggregators() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(
            vec![
                item(ParseNode::function("max", vec![a("note")])),
                item(ParseNode::function("avg", vec![a("price")])),
                item(ParseNode::distinct_function("count", vec![b("code")])),
                item(ParseNode::count_star()),
            ],
            vec![],
        );
        ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile");

        let bytes = ctx.scan.attribute(AGGREGATORS).expect("descriptor");
        let server = ServerAggregators::deserialize(bytes).expect("decode");
        assert_eq!(server.functions.len(), 4);
        let rebuilt = ClientAggregators::from_server(ctx.registry, server).expect("rebuild");
        let client = ctx.aggregation_manager.aggregators().expect("aggregators");
        assert_eq!(rebuilt.functions(), client.functions());
        assert_eq!(rebuilt.min_nullable_index(), client.min_nullable_index());
    }

    #[test]
    fn quoted_alias_on_an_expression_is_found_in_any_case() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(
            vec![AliasedNode::quoted_alias(ParseNode::arithmetic(ArithmeticOp::Add, a("qty"), ParseNode::int(1)), "Total")],
            vec![],
        );
        let projector = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile");
        let total = projector.projector(0).expect("projector");
        assert_eq!(total.name, "Total");
        assert!(!total.case_sensitive);
        assert_eq!(projector.column_index("Total"), Ok(0));
        assert_eq!(projector.column_index("TOTAL"), Ok(0));
        assert_eq!(projector.column_index("total"), Ok(0));
    }

    #[test]
    fn distinct_is_only_accepted_by_count() {
        let table = orders();
        for node in [
            ParseNode::distinct_function("sum", vec![a("qty")]),
            ParseNode::distinct_function("upper", vec![a("note")]),
        ] {
            let mut ctx = StatementContext::new(&table);
            let statement = SelectStatement::new(vec![item(b("code")), item(node)], vec![]).with_aggregate(false);
            let err = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).unwrap_err();
            assert!(matches!(err, CompileError::FunctionArgMismatch { .. }), "{err:?}");
            assert!(ctx.scan.read_set().is_empty());
            assert!(ctx.expression_manager.is_empty());
            assert!(ctx.bind_manager.is_empty());
            assert!(ctx.aggregation_manager.aggregators().is_none());
            assert!(ctx.scan.attribute(AGGREGATORS).is_none());
        }
    }

    #[test]
    fn plain_select_clears_a_previous_aggregate_descriptor() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        ctx.scan.set_attribute(AGGREGATORS, b"stale".to_vec());
        let statement = SelectStatement::new(vec![item(a("qty"))], vec![]);
        ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile");
        assert!(ctx.scan.attribute(AGGREGATORS).is_none());
        assert!(ctx.aggregation_manager.aggregators().is_none());
    }

    #[test]
    fn aggregates_stay_with_the_context_they_were_compiled_in() {
        let table = orders();
        let mut reused = StatementContext::new(&table);
        let count = SelectStatement::new(vec![item(ParseNode::count_star())], vec![]);
        ProjectionCompiler::compile(&mut reused, &count, &GroupBy::empty()).expect("count");

        let plain = SelectStatement::new(vec![item(a("qty"))], vec![]);
        ProjectionCompiler::compile(&mut reused, &plain, &GroupBy::empty()).expect("reused");
        assert!(reused.aggregation_manager.aggregators().is_some());

        let mut fresh = StatementContext::new(&table);
        ProjectionCompiler::compile(&mut fresh, &plain, &GroupBy::empty()).expect("fresh");
        assert!(fresh.aggregation_manager.aggregators().is_none());
        assert!(fresh.scan.attribute(AGGREGATORS).is_none());
    }

    #[test]
    fn wildcard_on_a_salted_table_without_columns_is_empty() {
        let mut table = orders();
        table.columns.clear();
        table.families.clear();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(vec![item(ParseNode::Wildcard)], vec![]);
        let projector = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile");
        assert!(projector.is_empty());
    }

    #[test]
    fn compiling_twice_gives_the_same_result() {
        let table = orders();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(
            vec![item(a("qty")), item(ParseNode::family_wildcard("b")), item(ParseNode::function("coalesce", vec![a("note"), ParseNode::string("-")]))],
            vec![],
        );
        let first = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("first");
        let first_read_set = ctx.scan.read_set().clone();
        let second = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("second");
        assert_eq!(first, second);
        assert_eq!(&first_read_set, ctx.scan.read_set());
    }

    #[test]
    fn byte_size_grows_with_the_read_set() {
        let table = orders();
        let compile = |nodes: Vec<ParseNode>| {
            let mut ctx = StatementContext::new(&table);
            let statement = SelectStatement::new(nodes.into_iter().map(item).collect(), vec![]);
            ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile").estimated_byte_size()
        };

        let key_only = compile(vec![ParseNode::column("id")]);
        let one = compile(vec![a("qty")]);
        let family = compile(vec![a("qty"), ParseNode::family_wildcard("a")]);
        let all = compile(vec![ParseNode::Wildcard]);

        assert_eq!(key_only, 0);
        // salt byte + BIGINT id + variable length region
        assert_eq!(one, 64 + (1 + 8 + 10) + 4);
        assert!(one > 0);
        assert!(family >= one);
        assert!(all >= family);
    }

    #[test]
    fn values_only_config_drops_the_cell_overhead() {
        let table = orders();
        let mut ctx = StatementContext::new(&table).with_config(CompilerConfig::values_only());
        let statement = SelectStatement::new(vec![item(a("qty"))], vec![]);
        let projector = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile");
        assert_eq!(projector.estimated_byte_size(), 19 + 4);
    }

    #[test]
    fn views_read_every_family() {
        let table = TableBuilder::new("V")
            .view()
            .pk("K", DataType::Varchar)
            .column("A", "X", DataType::Integer, true)
            .column("B", "Y", DataType::Integer, true)
            .build();
        let mut ctx = StatementContext::new(&table);
        let statement = SelectStatement::new(vec![item(ParseNode::column("x"))], vec![]);
        let projector = ProjectionCompiler::compile(&mut ctx, &statement, &GroupBy::empty()).expect("compile");
        assert!(!projector.must_project_empty_marker());
        assert!(ctx.scan.read_set().reads_whole_family("B"));
    }

    #[test]
    fn alias_map_lists_aliased_items() {
        let statement = SelectStatement::new(
            vec![AliasedNode::aliased(a("qty"), "q"), item(a("note")), AliasedNode::quoted_alias(b("qty"), "bQty")],
            vec![],
        );
        let aliases = ProjectionCompiler::build_alias_map(&statement);
        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases.get("Q"), Some(&a("qty")));
        assert_eq!(aliases.get("bQty"), Some(&b("qty")));
    }
}
