use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    aggregator::AggregateFunction,
    parser::{ArithmeticOp, Literal},
    schema::{ColumnDef, DataType},
};

/// Reference to a table column, resolved against the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnExpression {
    pub family: Option<String>,
    pub name: String,
    pub position: usize,
    pub data_type: DataType,
    pub nullable: bool,
}

impl From<&ColumnDef> for ColumnExpression {
    fn from(column: &ColumnDef) -> Self {
        Self {
            family: column.family.clone(),
            name: column.name.clone(),
            position: column.position,
            data_type: column.data_type,
            nullable: column.nullable,
        }
    }
}

/// Typed, compiled expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    Literal { value: Literal, data_type: Option<DataType> },
    Column(ColumnExpression),
    /// GROUP BY key at `index`, read back from the aggregated row key.
    GroupKey { index: usize, expression: Box<Expression> },
    /// Bind parameter; its type is unknown until coerced.
    Parameter { index: usize, data_type: Option<DataType> },
    Arithmetic { op: ArithmeticOp, left: Box<Expression>, right: Box<Expression>, data_type: DataType },
    Function { name: String, args: Vec<Expression>, data_type: Option<DataType>, nullable: bool },
    Aggregate(AggregateFunction),
    Coerce { expression: Box<Expression>, target: DataType },
}

impl Expression {
    pub fn literal(value: Literal) -> Self {
        let data_type = value.data_type();
        Expression::Literal { value, data_type }
    }

    pub fn column(column: &ColumnDef) -> Self {
        Expression::Column(column.into())
    }

    pub fn coerce(expression: Expression, target: DataType) -> Self {
        Expression::Coerce { expression: Box::new(expression), target }
    }

    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Expression::Literal { data_type, .. } => *data_type,
            Expression::Column(c) => Some(c.data_type),
            Expression::GroupKey { expression, .. } => expression.data_type(),
            Expression::Parameter { data_type, .. } => *data_type,
            Expression::Arithmetic { data_type, .. } => Some(*data_type),
            Expression::Function { data_type, .. } => *data_type,
            Expression::Aggregate(f) => Some(f.data_type),
            Expression::Coerce { target, .. } => Some(*target),
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Expression::Literal { value, .. } => value.is_null(),
            Expression::Column(c) => c.nullable,
            Expression::GroupKey { expression, .. } => expression.is_nullable(),
            Expression::Parameter { .. } => true,
            Expression::Arithmetic { left, right, .. } => left.is_nullable() || right.is_nullable(),
            Expression::Function { nullable, .. } => *nullable,
            Expression::Aggregate(f) => f.aggregator_is_nullable(),
            Expression::Coerce { expression, .. } => expression.is_nullable(),
        }
    }

    /// Evaluates to the same value for every row.
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Literal { .. } | Expression::Parameter { .. } => true,
            Expression::Column(_) | Expression::GroupKey { .. } | Expression::Aggregate(_) => false,
            Expression::Arithmetic { left, right, .. } => left.is_constant() && right.is_constant(),
            Expression::Function { args, .. } => args.iter().all(Expression::is_constant),
            Expression::Coerce { expression, .. } => expression.is_constant(),
        }
    }

    /// Evaluable from an aggregated row: built only from aggregate calls,
    /// GROUP BY keys and constants.
    pub fn is_aggregate(&self) -> bool {
        match self {
            Expression::Aggregate(_) | Expression::GroupKey { .. } => true,
            Expression::Literal { .. } | Expression::Parameter { .. } => true,
            Expression::Column(_) => false,
            other => other.children().into_iter().all(Expression::is_aggregate),
        }
    }

    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal { .. } | Expression::Column(_) | Expression::Parameter { .. } => Vec::new(),
            Expression::GroupKey { expression, .. } | Expression::Coerce { expression, .. } => vec![expression.as_ref()],
            Expression::Arithmetic { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expression::Function { args, .. } => args.iter().collect(),
            Expression::Aggregate(f) => f.args.iter().collect(),
        }
    }

    /// Calls `visit` for every aggregate function in the tree. Arguments of
    /// an aggregate are not descended into.
    pub fn for_each_aggregate<'e>(&'e self, visit: &mut impl FnMut(&'e AggregateFunction)) {
        match self {
            Expression::Aggregate(f) => visit(f),
            other => {
                for child in other.children() {
                    child.for_each_aggregate(visit);
                }
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal { value, .. } => write!(f, "{}", value),
            Expression::Column(c) => match &c.family {
                Some(family) => write!(f, "{}.{}", family, c.name),
                None => write!(f, "{}", c.name),
            },
            Expression::GroupKey { expression, .. } => write!(f, "{}", expression),
            Expression::Parameter { index, .. } => write!(f, ":{}", index),
            Expression::Arithmetic { op, left, right, .. } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expression::Function { name, args, .. } => {
                let args = args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
                write!(f, "{}({})", name, args.join(", "))
            }
            Expression::Aggregate(fun) => write!(f, "{}", fun),
            Expression::Coerce { expression, target } => write!(f, "CAST({} AS {})", expression, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::AggregateKind;

    fn col(name: &str, data_type: DataType, nullable: bool) -> Expression {
        Expression::Column(ColumnExpression { family: Some("F".into()), name: name.into(), position: 1, data_type, nullable })
    }

    #[test]
    fn aggregate_traversal_does_not_descend_into_aggregates() {
        let inner = AggregateFunction::new(AggregateKind::Sum, false, vec![col("A", DataType::Integer, true)], DataType::BigInt);
        let tree = Expression::Arithmetic {
            op: ArithmeticOp::Add,
            left: Box::new(Expression::Aggregate(inner.clone())),
            right: Box::new(Expression::literal(Literal::Int(1))),
            data_type: DataType::BigInt,
        };
        let mut seen = Vec::new();
        tree.for_each_aggregate(&mut |f| seen.push(f.clone()));
        assert_eq!(seen, vec![inner]);
    }

    #[test]
    fn constant_and_nullable_propagate_through_composites() {
        let lit = Expression::literal(Literal::Int(2));
        let sum = Expression::Arithmetic {
            op: ArithmeticOp::Multiply,
            left: Box::new(lit.clone()),
            right: Box::new(col("A", DataType::Integer, true)),
            data_type: DataType::BigInt,
        };
        assert!(lit.is_constant());
        assert!(!sum.is_constant());
        assert!(sum.is_nullable());
        assert_eq!(Expression::coerce(lit, DataType::BigInt).to_string(), "CAST(2 AS BIGINT)");
    }

    #[test]
    fn aggregate_shape_requires_every_column_to_be_a_group_key() {
        let a = col("A", DataType::Integer, true);
        let key = Expression::GroupKey { index: 0, expression: Box::new(a.clone()) };
        let plus = |left: Expression| Expression::Arithmetic {
            op: ArithmeticOp::Add,
            left: Box::new(left),
            right: Box::new(Expression::literal(Literal::Int(1))),
            data_type: DataType::BigInt,
        };
        assert!(!plus(a).is_aggregate());
        assert!(plus(key).is_aggregate());
        assert!(Expression::Aggregate(AggregateFunction::count_star()).is_aggregate());
    }
}
