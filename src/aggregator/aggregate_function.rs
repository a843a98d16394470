use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

use crate::{expression::Expression, schema::DataType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AggregateKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateKind {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateKind::Count => "COUNT",
            AggregateKind::Sum => "SUM",
            AggregateKind::Avg => "AVG",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
        }
    }

    /// Every aggregate but COUNT yields NULL over an empty input.
    pub fn is_nullable(&self) -> bool {
        !matches!(self, AggregateKind::Count)
    }
}

/// A compiled aggregate call. Equality and hashing cover the whole call, so
/// two textually identical calls in a select list collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateFunction {
    pub kind: AggregateKind,
    pub distinct: bool,
    /// Empty for `COUNT(*)`.
    pub args: Vec<Expression>,
    pub data_type: DataType,
}

impl AggregateFunction {
    pub fn new(kind: AggregateKind, distinct: bool, args: Vec<Expression>, data_type: DataType) -> Self {
        Self { kind, distinct, args, data_type }
    }

    pub fn count_star() -> Self {
        Self::new(AggregateKind::Count, false, Vec::new(), DataType::BigInt)
    }

    pub fn aggregator_is_nullable(&self) -> bool {
        self.kind.is_nullable()
    }

    /// The expression being aggregated, if any.
    pub fn aggregator_expression(&self) -> Option<&Expression> {
        self.args.first()
    }

    pub fn aggregator_expression_is_nullable(&self) -> bool {
        self.aggregator_expression().is_some_and(Expression::is_nullable)
    }

    pub fn is_constant_expression(&self) -> bool {
        self.args.iter().all(Expression::is_constant)
    }

    /// Nullability of the function's slot in the aggregated row. Without
    /// grouping every row of the input may be filtered out, so the
    /// aggregator's own nullability decides; with grouping a group always
    /// has at least one row, so only the aggregated value can be NULL.
    pub fn is_nullable_in(&self, grouped: bool) -> bool {
        if grouped {
            self.aggregator_expression_is_nullable()
        } else {
            self.aggregator_is_nullable()
        }
    }

    /// Deterministic layout order of aggregated rows: non-null slots form a
    /// prefix, fixed-width results come before variable-width ones.
    pub fn schema_order(a: &Self, b: &Self) -> Ordering {
        a.aggregator_is_nullable()
            .cmp(&b.aggregator_is_nullable())
            .then(a.aggregator_expression_is_nullable().cmp(&b.aggregator_expression_is_nullable()))
            .then(b.is_constant_expression().cmp(&a.is_constant_expression()))
            .then(b.data_type.is_fixed_width().cmp(&a.data_type.is_fixed_width()))
            .then(a.data_type.cmp(&b.data_type))
            .then_with(|| a.to_string().cmp(&b.to_string()))
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind.name())?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        if self.args.is_empty() {
            write!(f, "*")?;
        } else {
            let args = self.args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
            write!(f, "{}", args.join(", "))?;
        }
        write!(f, ")")
    }
}
