use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{parser::Literal, schema::normalize_identifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnParseNode {
    pub family: Option<String>,
    pub name: String,
    /// Written quoted, so it must match verbatim.
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionParseNode {
    pub name: String,
    pub args: Vec<ParseNode>,
    pub distinct: bool,
}

/// Parsed scalar expression as produced by the SQL parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseNode {
    Literal(Literal),
    Column(ColumnParseNode),
    /// Positional bind parameter, 1-based.
    Bind(usize),
    Function(FunctionParseNode),
    Arithmetic { op: ArithmeticOp, left: Box<ParseNode>, right: Box<ParseNode> },
    /// `*`
    Wildcard,
    /// `family.*`
    FamilyWildcard { family: String, case_sensitive: bool },
}

impl ParseNode {
    pub fn column(name: &str) -> Self {
        ParseNode::Column(ColumnParseNode { family: None, name: normalize_identifier(name, false), case_sensitive: false })
    }

    pub fn quoted_column(name: &str) -> Self {
        ParseNode::Column(ColumnParseNode { family: None, name: name.to_string(), case_sensitive: true })
    }

    pub fn family_column(family: &str, name: &str) -> Self {
        ParseNode::Column(ColumnParseNode {
            family: Some(normalize_identifier(family, false)),
            name: normalize_identifier(name, false),
            case_sensitive: false,
        })
    }

    pub fn literal(value: Literal) -> Self {
        ParseNode::Literal(value)
    }

    pub fn int(value: i64) -> Self {
        ParseNode::Literal(Literal::Int(value))
    }

    pub fn string(value: &str) -> Self {
        ParseNode::Literal(Literal::String(value.to_string()))
    }

    pub fn bind(index: usize) -> Self {
        ParseNode::Bind(index)
    }

    pub fn function(name: &str, args: Vec<ParseNode>) -> Self {
        ParseNode::Function(FunctionParseNode { name: name.to_ascii_uppercase(), args, distinct: false })
    }

    pub fn distinct_function(name: &str, args: Vec<ParseNode>) -> Self {
        ParseNode::Function(FunctionParseNode { name: name.to_ascii_uppercase(), args, distinct: true })
    }

    pub fn count_star() -> Self {
        ParseNode::function("COUNT", vec![ParseNode::Wildcard])
    }

    pub fn arithmetic(op: ArithmeticOp, left: ParseNode, right: ParseNode) -> Self {
        ParseNode::Arithmetic { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn family_wildcard(family: &str) -> Self {
        ParseNode::FamilyWildcard { family: normalize_identifier(family, false), case_sensitive: false }
    }

    /// Literal and bind nodes evaluate to the same value on every row.
    pub fn is_constant(&self) -> bool {
        matches!(self, ParseNode::Literal(_) | ParseNode::Bind(_))
    }

    pub fn children(&self) -> Vec<&ParseNode> {
        match self {
            ParseNode::Function(f) => f.args.iter().collect(),
            ParseNode::Arithmetic { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            _ => Vec::new(),
        }
    }
}

fn write_identifier(f: &mut fmt::Formatter<'_>, name: &str, case_sensitive: bool) -> fmt::Result {
    if case_sensitive {
        write!(f, "\"{}\"", name)
    } else {
        write!(f, "{}", name)
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseNode::Literal(l) => write!(f, "{}", l),
            ParseNode::Column(c) => {
                if let Some(family) = &c.family {
                    write_identifier(f, family, c.case_sensitive)?;
                    write!(f, ".")?;
                }
                write_identifier(f, &c.name, c.case_sensitive)
            }
            ParseNode::Bind(index) => write!(f, ":{}", index),
            ParseNode::Function(fun) => {
                write!(f, "{}(", fun.name)?;
                if fun.distinct {
                    write!(f, "DISTINCT ")?;
                }
                let args = fun.args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
                write!(f, "{})", args.join(", "))
            }
            ParseNode::Arithmetic { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            ParseNode::Wildcard => write!(f, "*"),
            ParseNode::FamilyWildcard { family, case_sensitive } => {
                write_identifier(f, family, *case_sensitive)?;
                write!(f, ".*")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_text_of_nested_expressions() {
        let node = ParseNode::arithmetic(
            ArithmeticOp::Add,
            ParseNode::function("sum", vec![ParseNode::family_column("a", "qty")]),
            ParseNode::int(1),
        );
        assert_eq!(node.to_string(), "(SUM(A.QTY) + 1)");
        assert_eq!(ParseNode::count_star().to_string(), "COUNT(*)");
        assert_eq!(ParseNode::distinct_function("count", vec![ParseNode::column("k")]).to_string(), "COUNT(DISTINCT K)");
        assert_eq!(ParseNode::quoted_column("mixedCase").to_string(), "\"mixedCase\"");
        assert_eq!(ParseNode::family_wildcard("cf").to_string(), "CF.*");
    }

    #[test]
    fn only_literals_and_binds_are_constant() {
        assert!(ParseNode::int(1).is_constant());
        assert!(ParseNode::bind(1).is_constant());
        assert!(!ParseNode::column("a").is_constant());
        assert!(!ParseNode::function("upper", vec![ParseNode::string("x")]).is_constant());
    }
}
