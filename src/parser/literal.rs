use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::schema::DataType;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(NotNan<f64>),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Null,
}

impl Literal {
    /// Type of the literal; NULL has none until it is coerced.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Literal::String(_) => Some(DataType::Varchar),
            Literal::Int(i) if i32::try_from(*i).is_ok() => Some(DataType::Integer),
            Literal::Int(_) => Some(DataType::BigInt),
            Literal::Float(_) => Some(DataType::Double),
            Literal::Bool(_) => Some(DataType::Boolean),
            Literal::Date(_) => Some(DataType::Date),
            Literal::Timestamp(_) => Some(DataType::Timestamp),
            Literal::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(n) => write!(f, "{}", n.into_inner()),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Date(d) => write!(f, "DATE '{}'", d.format("%Y-%m-%d")),
            Literal::Timestamp(ts) => write!(f, "TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            Literal::Null => write!(f, "null"),
        }
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(_) => write!(f, "String({})", self),
            Literal::Int(_) => write!(f, "Int({})", self),
            Literal::Float(_) => write!(f, "Float({})", self),
            Literal::Bool(_) => write!(f, "Bool({})", self),
            Literal::Date(_) => write!(f, "Date({})", self),
            Literal::Timestamp(_) => write!(f, "Timestamp({})", self),
            Literal::Null => write!(f, "Null"),
        }
    }
}
