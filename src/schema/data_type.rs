use std::fmt;

use serde::{Deserialize, Serialize};

/// SQL data types understood by the projection compiler.
///
/// The declaration order is significant: it is the tie-breaker used when
/// aggregate functions are laid out for positional access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataType {
    /// BOOLEAN
    Boolean,
    /// TINYINT (1 byte)
    TinyInt,
    /// SMALLINT (2 bytes)
    SmallInt,
    /// INTEGER (4 bytes)
    Integer,
    /// BIGINT (8 bytes)
    BigInt,
    /// FLOAT (4 bytes)
    Float,
    /// DOUBLE (8 bytes)
    Double,
    /// DECIMAL (variable length)
    Decimal,
    /// CHAR(n), fixed by declared length
    Char,
    /// VARCHAR
    Varchar,
    /// DATE (8 bytes)
    Date,
    /// TIME (8 bytes)
    Time,
    /// TIMESTAMP (12 bytes)
    Timestamp,
    /// BINARY(n), fixed by declared length
    Binary,
    /// VARBINARY
    VarBinary,
}

impl DataType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::TinyInt => "TINYINT",
            DataType::SmallInt => "SMALLINT",
            DataType::Integer => "INTEGER",
            DataType::BigInt => "BIGINT",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Decimal => "DECIMAL",
            DataType::Char => "CHAR",
            DataType::Varchar => "VARCHAR",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Binary => "BINARY",
            DataType::VarBinary => "VARBINARY",
        }
    }

    /// Byte size of a value of this type when it does not depend on a
    /// declared length. CHAR and BINARY get their size from the column.
    pub fn byte_size(&self) -> Option<usize> {
        match self {
            DataType::Boolean | DataType::TinyInt => Some(1),
            DataType::SmallInt => Some(2),
            DataType::Integer | DataType::Float => Some(4),
            DataType::BigInt | DataType::Double | DataType::Date | DataType::Time => Some(8),
            DataType::Timestamp => Some(12),
            DataType::Decimal | DataType::Char | DataType::Varchar | DataType::Binary | DataType::VarBinary => None,
        }
    }

    /// Whether every value of the type occupies the same number of bytes.
    pub fn is_fixed_width(&self) -> bool {
        match self {
            DataType::Char | DataType::Binary => true,
            other => other.byte_size().is_some(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt
                | DataType::Float | DataType::Double | DataType::Decimal
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DataType::Char | DataType::Varchar)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date | DataType::Time | DataType::Timestamp)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, DataType::Binary | DataType::VarBinary)
    }

    /// Relaxed compatibility check used for coercion: values of the two types
    /// can be compared with each other, so one may be converted to the other.
    pub fn is_comparable_to(&self, other: DataType) -> bool {
        if *self == other {
            return true;
        }
        (self.is_numeric() && other.is_numeric())
            || (self.is_text() && other.is_text())
            || (self.is_temporal() && other.is_temporal())
            || (self.is_binary() && other.is_binary())
    }

    /// Promote two numeric types to the type used to evaluate arithmetic over
    /// both. Returns `None` when either side is not numeric.
    ///
    /// Integer math is evaluated as BIGINT, floating math as DOUBLE and
    /// DECIMAL dominates both.
    pub fn widen(a: DataType, b: DataType) -> Option<DataType> {
        use DataType::*;
        if !a.is_numeric() || !b.is_numeric() {
            return None;
        }
        Some(match (a, b) {
            (Decimal, _) | (_, Decimal) => Decimal,
            (Float, _) | (_, Float) | (Double, _) | (_, Double) => Double,
            _ => BigInt,
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}
