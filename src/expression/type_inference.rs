use crate::{
    compile::CompileError,
    expression::Expression,
    parser::ArithmeticOp,
    schema::DataType,
};

#[derive(Default)]
pub struct TypeInference;

impl TypeInference {
    pub fn infer_arithmetic(op: ArithmeticOp, left: &Expression, right: &Expression) -> Result<DataType, CompileError> {
        use DataType::*;
        let mismatch = |got: Vec<DataType>| CompileError::FunctionArgMismatch {
            name: op.symbol().to_string(),
            expected: "numeric or temporal operands".into(),
            got,
        };

        match (left.data_type(), right.data_type()) {
            (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => {
                DataType::widen(l, r).ok_or_else(|| mismatch(vec![l, r]))
            }
            // date +/- days
            (Some(l), Some(r)) if l.is_temporal() && r.is_integral() && matches!(op, ArithmeticOp::Add | ArithmeticOp::Subtract) => Ok(l),
            (Some(l), Some(r)) if l.is_integral() && r.is_temporal() && op == ArithmeticOp::Add => Ok(r),
            // days between two dates
            (Some(l), Some(r)) if l.is_temporal() && r.is_temporal() && op == ArithmeticOp::Subtract => Ok(BigInt),
            // an untyped side (bind parameter, NULL) takes the other side's type
            (Some(known), None) | (None, Some(known)) if known.is_numeric() => Ok(DataType::widen(known, known).unwrap_or(Decimal)),
            (Some(known), None) if known.is_temporal() => Ok(known),
            (None, None) => Ok(Decimal),
            (l, r) => Err(mismatch(l.into_iter().chain(r).collect())),
        }
    }

    /// Built-in scalar functions: result type and nullability.
    pub fn infer_function(name: &str, args: &[Expression]) -> Result<(Option<DataType>, bool), CompileError> {
        let lname = name.to_ascii_lowercase();
        let arg_types: Vec<(Option<DataType>, bool)> = args.iter().map(|a| (a.data_type(), a.is_nullable())).collect();
        let mismatch = |expected: &str| CompileError::FunctionArgMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            got: arg_types.iter().filter_map(|(t, _)| *t).collect(),
        };

        match (lname.as_str(), arg_types.as_slice()) {
            ("upper", [(t, nullable)]) |
            ("lower", [(t, nullable)]) |
            ("trim", [(t, nullable)]) => match t {
                Some(t) if t.is_text() => Ok((Some(DataType::Varchar), *nullable)),
                None => Ok((Some(DataType::Varchar), true)),
                Some(_) => Err(mismatch("VARCHAR")),
            },
            ("upper" | "lower" | "trim", _) => Err(mismatch("one VARCHAR argument")),

            ("length", [(t, nullable)]) => match t {
                Some(t) if t.is_text() || t.is_binary() => Ok((Some(DataType::Integer), *nullable)),
                None => Ok((Some(DataType::Integer), true)),
                Some(_) => Err(mismatch("VARCHAR or VARBINARY")),
            },
            ("length", _) => Err(mismatch("one argument")),

            // COALESCE(a, b, ...) -> common type, null only if every input may be
            ("coalesce", many) if !many.is_empty() => {
                let mut ty: Option<DataType> = None;
                let mut all_nullable = true;
                for (t, nullable) in many.iter().copied() {
                    ty = match (ty, t) {
                        (None, t) => t,
                        (Some(a), None) => Some(a),
                        (Some(a), Some(b)) if a == b => Some(a),
                        (Some(a), Some(b)) if a.is_comparable_to(b) => DataType::widen(a, b).or(Some(a)),
                        (Some(_), Some(_)) => return Err(mismatch("arguments of comparable types")),
                    };
                    all_nullable = all_nullable && nullable;
                }
                Ok((ty, all_nullable))
            }

            _ => Err(CompileError::FunctionNotFound(name.to_string())),
        }
    }
}
