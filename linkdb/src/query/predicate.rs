//! Predicate construction and single-value evaluation.

use super::path::FieldPath;
use crate::error::{LinkDbError, Result};
use crate::value::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Between,
}

impl Operator {
    fn requires_ordering(&self) -> bool {
        !matches!(self, Operator::Equal | Operator::NotEqual)
    }
}

/// One predicate of a query conjunction: a parsed path, an operator, and the
/// literal(s) it compares against.
#[derive(Debug, Clone)]
pub struct Predicate {
    pub path: FieldPath,
    op: Operator,
    literal: Value,
    /// Upper bound, present only for `Between`.
    upper: Option<Value>,
}

impl Predicate {
    pub fn new(path: FieldPath, op: Operator, literal: Value, upper: Option<Value>) -> Result<Self> {
        if op.requires_ordering() && !path.field_type.is_numeric() {
            return Err(LinkDbError::UnsupportedComparison {
                field_type: path.field_type.name().to_string(),
                field: path.raw.clone(),
            });
        }
        check_literal(&path, &literal)?;
        if let Some(upper) = &upper {
            check_literal(&path, upper)?;
        }
        Ok(Self {
            path,
            op,
            literal,
            upper,
        })
    }

    /// Evaluates this predicate against a single stored value.
    ///
    /// Stored values and literals carry the same tag by construction, so the
    /// comparisons below never cross variants.
    pub fn matches_value(&self, actual: &Value) -> bool {
        match self.op {
            Operator::Equal => values_equal(actual, &self.literal),
            Operator::NotEqual => !values_equal(actual, &self.literal),
            Operator::GreaterThan => {
                matches!(compare_values(actual, &self.literal), Some(Ordering::Greater))
            }
            Operator::GreaterThanOrEqual => matches!(
                compare_values(actual, &self.literal),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::LessThan => {
                matches!(compare_values(actual, &self.literal), Some(Ordering::Less))
            }
            Operator::LessThanOrEqual => matches!(
                compare_values(actual, &self.literal),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Between => {
                let lower_ok = matches!(
                    compare_values(actual, &self.literal),
                    Some(Ordering::Greater | Ordering::Equal)
                );
                let upper_ok = self.upper.as_ref().is_some_and(|upper| {
                    matches!(
                        compare_values(actual, upper),
                        Some(Ordering::Less | Ordering::Equal)
                    )
                });
                lower_ok && upper_ok
            }
        }
    }
}

fn check_literal(path: &FieldPath, literal: &Value) -> Result<()> {
    if literal.field_type() != path.field_type {
        return Err(LinkDbError::TypeMismatch {
            expected: path.field_type.name().to_string(),
            got: literal.type_name().to_string(),
        });
    }
    Ok(())
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Double(a), Value::Double(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}

/// Numeric ordering; `None` for mismatched tags or NaN operands, which makes
/// every ordering predicate a no-match.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use proptest::prelude::*;

    fn direct_path(field_type: FieldType) -> FieldPath {
        FieldPath {
            raw: "age".to_string(),
            hop: None,
            field: "age".to_string(),
            field_type,
        }
    }

    fn predicate(op: Operator, literal: Value, upper: Option<Value>) -> Predicate {
        Predicate::new(direct_path(literal.field_type()), op, literal, upper).unwrap()
    }

    #[test]
    fn test_int_comparisons() {
        assert!(predicate(Operator::Equal, Value::Int(10), None).matches_value(&Value::Int(10)));
        assert!(!predicate(Operator::Equal, Value::Int(10), None).matches_value(&Value::Int(9)));
        assert!(predicate(Operator::NotEqual, Value::Int(7), None).matches_value(&Value::Int(5)));
        assert!(predicate(Operator::GreaterThan, Value::Int(9), None).matches_value(&Value::Int(10)));
        assert!(!predicate(Operator::GreaterThan, Value::Int(9), None).matches_value(&Value::Int(9)));
        assert!(
            predicate(Operator::GreaterThanOrEqual, Value::Int(9), None)
                .matches_value(&Value::Int(9))
        );
        assert!(predicate(Operator::LessThan, Value::Int(9), None).matches_value(&Value::Int(5)));
        assert!(
            predicate(Operator::LessThanOrEqual, Value::Int(9), None).matches_value(&Value::Int(9))
        );
    }

    #[test]
    fn test_between_inclusive() {
        let between = predicate(Operator::Between, Value::Int(9), Some(Value::Int(11)));
        assert!(between.matches_value(&Value::Int(9)));
        assert!(between.matches_value(&Value::Int(10)));
        assert!(between.matches_value(&Value::Int(11)));
        assert!(!between.matches_value(&Value::Int(8)));
        assert!(!between.matches_value(&Value::Int(12)));
    }

    #[test]
    fn test_double_ordering() {
        assert!(
            predicate(Operator::GreaterThan, Value::Double(0.2), None)
                .matches_value(&Value::Double(1.1))
        );
        assert!(
            !predicate(Operator::LessThan, Value::Double(0.2), None)
                .matches_value(&Value::Double(1.1))
        );
    }

    #[test]
    fn test_nan_never_matches_ordering() {
        let nan = Value::Double(f64::NAN);
        assert!(!predicate(Operator::GreaterThan, Value::Double(0.0), None).matches_value(&nan));
        assert!(!predicate(Operator::LessThan, Value::Double(0.0), None).matches_value(&nan));
        assert!(
            !predicate(Operator::Between, Value::Double(0.0), Some(Value::Double(1.0)))
                .matches_value(&nan)
        );
    }

    #[test]
    fn test_ordering_rejected_for_string_and_bool() {
        let string_path = direct_path(FieldType::String);
        assert!(matches!(
            Predicate::new(
                string_path,
                Operator::GreaterThan,
                Value::String("a".into()),
                None
            ),
            Err(LinkDbError::UnsupportedComparison { .. })
        ));

        let bool_path = direct_path(FieldType::Bool);
        assert!(matches!(
            Predicate::new(bool_path, Operator::LessThan, Value::Bool(true), None),
            Err(LinkDbError::UnsupportedComparison { .. })
        ));
    }

    #[test]
    fn test_literal_tag_mismatch_rejected() {
        assert!(matches!(
            Predicate::new(
                direct_path(FieldType::Int),
                Operator::Equal,
                Value::Double(1.0),
                None
            ),
            Err(LinkDbError::TypeMismatch { .. })
        ));
    }

    proptest! {
        /// `between(lo, hi)` is exactly `>= lo && <= hi`.
        #[test]
        fn prop_between_equals_ge_and_le(value in any::<i32>(), lo in any::<i32>(), hi in any::<i32>()) {
            let between = predicate(Operator::Between, Value::Int(lo), Some(Value::Int(hi)));
            let ge = predicate(Operator::GreaterThanOrEqual, Value::Int(lo), None);
            let le = predicate(Operator::LessThanOrEqual, Value::Int(hi), None);

            let actual = Value::Int(value);
            prop_assert_eq!(
                between.matches_value(&actual),
                ge.matches_value(&actual) && le.matches_value(&actual)
            );
        }
    }
}
