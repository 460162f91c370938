//! Cell values and their total ordering

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell of a tabular result
///
/// Values are totally ordered: `Null` sorts before every number, numbers
/// sort before text. Integers and reals compare numerically with each
/// other; when an integer and a real are numerically equal the integer
/// sorts first, so the order stays total and consistent with `Eq`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value (SQL `NULL`)
    #[default]
    Null,
    /// Signed integer
    Integer(i64),
    /// Floating point number
    Real(f64),
    /// Text
    Text(String),
}

impl Value {
    /// Whether this value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value is an integer or a real
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Real(_))
    }

    /// Short name of the logical type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
        }
    }

    /// Textual rendering used for fuzzy comparisons; `Null` renders empty
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => render_real(*r),
            Value::Text(s) => s.clone(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) | Value::Real(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

/// Exact comparison of an integer against a real, integer first on ties.
fn cmp_integer_real(i: i64, r: f64) -> Ordering {
    // 2^63 is exactly representable; everything at or beyond it is out of range.
    const BOUND: f64 = 9_223_372_036_854_775_808.0;

    if r.is_nan() {
        // total_cmp places negative NaN below -inf and positive NaN above +inf
        return if r.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if r >= BOUND {
        return Ordering::Less;
    }
    if r < -BOUND {
        return Ordering::Greater;
    }

    let whole = r.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => {
            if r > whole {
                Ordering::Less
            } else if r < whole {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        ord => ord,
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Real(a), Value::Real(b)) => a.total_cmp(b),
            (Value::Integer(a), Value::Real(b)) => cmp_integer_real(*a, *b),
            (Value::Real(a), Value::Integer(b)) => cmp_integer_real(*b, *a).reverse(),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Integer(i) => {
                state.write_u8(1);
                i.hash(state);
            }
            Value::Real(r) => {
                // total_cmp equality is bit equality
                state.write_u8(2);
                r.to_bits().hash(state);
            }
            Value::Text(s) => {
                state.write_u8(3);
                s.hash(state);
            }
        }
    }
}

/// Shortest round-trip text with a signed two-digit exponent outside
/// `[1e-4, 1e16)`, and a `.0` suffix on integral values (`1e+20`,
/// `2.5e-07`, `9007199254740993.0`).
fn render_real(real: f64) -> String {
    let magnitude = real.abs();
    if !real.is_finite() {
        return real.to_string();
    }
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{real:e}");
        let parts = formatted
            .split_once('e')
            .and_then(|(mantissa, exponent)| Some((mantissa, exponent.parse::<i32>().ok()?)));
        return match parts {
            Some((mantissa, exponent)) => {
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exponent.abs())
            }
            None => formatted,
        };
    }
    if real.fract() == 0.0 {
        format!("{real:.1}")
    } else {
        real.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_rank_order() {
        let mut values = vec![
            Value::from("a"),
            Value::from(2.5),
            Value::Null,
            Value::from(1),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::from(1),
                Value::from(2.5),
                Value::from("a")
            ]
        );
    }

    #[test]
    fn test_mixed_numeric_comparison() {
        assert!(Value::from(2) < Value::from(2.5));
        assert!(Value::from(3) > Value::from(2.5));
        assert!(Value::from(-3) < Value::from(-2.5));
        // numerically equal: integer first, but not equal
        assert!(Value::from(1) < Value::from(1.0));
        assert_ne!(Value::from(1), Value::from(1.0));
    }

    #[test]
    fn test_extreme_reals_against_integers() {
        assert!(Value::from(i64::MAX) < Value::from(1e19));
        assert!(Value::from(i64::MIN) > Value::from(-1e19));
        assert!(Value::from(0) < Value::from(f64::INFINITY));
        assert!(Value::from(0) > Value::from(f64::NEG_INFINITY));
        assert!(Value::from(0) < Value::from(f64::NAN));
    }

    #[test]
    fn test_text_code_point_order() {
        assert!(Value::from("B") < Value::from("a"));
        assert!(Value::from("a") < Value::from("ab"));
    }

    #[test]
    fn test_hash_agrees_with_eq() {
        use std::collections::HashSet;

        let set: HashSet<Value> = [
            Value::from(1),
            Value::from(1),
            Value::from(1.0),
            Value::Null,
            Value::Null,
            Value::from("1"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_render_and_display() {
        assert_eq!(Value::Null.render(), "");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::from(42).render(), "42");
        assert_eq!(Value::from(1.5).render(), "1.5");
        assert_eq!(Value::from("x").render(), "x");
    }

    #[test]
    fn test_render_real_exponents() {
        assert_eq!(Value::Real(1e20).render(), "1e+20");
        assert_eq!(Value::Real(-1.5e16).render(), "-1.5e+16");
        assert_eq!(Value::Real(2.5e-7).render(), "2.5e-07");
        assert_eq!(Value::Real(1e-100).render(), "1e-100");
        assert_eq!(Value::Real(0.0001).render(), "0.0001");
        assert_eq!(Value::Real(1e15).render(), "1000000000000000.0");
        assert_eq!(Value::Real(0.25).render(), "0.25");
        assert_eq!(Value::Real(f64::INFINITY).render(), "inf");
    }

    #[test]
    fn test_untagged_serde() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, 3, 1.5, "a"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::from(3),
                Value::from(1.5),
                Value::from("a")
            ]
        );
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[null,3,1.5,"a"]"#
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
