//! The [`Value`] tagged union shared by records, rows, and index keys.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{AntdbError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Int(i64),
    Blob(Vec<u8>),
    Str(String),
}

impl Value {
    /// Compares two values for ordering, as used by index range inclusion.
    ///
    /// `Null` sorts below everything else. Mixing `Int` and `Str` is a
    /// caller error, so this surfaces as an `Sql` error rather than
    /// guessing.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        use Value::*;
        match (self, other) {
            (Null, Null) => Ok(Ordering::Equal),
            (Null, _) => Ok(Ordering::Less),
            (_, Null) => Ok(Ordering::Greater),
            (Int(a), Int(b)) => Ok(a.cmp(b)),
            (Str(a), Str(b)) => Ok(a.cmp(b)),
            (Blob(a), Blob(b)) => Ok(a.cmp(b)),
            _ => Err(AntdbError::sql(format!(
                "cannot compare mismatched value types: {self:?} vs {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Blob(_) => write!(f, "[blob]"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sorts_below_everything() {
        assert_eq!(
            Value::Null.compare(&Value::Int(i64::MIN)).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn ints_compare_numerically() {
        assert_eq!(
            Value::Int(3).compare(&Value::Int(10)).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn strings_compare_lexicographically() {
        assert_eq!(
            Value::Str("a".into()).compare(&Value::Str("b".into())).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn mixed_types_error() {
        assert!(Value::Int(1).compare(&Value::Str("1".into())).is_err());
    }

    #[test]
    fn display_formats_blob_and_null() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Blob(vec![1, 2, 3]).to_string(), "[blob]");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Str("hi".into()).to_string(), "hi");
    }
}
