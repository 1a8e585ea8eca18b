//! Cache Value Module
//!
//! Tagged value type covering every shape the cache can store.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

// == Value ==
/// A value stored under a cache key.
///
/// The cache is polymorphic over a single key space: scalars, strings, raw
/// bytes, field maps and double-ended sequences all live side by side.
/// Operations that assume a particular shape (numeric arithmetic, hash and
/// list operations) check the variant at runtime instead of constraining
/// the key space up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// A field-to-value mapping, manipulated by the hash operations.
    Hash(HashMap<String, Value>),
    /// A double-ended sequence, manipulated by the list operations.
    List(VecDeque<Value>),
}

impl Value {
    // == Type Name ==
    /// Returns a short name for the stored variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Hash(_) => "hash",
            Value::List(_) => "list",
        }
    }

    /// Returns true if the variant supports increment/decrement.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::I8(_)
                | Value::I16(_)
                | Value::I32(_)
                | Value::I64(_)
                | Value::U8(_)
                | Value::U16(_)
                | Value::U32(_)
                | Value::U64(_)
                | Value::F32(_)
                | Value::F64(_)
        )
    }

    // == Increment ==
    /// Returns this value increased by `n`, preserving the stored width.
    ///
    /// The delta is converted to the stored type first, so overflow wraps
    /// at the stored width (two's complement for the unsigned types).
    /// Returns `None` for non-numeric variants.
    pub fn incremented(&self, n: i64) -> Option<Value> {
        Some(match self {
            Value::I8(v) => Value::I8(v.wrapping_add(n as i8)),
            Value::I16(v) => Value::I16(v.wrapping_add(n as i16)),
            Value::I32(v) => Value::I32(v.wrapping_add(n as i32)),
            Value::I64(v) => Value::I64(v.wrapping_add(n)),
            Value::U8(v) => Value::U8(v.wrapping_add(n as u8)),
            Value::U16(v) => Value::U16(v.wrapping_add(n as u16)),
            Value::U32(v) => Value::U32(v.wrapping_add(n as u32)),
            Value::U64(v) => Value::U64(v.wrapping_add(n as u64)),
            Value::F32(v) => Value::F32(v + n as f32),
            Value::F64(v) => Value::F64(v + n as f64),
            _ => return None,
        })
    }

    // == Decrement ==
    /// Returns this value decreased by `n`, preserving the stored width.
    ///
    /// Separate from [`Value::incremented`] because negating `n` would not
    /// round-trip for the unsigned widths.
    pub fn decremented(&self, n: i64) -> Option<Value> {
        Some(match self {
            Value::I8(v) => Value::I8(v.wrapping_sub(n as i8)),
            Value::I16(v) => Value::I16(v.wrapping_sub(n as i16)),
            Value::I32(v) => Value::I32(v.wrapping_sub(n as i32)),
            Value::I64(v) => Value::I64(v.wrapping_sub(n)),
            Value::U8(v) => Value::U8(v.wrapping_sub(n as u8)),
            Value::U16(v) => Value::U16(v.wrapping_sub(n as u16)),
            Value::U32(v) => Value::U32(v.wrapping_sub(n as u32)),
            Value::U64(v) => Value::U64(v.wrapping_sub(n as u64)),
            Value::F32(v) => Value::F32(v - n as f32),
            Value::F64(v) => Value::F64(v - n as f64),
            _ => return None,
        })
    }
}

// == Conversions ==
macro_rules! impl_from {
    ($($src:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$src> for Value {
                fn from(v: $src) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => Str,
    Vec<u8> => Bytes,
    HashMap<String, Value> => Hash,
    VecDeque<Value> => List,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(7i32), Value::I32(7));
        assert_eq!(Value::from(7u8), Value::U8(7));
        assert_eq!(Value::from("hello"), Value::Str("hello".to_string()));
        assert_eq!(Value::from(true), Value::Bool(true));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::I64(1).type_name(), "i64");
        assert_eq!(Value::Str("x".into()).type_name(), "str");
        assert_eq!(Value::Hash(HashMap::new()).type_name(), "hash");
        assert_eq!(Value::List(VecDeque::new()).type_name(), "list");
    }

    #[test]
    fn test_is_numeric() {
        assert!(Value::U16(3).is_numeric());
        assert!(Value::F64(1.5).is_numeric());
        assert!(!Value::Str("3".into()).is_numeric());
        assert!(!Value::Bool(true).is_numeric());
    }

    #[test]
    fn test_incremented_all_widths() {
        assert_eq!(Value::I8(1).incremented(2), Some(Value::I8(3)));
        assert_eq!(Value::I16(1).incremented(2), Some(Value::I16(3)));
        assert_eq!(Value::I32(1).incremented(2), Some(Value::I32(3)));
        assert_eq!(Value::I64(1).incremented(2), Some(Value::I64(3)));
        assert_eq!(Value::U8(1).incremented(2), Some(Value::U8(3)));
        assert_eq!(Value::U16(1).incremented(2), Some(Value::U16(3)));
        assert_eq!(Value::U32(1).incremented(2), Some(Value::U32(3)));
        assert_eq!(Value::U64(1).incremented(2), Some(Value::U64(3)));
        assert_eq!(Value::F32(1.0).incremented(2), Some(Value::F32(3.0)));
        assert_eq!(Value::F64(1.0).incremented(2), Some(Value::F64(3.0)));
    }

    #[test]
    fn test_decremented_all_widths() {
        assert_eq!(Value::I8(3).decremented(2), Some(Value::I8(1)));
        assert_eq!(Value::U64(3).decremented(2), Some(Value::U64(1)));
        assert_eq!(Value::F64(3.0).decremented(2), Some(Value::F64(1.0)));
    }

    #[test]
    fn test_wraparound_at_stored_width() {
        // Overflow wraps at the stored width, not at i64.
        assert_eq!(Value::U8(255).incremented(1), Some(Value::U8(0)));
        assert_eq!(Value::I8(127).incremented(1), Some(Value::I8(-128)));
        assert_eq!(Value::U8(0).decremented(1), Some(Value::U8(255)));
        assert_eq!(Value::U16(0).decremented(1), Some(Value::U16(65535)));
    }

    #[test]
    fn test_negative_delta_on_unsigned() {
        // A negative delta converts two's complement, so adding -1 is
        // the same as subtracting 1 at the stored width.
        assert_eq!(Value::U8(5).incremented(-1), Some(Value::U8(4)));
        assert_eq!(Value::U32(0).incremented(-1), Some(Value::U32(u32::MAX)));
    }

    #[test]
    fn test_arithmetic_on_non_numeric() {
        assert_eq!(Value::Str("x".into()).incremented(1), None);
        assert_eq!(Value::Bool(false).decremented(1), None);
        assert_eq!(Value::List(VecDeque::new()).incremented(1), None);
    }

    #[test]
    fn test_serde_roundtrip() {
        let value = Value::Hash(HashMap::from([
            ("count".to_string(), Value::U32(3)),
            ("tags".to_string(), Value::List(VecDeque::from([Value::from("a")]))),
        ]));

        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
