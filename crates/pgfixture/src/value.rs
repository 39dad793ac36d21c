//! Runtime values stored in fixture rows.
//!
//! [`Value`] is the closed set of shapes a binder knows how to dispatch on. Every
//! value handed to an insert is converted into one of these variants up front, so
//! binder dispatch is an exhaustive `match` instead of runtime type inspection.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A single cell value of a fixture row.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integer too wide for `i64` (bound with an explicit big-integer hint)
    BigInt(i128),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    /// Date without time
    Date(NaiveDate),
    /// Time of day without date
    Time(NaiveTime),
    /// Local date-time without zone
    DateTime(NaiveDateTime),
    /// Date-time carrying its own UTC offset
    Zoned(DateTime<FixedOffset>),
    /// A point on the UTC timeline
    Instant(DateTime<Utc>),
    /// An enum-like value: symbolic name plus declaration position
    Enum { name: String, ordinal: u32 },
    Uuid(Uuid),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

impl Value {
    /// Convert an enum implementing [`SqlEnum`] into a value.
    pub fn enumeration<E: SqlEnum + ?Sized>(value: &E) -> Self {
        Value::Enum {
            name: value.variant_name().to_string(),
            ordinal: value.ordinal(),
        }
    }

    /// Check if this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text of a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::BigInt(_) => "bigint",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Zoned(_) => "zoned datetime",
            Value::Instant(_) => "instant",
            Value::Enum { .. } => "enum",
            Value::Uuid(_) => "uuid",
            Value::Json(_) => "json",
            Value::Bytes(_) => "bytes",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            // same instant is not enough, the offset is part of the value
            (Value::Zoned(a), Value::Zoned(b)) => a == b && a.offset() == b.offset(),
            (Value::Instant(a), Value::Instant(b)) => a == b,
            (
                Value::Enum { name: a, ordinal: x },
                Value::Enum { name: b, ordinal: y },
            ) => a == b && x == y,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::BigInt(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Decimal(v) => v.hash(state),
            Value::Text(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::Time(v) => v.hash(state),
            Value::DateTime(v) => v.hash(state),
            Value::Zoned(v) => {
                v.naive_utc().hash(state);
                v.offset().local_minus_utc().hash(state);
            }
            Value::Instant(v) => v.hash(state),
            Value::Enum { name, ordinal } => {
                name.hash(state);
                ordinal.hash(state);
            }
            Value::Uuid(v) => v.hash(state),
            Value::Json(v) => v.to_string().hash(state),
            Value::Bytes(v) => v.hash(state),
        }
    }
}

/// Textual rendering of a value.
///
/// Text is written raw (no quoting, no escaping). This is also the literal form
/// used when a delete statement is derived from an insert.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::Zoned(v) => write!(f, "{v}"),
            Value::Instant(v) => write!(f, "{v}"),
            Value::Enum { name, .. } => f.write_str(name),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "{v}"),
            Value::Bytes(v) => {
                f.write_str("\\x")?;
                for byte in v {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// An enum whose variants can be stored either by symbolic name or by position.
///
/// Usually derived with `#[derive(SqlEnum)]`, which also implements
/// `From<E> for Value`.
pub trait SqlEnum {
    /// Symbolic name of the variant (bound by string columns).
    fn variant_name(&self) -> &'static str;

    /// 0-based declaration position of the variant (bound by integer columns).
    fn ordinal(&self) -> u32;
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    u64 => BigInt,
    i128 => BigInt,
    f32 => Float,
    f64 => Float,
    Decimal => Decimal,
    String => Text,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => Zoned,
    DateTime<Utc> => Instant,
    Uuid => Uuid,
    serde_json::Value => Json,
    Vec<u8> => Bytes,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<DateTime<Local>> for Value {
    fn from(v: DateTime<Local>) -> Self {
        Value::Zoned(v.fixed_offset())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion of a positional row into values.
///
/// Implemented for `Vec<Value>`, arrays of convertible values, and tuples of up
/// to 12 convertible values, so mixed-type rows can be written inline:
///
/// ```ignore
/// insert_into("users")
///     .columns(["id", "name", "active"])?
///     .values((1, "alice", true))?
///     .values((2, "bob", false))?
///     .build()?;
/// ```
pub trait IntoValues {
    fn into_values(self) -> Vec<Value>;
}

impl IntoValues for Vec<Value> {
    fn into_values(self) -> Vec<Value> {
        self
    }
}

impl<T: Into<Value>, const N: usize> IntoValues for [T; N] {
    fn into_values(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! impl_into_values_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Value>),+> IntoValues for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_values(self) -> Vec<Value> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

impl_into_values_tuple!(A);
impl_into_values_tuple!(A, B);
impl_into_values_tuple!(A, B, C);
impl_into_values_tuple!(A, B, C, D);
impl_into_values_tuple!(A, B, C, D, E);
impl_into_values_tuple!(A, B, C, D, E, F);
impl_into_values_tuple!(A, B, C, D, E, F, G);
impl_into_values_tuple!(A, B, C, D, E, F, G, H);
impl_into_values_tuple!(A, B, C, D, E, F, G, H, I);
impl_into_values_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_into_values_tuple!(A, B, C, D, E, F, G, H, I, J, K);
impl_into_values_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn display_renders_text_raw() {
        assert_eq!(Value::from("a1").to_string(), "a1");
        assert_eq!(Value::from(42_i64).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(vec![0xde_u8, 0xad]).to_string(), "\\xdead");
    }

    #[test]
    fn display_renders_temporal_values_in_iso_form() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::from(date).to_string(), "2024-03-09");
        let dt = date.and_hms_opt(7, 5, 0).unwrap();
        assert_eq!(Value::from(dt).to_string(), "2024-03-09 07:05:00");
    }

    #[test]
    fn option_none_is_null() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn floats_compare_and_hash_by_bits() {
        let a = Value::Float(f64::NAN);
        let b = Value::Float(f64::NAN);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn different_variants_are_not_equal() {
        assert_ne!(Value::Int(1), Value::BigInt(1));
        assert_ne!(Value::Text("1".into()), Value::Int(1));
    }

    #[test]
    fn zoned_values_keep_their_offset_in_equality() {
        let utc = DateTime::parse_from_rfc3339("2024-01-01T10:00:00+00:00").unwrap();
        let paris = DateTime::parse_from_rfc3339("2024-01-01T11:00:00+01:00").unwrap();
        assert_ne!(Value::Zoned(utc), Value::Zoned(paris));
        assert_eq!(Value::Zoned(paris), Value::Zoned(paris));
    }

    #[test]
    fn tuples_convert_positionally() {
        let values = (1_i64, "x", None::<bool>).into_values();
        assert_eq!(
            values,
            vec![Value::Int(1), Value::Text("x".into()), Value::Null]
        );
    }

    #[test]
    fn enumeration_captures_name_and_ordinal() {
        struct Blue;
        impl SqlEnum for Blue {
            fn variant_name(&self) -> &'static str {
                "BLUE"
            }
            fn ordinal(&self) -> u32 {
                2
            }
        }
        assert_eq!(
            Value::enumeration(&Blue),
            Value::Enum {
                name: "BLUE".into(),
                ordinal: 2
            }
        );
    }
}
