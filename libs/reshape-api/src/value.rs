use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::mappable::Mappable;

/// Kind of a leaf value. Two leaves are assignable to each other only when
/// their kinds are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Char,
    String,
    Uuid,
    /// Calendar date without time zone.
    Date,
    /// UTC timestamp.
    DateTime,
    /// String → string dictionary, copied as one value.
    Map,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt8 => "uint8",
            ScalarKind::UInt16 => "uint16",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::Char => "char",
            ScalarKind::String => "string",
            ScalarKind::Uuid => "uuid",
            ScalarKind::Date => "date",
            ScalarKind::DateTime => "datetime",
            ScalarKind::Map => "map",
        };
        f.write_str(name)
    }
}

/// Owned leaf value. Leaves are copied or converted, never decomposed.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Char(char),
    String(String),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Map(BTreeMap<String, String>),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Int8(_) => ScalarKind::Int8,
            Scalar::Int16(_) => ScalarKind::Int16,
            Scalar::Int32(_) => ScalarKind::Int32,
            Scalar::Int64(_) => ScalarKind::Int64,
            Scalar::UInt8(_) => ScalarKind::UInt8,
            Scalar::UInt16(_) => ScalarKind::UInt16,
            Scalar::UInt32(_) => ScalarKind::UInt32,
            Scalar::UInt64(_) => ScalarKind::UInt64,
            Scalar::Float32(_) => ScalarKind::Float32,
            Scalar::Float64(_) => ScalarKind::Float64,
            Scalar::Char(_) => ScalarKind::Char,
            Scalar::String(_) => ScalarKind::String,
            Scalar::Uuid(_) => ScalarKind::Uuid,
            Scalar::Date(_) => ScalarKind::Date,
            Scalar::DateTime(_) => ScalarKind::DateTime,
            Scalar::Map(_) => ScalarKind::Map,
        }
    }
}

/// Borrowed view of one source attribute.
///
/// Strategy by variant:
/// - `Scalar`: owned copy of the leaf, cheap for everything but strings and maps
/// - `Object`: borrowed composite, walked recursively
/// - `Sequence`: one view per element, in container iteration order
pub enum Value<'a> {
    Null,
    Scalar(Scalar),
    Object(&'a dyn Mappable),
    Sequence(Vec<Value<'a>>),
}

impl Value<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Scalar(s) => f.debug_tuple("Scalar").field(s).finish(),
            Value::Object(o) => write!(f, "Object({})", o.shape().name),
            Value::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
        }
    }
}

/// A Rust type that maps to exactly one `ScalarKind`.
pub trait LeafType: Sized {
    const KIND: ScalarKind;

    fn to_scalar(&self) -> Scalar;

    fn into_scalar(self) -> Scalar;

    /// Returns the scalar back when its kind is not `Self::KIND`.
    fn from_scalar(value: Scalar) -> Result<Self, Scalar>;
}

macro_rules! leaf_type {
    ($ty:ty, $variant:ident) => {
        impl LeafType for $ty {
            const KIND: ScalarKind = ScalarKind::$variant;

            fn to_scalar(&self) -> Scalar {
                Scalar::$variant(Clone::clone(self))
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(value: Scalar) -> Result<Self, Scalar> {
                match value {
                    Scalar::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

leaf_type!(bool, Bool);
leaf_type!(i8, Int8);
leaf_type!(i16, Int16);
leaf_type!(i32, Int32);
leaf_type!(i64, Int64);
leaf_type!(u8, UInt8);
leaf_type!(u16, UInt16);
leaf_type!(u32, UInt32);
leaf_type!(u64, UInt64);
leaf_type!(f32, Float32);
leaf_type!(f64, Float64);
leaf_type!(char, Char);
leaf_type!(String, String);
leaf_type!(Uuid, Uuid);
leaf_type!(NaiveDate, Date);
leaf_type!(DateTime<Utc>, DateTime);
leaf_type!(BTreeMap<String, String>, Map);

// Pointer-sized integers share the 64-bit kinds.
macro_rules! sized_leaf_type {
    ($ty:ty, $wide:ty, $variant:ident) => {
        impl LeafType for $ty {
            const KIND: ScalarKind = ScalarKind::$variant;

            fn to_scalar(&self) -> Scalar {
                Scalar::$variant(*self as $wide)
            }

            fn into_scalar(self) -> Scalar {
                self.to_scalar()
            }

            fn from_scalar(value: Scalar) -> Result<Self, Scalar> {
                match value {
                    Scalar::$variant(v) => <$ty>::try_from(v).map_err(|_| Scalar::$variant(v)),
                    other => Err(other),
                }
            }
        }
    };
}

sized_leaf_type!(usize, u64, UInt64);
sized_leaf_type!(isize, i64, Int64);

impl LeafType for HashMap<String, String> {
    const KIND: ScalarKind = ScalarKind::Map;

    fn to_scalar(&self) -> Scalar {
        Scalar::Map(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Map(self.into_iter().collect())
    }

    fn from_scalar(value: Scalar) -> Result<Self, Scalar> {
        match value {
            Scalar::Map(entries) => Ok(entries.into_iter().collect()),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_integers_use_wide_kinds() {
        assert_eq!(<usize as LeafType>::KIND, ScalarKind::UInt64);
        assert_eq!(7usize.to_scalar(), Scalar::UInt64(7));
        assert_eq!(usize::from_scalar(Scalar::UInt64(7)), Ok(7));
        assert_eq!(isize::from_scalar(Scalar::Int64(-3)), Ok(-3));
        assert!(usize::from_scalar(Scalar::Int64(7)).is_err());
    }

    #[test]
    fn date_leaves_keep_their_kind() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(date.to_scalar().kind(), ScalarKind::Date);
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(DateTime::<Utc>::from_scalar(at.to_scalar()), Ok(at));
        assert!(NaiveDate::from_scalar(at.into_scalar()).is_err());
    }

    #[test]
    fn kinds_render_lowercase() {
        assert_eq!(ScalarKind::UInt16.to_string(), "uint16");
        assert_eq!(ScalarKind::DateTime.to_string(), "datetime");
        assert_eq!(serde_json::to_value(ScalarKind::Float32).unwrap(), "float32");
    }
}
