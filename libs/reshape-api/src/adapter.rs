use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::FieldError;
use crate::value::{LeafType, Scalar, ScalarKind};

/// Leaf-level type adapter.
///
/// Solves one task: convert a leaf of one type into a leaf of another.
/// Consulted only when the incoming leaf's kind differs from the declared
/// kind of the destination field. A fresh instance is default-constructed
/// for every conversion, so adapters carry no state between calls.
pub trait TypeAdapter: Default {
    type Input: LeafType;
    type Output: LeafType;

    fn convert(&self, input: Self::Input) -> Result<Self::Output, FieldError>;
}

/// Type-erased conversion: scalar in, scalar out.
pub type AdapterFn = fn(Scalar) -> Result<Scalar, FieldError>;

/// Handle to one `TypeAdapter` implementation, attached to a field descriptor.
#[derive(Clone, Copy)]
pub struct AdapterRef {
    pub name: &'static str,
    pub input: ScalarKind,
    pub output: ScalarKind,
    convert: AdapterFn,
}

impl AdapterRef {
    pub fn of<A: TypeAdapter>() -> Self {
        Self {
            name: std::any::type_name::<A>(),
            input: <A::Input as LeafType>::KIND,
            output: <A::Output as LeafType>::KIND,
            convert: invoke::<A>,
        }
    }

    pub fn invoke(&self, value: Scalar) -> Result<Scalar, FieldError> {
        (self.convert)(value)
    }
}

impl fmt::Debug for AdapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdapterRef({}: {} -> {})", self.name, self.input, self.output)
    }
}

fn invoke<A: TypeAdapter>(value: Scalar) -> Result<Scalar, FieldError> {
    let input = A::Input::from_scalar(value).map_err(|found| {
        FieldError::adapter(format!(
            "{} expects {} input, got {}",
            std::any::type_name::<A>(),
            <A::Input as LeafType>::KIND,
            found.kind()
        ))
    })?;
    let adapter = A::default();
    Ok(adapter.convert(input)?.into_scalar())
}

// ---------------------------------------------------------------------------
// Built-in adapters
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct IntegerToString;

impl TypeAdapter for IntegerToString {
    type Input = i32;
    type Output = String;

    fn convert(&self, input: i32) -> Result<String, FieldError> {
        Ok(input.to_string())
    }
}

#[derive(Debug, Default)]
pub struct LongToString;

impl TypeAdapter for LongToString {
    type Input = i64;
    type Output = String;

    fn convert(&self, input: i64) -> Result<String, FieldError> {
        Ok(input.to_string())
    }
}

#[derive(Debug, Default)]
pub struct StringToInteger;

impl TypeAdapter for StringToInteger {
    type Input = String;
    type Output = i32;

    fn convert(&self, input: String) -> Result<i32, FieldError> {
        Ok(input.trim().parse()?)
    }
}

#[derive(Debug, Default)]
pub struct StringToUuid;

impl TypeAdapter for StringToUuid {
    type Input = String;
    type Output = Uuid;

    fn convert(&self, input: String) -> Result<Uuid, FieldError> {
        Ok(Uuid::parse_str(&input)?)
    }
}

#[derive(Debug, Default)]
pub struct UuidToString;

impl TypeAdapter for UuidToString {
    type Input = Uuid;
    type Output = String;

    fn convert(&self, input: Uuid) -> Result<String, FieldError> {
        Ok(input.hyphenated().to_string())
    }
}

/// Parses RFC 3339 timestamps, normalizing the offset to UTC.
#[derive(Debug, Default)]
pub struct StringToDateTime;

impl TypeAdapter for StringToDateTime {
    type Input = String;
    type Output = DateTime<Utc>;

    fn convert(&self, input: String) -> Result<DateTime<Utc>, FieldError> {
        Ok(DateTime::parse_from_rfc3339(input.trim())?.with_timezone(&Utc))
    }
}

#[derive(Debug, Default)]
pub struct DateTimeToString;

impl TypeAdapter for DateTimeToString {
    type Input = DateTime<Utc>;
    type Output = String;

    fn convert(&self, input: DateTime<Utc>) -> Result<String, FieldError> {
        Ok(input.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}
