use crate::error::FieldError;
use crate::shape::TypeShape;
use crate::value::{Scalar, Value};

/// Callback run on a freshly constructed sequence element before it is appended.
pub type Fill<'f> = dyn FnMut(&mut dyn Mappable) -> Result<(), FieldError> + 'f;

/// A type the mapper can read attributes from and write attributes into.
///
/// Usually implemented with `#[derive(Mappable)]`, which generates the shape
/// table and accessors at compile time. `DynamicObject` implements it from a
/// runtime schema instead.
pub trait Mappable {
    /// Declared attributes of this type.
    fn shape(&self) -> TypeShape;

    /// Current value of attribute `name`, `None` when the type has no such attribute.
    fn get(&self, name: &str) -> Option<Value<'_>>;

    /// Write a leaf into attribute `name`.
    fn set(&mut self, name: &str, value: Scalar) -> Result<(), FieldError>;

    /// Replace attribute `name` with a default-constructed instance of its
    /// declared type and return it for population.
    fn object_mut(&mut self, name: &str) -> Result<&mut dyn Mappable, FieldError>;

    /// Default-construct one element of sequence attribute `name`, run `fill`
    /// on it, then append it. An absent optional container is created first.
    fn append(&mut self, name: &str, fill: &mut Fill<'_>) -> Result<(), FieldError>;
}
