use reshape_api::Mappable;
use reshape_api::value::Value;

/// `true` when `value` is copied or converted rather than decomposed.
///
/// Scalars are leaves. An object is a leaf only when its type declares no
/// attributes. Nulls and sequences are neither.
pub fn is_leaf(value: &Value<'_>) -> bool {
    match value {
        Value::Scalar(_) => true,
        Value::Object(object) => !has_attributes(*object),
        Value::Null | Value::Sequence(_) => false,
    }
}

pub fn has_attributes(object: &dyn Mappable) -> bool {
    !object.shape().is_empty()
}
