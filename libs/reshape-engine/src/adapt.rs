use reshape_api::error::FieldError;
use reshape_api::shape::{FieldDescriptor, FieldKind};
use reshape_api::value::Scalar;

/// Value to write into `field` for the incoming leaf `value`.
///
/// Same kind → unchanged. Different kind → the field's adapter, or an
/// `IncompatibleType` error when none is attached.
pub fn update(field: &FieldDescriptor, value: Scalar) -> Result<Scalar, FieldError> {
    let found = value.kind();
    if field.kind == FieldKind::Leaf(found) {
        return Ok(value);
    }

    let Some(adapter) = &field.adapter else {
        return Err(FieldError::incompatible_type(&field.name, &field.kind, found));
    };

    adapter.invoke(value).map_err(|e| {
        tracing::error!(
            field = %field.name,
            adapter = adapter.name,
            error = %e,
            "type adapter failed"
        );
        FieldError::adapter(format!(
            "{} failed for field '{}': {}",
            adapter.name, field.name, e.message
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reshape_api::adapter::{AdapterRef, StringToUuid};
    use reshape_api::error::ErrorKind;
    use reshape_api::value::ScalarKind;

    fn uuid_field() -> FieldDescriptor {
        FieldDescriptor::new("requester_id", FieldKind::Leaf(ScalarKind::Uuid))
    }

    #[test]
    fn same_kind_passes_through() {
        let field = FieldDescriptor::new("name", FieldKind::Leaf(ScalarKind::String));
        let out = update(&field, Scalar::String("x".into())).unwrap();
        assert_eq!(out, Scalar::String("x".into()));
    }

    #[test]
    fn mismatch_without_adapter_is_incompatible() {
        let err = update(&uuid_field(), Scalar::String("x".into())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IncompatibleType);
    }

    #[test]
    fn mismatch_with_adapter_converts() {
        let field = uuid_field().with_adapter(AdapterRef::of::<StringToUuid>());
        let out = update(&field, Scalar::String("a0200f66-f5b2-4cc7-accd-9810f1b1471f".into()))
            .unwrap();
        assert_eq!(out.kind(), ScalarKind::Uuid);
    }

    #[test]
    fn adapter_failure_keeps_message() {
        let field = uuid_field().with_adapter(AdapterRef::of::<StringToUuid>());
        let err = update(&field, Scalar::String("zzz".into())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Adapter);
        assert!(err.message.contains("requester_id"));
    }
}
