use reshape_api::Mappable;
use reshape_api::error::FieldError;
use reshape_api::mappable::Fill;
use reshape_api::shape::{ElementKind, FieldDescriptor, FieldKind};

/// Element type name of `field` when it is a sequence of composites.
pub fn element_type(field: &FieldDescriptor) -> Option<&str> {
    match &field.kind {
        FieldKind::Sequence {
            element: ElementKind::Object { type_name },
            ..
        } => Some(type_name),
        _ => None,
    }
}

/// Materialize one element of `field` in `dest`, populate it with `fill` and
/// append it to the container already declared there.
pub fn materialize(
    dest: &mut dyn Mappable,
    field: &FieldDescriptor,
    fill: &mut Fill<'_>,
) -> Result<(), FieldError> {
    let Some(element) = element_type(field) else {
        return Err(FieldError::field_kind(
            &dest.shape().name,
            &field.name,
            "a sequence of objects",
        ));
    };
    tracing::trace!(field = %field.name, element, "materializing element");
    dest.append(&field.name, fill)
        .map_err(|e| e.with_context(format_args!("element of '{}'", field.name)))
}
