use reshape_api::shape::{FieldDescriptor, TypeShape};

/// Destination attribute named `name`. Absence is an expected outcome.
pub fn resolve<'s>(shape: &'s TypeShape, name: &str) -> Option<&'s FieldDescriptor> {
    let found = shape.field(name);
    if found.is_none() {
        tracing::debug!(type_name = %shape.name, field = name, "field not found");
    }
    found
}

/// Every destination attribute bound to source field `source_field`.
pub fn find_bound_attributes<'s>(
    shape: &'s TypeShape,
    source_field: &str,
) -> Vec<&'s FieldDescriptor> {
    shape
        .fields
        .iter()
        .filter(|f| f.is_bound_to(source_field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reshape_api::shape::FieldKind;
    use reshape_api::value::ScalarKind;

    fn shape() -> TypeShape {
        let string = FieldKind::Leaf(ScalarKind::String);
        TypeShape {
            name: "RequestDto".into(),
            fields: vec![
                FieldDescriptor::new("identifier", string.clone()).with_binding("id"),
                FieldDescriptor::new("alias", string.clone()).with_binding("id"),
                FieldDescriptor::new("other", string).with_binding("code"),
            ],
        }
    }

    #[test]
    fn resolve_returns_none_when_absent() {
        let shape = shape();
        assert!(resolve(&shape, "id").is_none());
        assert_eq!(resolve(&shape, "alias").map(|f| f.name.as_str()), Some("alias"));
    }

    #[test]
    fn bound_attributes_match_source_name() {
        let shape = shape();
        let names: Vec<_> = find_bound_attributes(&shape, "id")
            .into_iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["identifier", "alias"]);
        assert!(find_bound_attributes(&shape, "missing").is_empty());
    }
}
