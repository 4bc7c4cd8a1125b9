//! JSON sources mapped into schema-described destinations.

use std::sync::Arc;

use reshape_api::Mappable;
use reshape_api::dynamic::DynamicObject;
use reshape_api::error::ErrorKind;
use reshape_engine::config::parse_schema;
use reshape_engine::{AdapterRegistry, Mapper, MapperConfig};
use serde_json::json;

const SCHEMA: &str = r#"
root = "PersonDto"

[[types]]
name = "PersonDto"
fields = [
    { name = "name", type = "string" },
    { name = "age", type = "int64" },
    { name = "addresses", type = "list", of = "AddressDto" },
    { name = "attributes", type = "map" },
]

[[types]]
name = "AddressDto"
fields = [
    { name = "street_name", type = "string" },
    { name = "extra_info", type = "object", of = "ExtraInfoDto" },
]

[[types]]
name = "ExtraInfoDto"
fields = [{ name = "coordinates", type = "string" }]
"#;

fn destination() -> DynamicObject {
    let schema = parse_schema(SCHEMA).unwrap();
    DynamicObject::root(Arc::new(schema)).unwrap()
}

#[test]
fn json_person_maps_into_schema() {
    let source = DynamicObject::from_json(&json!({
        "name": "test-name",
        "age": 1,
        "sex": "test-sex",
        "addresses": [
            { "street_name": "s1", "extra_info": { "coordinates": "c1" } },
            null,
            { "street_name": "s2", "extra_info": { "coordinates": "c2" } }
        ]
    }))
    .unwrap();
    let mut dest = destination();

    Mapper::new().map(&source, &mut dest).unwrap();

    let out = dest.to_json();
    assert_eq!(out["name"], "test-name");
    assert_eq!(out["age"], 1);
    assert!(out.get("sex").is_none());
    assert_eq!(out["attributes"], serde_json::Value::Null);
    let addresses = out["addresses"].as_array().unwrap();
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0]["extra_info"]["coordinates"], "c1");
    assert_eq!(addresses[1]["street_name"], "s2");
}

#[test]
fn json_kind_mismatch_is_incompatible() {
    let source = DynamicObject::from_json(&json!({ "name": 5 })).unwrap();
    let mut dest = destination();

    let err = Mapper::new().map(&source, &mut dest).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::IncompatibleType);
}

#[test]
fn config_rules_apply_to_dynamic_types() {
    let source = DynamicObject::from_json(&json!({ "full_name": "x", "years": "3" })).unwrap();
    let config = MapperConfig::default()
        .with_binding("PersonDto", "name", "full_name")
        .with_binding("PersonDto", "age", "years");
    let mapper = Mapper::with_config(config, AdapterRegistry::with_builtins()).unwrap();
    let mut dest = destination();

    // Bound fields are written without conversion, so "3" cannot land in an int64.
    let err = mapper.map(&source, &mut dest).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleType);

    let source = DynamicObject::from_json(&json!({ "full_name": "x" })).unwrap();
    let mut dest = destination();
    mapper.map(&source, &mut dest).unwrap();
    assert_eq!(dest.to_json()["name"], "x");
}

#[test]
fn non_object_json_is_rejected() {
    let err = DynamicObject::from_json(&json!([1, 2])).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Construction);
}

#[test]
fn dynamic_shape_is_rebuilt_from_schema() {
    let dest = destination();
    assert_eq!(dest.shape().fields.len(), 4);
}

// --- schema-level bind and adapter ---

const REQUEST_SCHEMA: &str = r#"
root = "RequestDto"

[[types]]
name = "RequestDto"
fields = [
    { name = "identifier", type = "string", bind = ["id"] },
    { name = "requester_id", type = "uuid", adapter = "string-to-uuid" },
]
"#;

fn request_destination(schema: &str) -> DynamicObject {
    DynamicObject::root(Arc::new(parse_schema(schema).unwrap())).unwrap()
}

#[test]
fn schema_bind_receives_source_field() {
    let source = DynamicObject::from_json(&json!({ "id": "test-id" })).unwrap();
    let mut dest = request_destination(REQUEST_SCHEMA);

    Mapper::new().map(&source, &mut dest).unwrap();

    assert_eq!(dest.to_json()["identifier"], "test-id");
}

#[test]
fn schema_adapter_converts_mismatched_leaf() {
    let source = DynamicObject::from_json(&json!({
        "requester_id": "a0200f66-f5b2-4cc7-accd-9810f1b1471f"
    }))
    .unwrap();
    let mut dest = request_destination(REQUEST_SCHEMA);

    Mapper::new().map(&source, &mut dest).unwrap();

    assert_eq!(
        dest.to_json()["requester_id"],
        "a0200f66-f5b2-4cc7-accd-9810f1b1471f"
    );
}

#[test]
fn schema_adapter_missing_from_registry_fails() {
    let schema = parse_schema(REQUEST_SCHEMA).unwrap();
    let mapper = Mapper::with_config(MapperConfig::default(), AdapterRegistry::empty()).unwrap();
    assert!(mapper.check_schema(&schema).is_err());

    let source = DynamicObject::from_json(&json!({ "requester_id": "x" })).unwrap();
    let mut dest = DynamicObject::root(Arc::new(schema)).unwrap();
    let err = mapper.map(&source, &mut dest).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownAdapter);
}

#[test]
fn config_transform_overrides_schema_adapter() {
    let schema = r#"
root = "EventDto"

[[types]]
name = "EventDto"
fields = [{ name = "at", type = "datetime", adapter = "string-to-uuid" }]
"#;
    let config = MapperConfig::default().with_transform("EventDto", "at", "string-to-datetime");
    let mapper = Mapper::with_config(config, AdapterRegistry::with_builtins()).unwrap();
    let source = DynamicObject::from_json(&json!({ "at": "2024-03-01T10:00:00Z" })).unwrap();
    let mut dest = request_destination(schema);

    mapper.map(&source, &mut dest).unwrap();

    assert_eq!(dest.to_json()["at"], "2024-03-01T10:00:00+00:00");
}
