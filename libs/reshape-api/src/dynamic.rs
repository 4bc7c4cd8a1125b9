//! Runtime objects whose shape comes from a caller-supplied schema rather than
//! from `#[derive(Mappable)]`.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::FieldError;
use crate::mappable::{Fill, Mappable};
use crate::shape::{ContainerKind, ElementKind, FieldDescriptor, FieldKind, TypeShape};
use crate::value::{Scalar, ScalarKind, Value};

/// Type name reported by objects built from JSON, which carries no type names.
pub const ANONYMOUS_TYPE: &str = "object";

/// Set of named types. `root` is the type instantiated by `DynamicObject::root`.
///
/// ```toml
/// root = "PersonDto"
///
/// [[types]]
/// name = "PersonDto"
/// fields = [
///     { name = "name", type = "string" },
///     { name = "addresses", type = "list", of = "AddressDto" },
/// ]
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSet {
    pub root: String,
    #[serde(default)]
    pub types: Vec<TypeSchema>,
}

impl SchemaSet {
    pub fn get(&self, name: &str) -> Option<&TypeSchema> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Check that every `object`/`list`/`set` field names a declared type.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.get(&self.root).is_none() {
            return Err(FieldError::construction(format!(
                "root type '{}' is not declared",
                self.root
            )));
        }
        for ty in &self.types {
            for field in &ty.fields {
                if !field.field_type.is_composite() {
                    continue;
                }
                let of = field.of.as_deref().ok_or_else(|| {
                    FieldError::construction(format!(
                        "field '{}.{}' needs `of` naming its type",
                        ty.name, field.name
                    ))
                })?;
                if self.get(of).is_none() {
                    return Err(FieldError::construction(format!(
                        "field '{}.{}' refers to undeclared type '{of}'",
                        ty.name, field.name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSchema {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

/// One declared field.
///
/// ```toml
/// { name = "identifier", type = "string", bind = ["id"] }
/// { name = "requester_id", type = "uuid", adapter = "string-to-uuid" }
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: SchemaType,
    /// Type name for `object`, element type name for `list` and `set`.
    #[serde(default)]
    pub of: Option<String>,
    /// Source leaf fields this field receives when the source has no field of its name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bind: Vec<String>,
    /// Registry name of the adapter for mismatched leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
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
    Date,
    DateTime,
    Map,
    Object,
    List,
    Set,
}

impl SchemaType {
    fn is_composite(self) -> bool {
        matches!(self, SchemaType::Object | SchemaType::List | SchemaType::Set)
    }

    fn scalar_kind(self) -> Option<ScalarKind> {
        match self {
            SchemaType::Bool => Some(ScalarKind::Bool),
            SchemaType::Int8 => Some(ScalarKind::Int8),
            SchemaType::Int16 => Some(ScalarKind::Int16),
            SchemaType::Int32 => Some(ScalarKind::Int32),
            SchemaType::Int64 => Some(ScalarKind::Int64),
            SchemaType::UInt8 => Some(ScalarKind::UInt8),
            SchemaType::UInt16 => Some(ScalarKind::UInt16),
            SchemaType::UInt32 => Some(ScalarKind::UInt32),
            SchemaType::UInt64 => Some(ScalarKind::UInt64),
            SchemaType::Float32 => Some(ScalarKind::Float32),
            SchemaType::Float64 => Some(ScalarKind::Float64),
            SchemaType::Char => Some(ScalarKind::Char),
            SchemaType::String => Some(ScalarKind::String),
            SchemaType::Uuid => Some(ScalarKind::Uuid),
            SchemaType::Date => Some(ScalarKind::Date),
            SchemaType::DateTime => Some(ScalarKind::DateTime),
            SchemaType::Map => Some(ScalarKind::Map),
            SchemaType::Object | SchemaType::List | SchemaType::Set => None,
        }
    }
}

impl FieldSchema {
    fn kind(&self) -> FieldKind {
        let of = self.of.clone().unwrap_or_default();
        match self.field_type {
            SchemaType::Object => FieldKind::Object { type_name: of },
            SchemaType::List => FieldKind::Sequence {
                element: ElementKind::Object { type_name: of },
                container: ContainerKind::List,
            },
            SchemaType::Set => FieldKind::Sequence {
                element: ElementKind::Object { type_name: of },
                container: ContainerKind::OrderedSet,
            },
            leaf => FieldKind::Leaf(leaf.scalar_kind().unwrap_or(ScalarKind::String)),
        }
    }

    fn descriptor(&self) -> FieldDescriptor {
        let mut descriptor = FieldDescriptor::new(self.name.clone(), self.kind());
        descriptor.bindings = self.bind.clone();
        descriptor.adapter_name = self.adapter.clone();
        descriptor
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    /// Only appears as a sequence element; null attributes are simply absent.
    Null,
    Scalar(Scalar),
    Object(DynamicObject),
    Sequence(Vec<DynamicValue>),
}

impl DynamicValue {
    fn view(&self) -> Value<'_> {
        match self {
            DynamicValue::Null => Value::Null,
            DynamicValue::Scalar(s) => Value::Scalar(s.clone()),
            DynamicValue::Object(o) => Value::Object(o),
            DynamicValue::Sequence(items) => Value::Sequence(items.iter().map(Self::view).collect()),
        }
    }

    fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DynamicValue::Null,
            serde_json::Value::Bool(b) => DynamicValue::Scalar(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => DynamicValue::Scalar(Scalar::Int64(i)),
                (None, Some(u)) => DynamicValue::Scalar(Scalar::UInt64(u)),
                _ => DynamicValue::Scalar(Scalar::Float64(n.as_f64().unwrap_or(f64::NAN))),
            },
            serde_json::Value::String(s) => DynamicValue::Scalar(Scalar::String(s.clone())),
            serde_json::Value::Array(items) => {
                DynamicValue::Sequence(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => DynamicValue::Object(DynamicObject::from_json_map(map)),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            DynamicValue::Null => serde_json::Value::Null,
            DynamicValue::Scalar(s) => scalar_to_json(s),
            DynamicValue::Object(o) => o.to_json(),
            DynamicValue::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
        }
    }
}

fn scalar_to_json(scalar: &Scalar) -> serde_json::Value {
    match scalar {
        Scalar::Bool(b) => serde_json::Value::Bool(*b),
        Scalar::Int8(i) => serde_json::Value::from(*i),
        Scalar::Int16(i) => serde_json::Value::from(*i),
        Scalar::Int32(i) => serde_json::Value::from(*i),
        Scalar::Int64(i) => serde_json::Value::from(*i),
        Scalar::UInt8(u) => serde_json::Value::from(*u),
        Scalar::UInt16(u) => serde_json::Value::from(*u),
        Scalar::UInt32(u) => serde_json::Value::from(*u),
        Scalar::UInt64(u) => serde_json::Value::from(*u),
        Scalar::Float32(f) => float_to_json(f64::from(*f)),
        Scalar::Float64(f) => float_to_json(*f),
        Scalar::Char(c) => serde_json::Value::String(c.to_string()),
        Scalar::String(s) => serde_json::Value::String(s.clone()),
        Scalar::Uuid(u) => serde_json::Value::String(u.hyphenated().to_string()),
        Scalar::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        Scalar::DateTime(t) => serde_json::Value::String(t.to_rfc3339()),
        Scalar::Map(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        ),
    }
}

fn float_to_json(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

/// Object with a runtime shape.
///
/// - Schema-backed (`new`, `root`): the shape is the schema's field list; unset
///   fields read as null. Used as a mapping destination.
/// - Free-form (`from_json`): the shape is whatever attributes are present.
///   Used as a mapping source.
#[derive(Debug, Clone)]
pub struct DynamicObject {
    schema: Option<Arc<SchemaSet>>,
    type_name: String,
    values: BTreeMap<String, DynamicValue>,
}

impl PartialEq for DynamicObject {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.values == other.values
    }
}

impl DynamicObject {
    /// Zero-value instance of `type_name`; the factory for schema-backed objects.
    pub fn new(schema: Arc<SchemaSet>, type_name: &str) -> Result<Self, FieldError> {
        if schema.get(type_name).is_none() {
            return Err(FieldError::construction(format!(
                "type '{type_name}' is not declared in schema"
            )));
        }
        Ok(Self {
            schema: Some(schema),
            type_name: type_name.to_string(),
            values: BTreeMap::new(),
        })
    }

    pub fn root(schema: Arc<SchemaSet>) -> Result<Self, FieldError> {
        let root = schema.root.clone();
        Self::new(schema, &root)
    }

    /// Free-form object from a JSON object. Null attributes are dropped.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, FieldError> {
        match value {
            serde_json::Value::Object(map) => Ok(Self::from_json_map(map)),
            other => Err(FieldError::construction(format!(
                "expected a JSON object, got {}",
                json_type_name(other)
            ))),
        }
    }

    fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let values = map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), DynamicValue::from_json(v)))
            .collect();
        Self {
            schema: None,
            type_name: ANONYMOUS_TYPE.to_string(),
            values,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn value(&self, name: &str) -> Option<&DynamicValue> {
        self.values.get(name)
    }

    /// Render as JSON. Schema-backed objects include unset fields as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        if let Some(ty) = self.type_schema() {
            for field in &ty.fields {
                out.insert(field.name.clone(), serde_json::Value::Null);
            }
        }
        for (name, value) in &self.values {
            out.insert(name.clone(), value.to_json());
        }
        serde_json::Value::Object(out)
    }

    fn type_schema(&self) -> Option<&TypeSchema> {
        self.schema.as_ref().and_then(|s| s.get(&self.type_name))
    }

    fn field_schema(&self, name: &str) -> Result<&FieldSchema, FieldError> {
        self.type_schema()
            .and_then(|t| t.fields.iter().find(|f| f.name == name))
            .ok_or_else(|| FieldError::unknown_field(&self.type_name, name))
    }

    /// Schema and nested type name for a composite field.
    fn composite_target(
        &self,
        name: &str,
        expected: SchemaType,
    ) -> Result<(Arc<SchemaSet>, String), FieldError> {
        let field = self.field_schema(name)?;
        let is_expected = match expected {
            SchemaType::List => matches!(field.field_type, SchemaType::List | SchemaType::Set),
            other => field.field_type == other,
        };
        if !is_expected {
            let wanted = if expected == SchemaType::Object { "an object" } else { "a sequence" };
            return Err(FieldError::field_kind(&self.type_name, name, wanted));
        }
        let of = field
            .of
            .clone()
            .ok_or_else(|| FieldError::construction(format!("field '{name}' has no `of` type")))?;
        let schema = self
            .schema
            .clone()
            .ok_or_else(|| FieldError::unknown_field(&self.type_name, name))?;
        Ok((schema, of))
    }

    fn inferred_shape(&self) -> TypeShape {
        let mut shape = TypeShape::new(&self.type_name);
        for (name, value) in &self.values {
            let kind = match value {
                DynamicValue::Scalar(s) => FieldKind::Leaf(s.kind()),
                DynamicValue::Object(o) => FieldKind::Object {
                    type_name: o.type_name.clone(),
                },
                DynamicValue::Null | DynamicValue::Sequence(_) => FieldKind::Sequence {
                    element: ElementKind::Object {
                        type_name: ANONYMOUS_TYPE.to_string(),
                    },
                    container: ContainerKind::List,
                },
            };
            shape.fields.push(FieldDescriptor::new(name.clone(), kind));
        }
        shape
    }
}

impl Mappable for DynamicObject {
    fn shape(&self) -> TypeShape {
        let Some(ty) = self.type_schema() else {
            return self.inferred_shape();
        };
        let mut shape = TypeShape::new(&ty.name);
        for field in &ty.fields {
            shape.fields.push(field.descriptor());
        }
        shape
    }

    fn get(&self, name: &str) -> Option<Value<'_>> {
        if let Some(value) = self.values.get(name) {
            return Some(value.view());
        }
        // Declared but unset.
        self.field_schema(name).ok().map(|_| Value::Null)
    }

    fn set(&mut self, name: &str, value: Scalar) -> Result<(), FieldError> {
        if self.schema.is_some() {
            let field = self.field_schema(name)?;
            let declared = field
                .field_type
                .scalar_kind()
                .ok_or_else(|| FieldError::field_kind(&self.type_name, name, "a leaf"))?;
            if declared != value.kind() {
                return Err(FieldError::incompatible_type(name, declared, value.kind()));
            }
        }
        self.values.insert(name.to_string(), DynamicValue::Scalar(value));
        Ok(())
    }

    fn object_mut(&mut self, name: &str) -> Result<&mut dyn Mappable, FieldError> {
        let (schema, of) = self.composite_target(name, SchemaType::Object)?;
        let fresh = DynamicObject::new(schema, &of)?;
        self.values.insert(name.to_string(), DynamicValue::Object(fresh));
        match self.values.get_mut(name) {
            Some(DynamicValue::Object(object)) => Ok(object),
            _ => Err(FieldError::construction(format!("field '{name}' was not written"))),
        }
    }

    fn append(&mut self, name: &str, fill: &mut Fill<'_>) -> Result<(), FieldError> {
        let (schema, of) = self.composite_target(name, SchemaType::List)?;
        let unique = self.field_schema(name)?.field_type == SchemaType::Set;

        let mut item = DynamicObject::new(schema, &of)?;
        fill(&mut item)?;
        let item = DynamicValue::Object(item);

        let slot = self
            .values
            .entry(name.to_string())
            .or_insert_with(|| DynamicValue::Sequence(Vec::new()));
        match slot {
            DynamicValue::Sequence(items) => {
                if !(unique && items.contains(&item)) {
                    items.push(item);
                }
                Ok(())
            }
            _ => Err(FieldError::field_kind(&self.type_name, name, "a sequence")),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn schema() -> Arc<SchemaSet> {
        let json = serde_json::json!({
            "root": "PersonDto",
            "types": [
                {
                    "name": "PersonDto",
                    "fields": [
                        { "name": "name", "type": "string" },
                        { "name": "addresses", "type": "list", "of": "AddressDto" },
                        { "name": "tags", "type": "set", "of": "AddressDto" }
                    ]
                },
                {
                    "name": "AddressDto",
                    "fields": [{ "name": "street", "type": "string" }]
                }
            ]
        });
        Arc::new(serde_json::from_value(json).unwrap())
    }

    #[test]
    fn schema_backed_shape_follows_declaration() {
        let person = DynamicObject::root(schema()).unwrap();
        let shape = person.shape();
        assert_eq!(shape.name, "PersonDto");
        let names: Vec<_> = shape.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["name", "addresses", "tags"]);
        assert!(person.get("name").unwrap().is_null());
        assert!(person.get("missing").is_none());
    }

    #[test]
    fn set_checks_declared_kind() {
        let mut person = DynamicObject::root(schema()).unwrap();
        person.set("name", Scalar::String("n".into())).unwrap();
        let err = person.set("name", Scalar::Int64(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IncompatibleType);
        let err = person.set("nope", Scalar::Int64(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownField);
    }

    #[test]
    fn append_builds_container_and_dedupes_sets() {
        let mut person = DynamicObject::root(schema()).unwrap();
        for _ in 0..2 {
            person
                .append("tags", &mut |item: &mut dyn Mappable| {
                    item.set("street", Scalar::String("s".into()))
                })
                .unwrap();
            person.append("addresses", &mut |_: &mut dyn Mappable| Ok(())).unwrap();
        }
        let json = person.to_json();
        assert_eq!(json["tags"].as_array().unwrap().len(), 1);
        assert_eq!(json["addresses"].as_array().unwrap().len(), 2);
        assert_eq!(json["name"], serde_json::Value::Null);
    }

    #[test]
    fn from_json_drops_nulls_and_infers_kinds() {
        let source = DynamicObject::from_json(&serde_json::json!({
            "name": "n",
            "age": 3,
            "gone": null,
            "address": { "street": "s" }
        }))
        .unwrap();
        let shape = source.shape();
        assert!(shape.field("gone").is_none());
        assert_eq!(shape.field("age").unwrap().kind, FieldKind::Leaf(ScalarKind::Int64));
        assert!(matches!(source.get("address"), Some(Value::Object(_))));
    }

    #[test]
    fn validate_reports_dangling_types() {
        let set: SchemaSet = serde_json::from_value(serde_json::json!({
            "root": "A",
            "types": [{ "name": "A", "fields": [{ "name": "b", "type": "object", "of": "B" }] }]
        }))
        .unwrap();
        let err = set.validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Construction);
    }

    #[test]
    fn schema_fields_carry_bindings_and_adapter_names() {
        let set: SchemaSet = serde_json::from_value(serde_json::json!({
            "root": "RequestDto",
            "types": [{
                "name": "RequestDto",
                "fields": [
                    { "name": "identifier", "type": "string", "bind": ["id"] },
                    { "name": "requester_id", "type": "uuid", "adapter": "string-to-uuid" }
                ]
            }]
        }))
        .unwrap();
        let dto = DynamicObject::root(Arc::new(set)).unwrap();
        let shape = dto.shape();
        assert!(shape.field("identifier").unwrap().is_bound_to("id"));
        let requester = shape.field("requester_id").unwrap();
        assert_eq!(requester.adapter_name.as_deref(), Some("string-to-uuid"));
        assert!(requester.adapter.is_none());
    }

    #[test]
    fn misspelled_schema_key_is_rejected() {
        let result: Result<SchemaSet, _> = serde_json::from_value(serde_json::json!({
            "root": "A",
            "types": [{ "name": "A", "fields": [{ "name": "x", "type": "string", "binds": ["y"] }] }]
        }));
        assert!(result.unwrap_err().to_string().contains("binds"));
    }
}
