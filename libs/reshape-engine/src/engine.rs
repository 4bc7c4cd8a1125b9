use reshape_api::Mappable;
use reshape_api::dynamic::SchemaSet;
use reshape_api::error::FieldError;
use reshape_api::shape::{FieldKind, TypeShape};
use reshape_api::value::{Scalar, Value};

use crate::adapt;
use crate::classify::{has_attributes, is_leaf};
use crate::collection;
use crate::config::{CompositeFallback, MapperConfig, validate_schema};
use crate::error::{ConfigError, MappingError};
use crate::registry::AdapterRegistry;
use crate::resolve::{find_bound_attributes, resolve};

/// Recursive object-graph mapper.
///
/// Walks the source depth-first and populates the destination by attribute
/// name. Leaves are copied (or converted by a type adapter), composites are
/// recursed into, sequences of composites are materialized element by element.
/// The first failure aborts the whole call.
///
/// Cyclic source graphs recurse without bound.
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    config: MapperConfig,
    registry: AdapterRegistry,
}

impl Mapper {
    /// Mapper driven only by `#[mapper(...)]` metadata, with built-in adapters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper with configuration rules; every transform must name an adapter in `registry`.
    pub fn with_config(config: MapperConfig, registry: AdapterRegistry) -> Result<Self, ConfigError> {
        config.validate(&registry)?;
        Ok(Self { config, registry })
    }

    /// Check that every adapter named by `schema` fields is registered.
    pub fn check_schema(&self, schema: &SchemaSet) -> Result<(), ConfigError> {
        validate_schema(schema, &self.registry)
    }

    /// Default-construct a `D`, populate it from `source` and return it.
    ///
    /// On failure nothing is returned; the partially populated instance is dropped.
    pub fn map_entry<D: Mappable + Default>(&self, source: &dyn Mappable) -> Result<D, MappingError> {
        let mut destination = D::default();
        self.map(source, &mut destination)?;
        Ok(destination)
    }

    /// Populate `destination` in place from `source`.
    pub fn map(&self, source: &dyn Mappable, destination: &mut dyn Mappable) -> Result<(), MappingError> {
        self.map_value(&Value::Object(source), destination)
    }

    /// Populate `destination` from an arbitrary value. Nulls, leaves and
    /// sequences have nothing to decompose and leave `destination` untouched.
    pub fn map_value(
        &self,
        source: &Value<'_>,
        destination: &mut dyn Mappable,
    ) -> Result<(), MappingError> {
        let Value::Object(source) = source else {
            return Ok(());
        };
        self.map_object(*source, destination).map_err(|cause| {
            tracing::error!(error = %cause, "error occurred mapping entity");
            MappingError::new(cause)
        })
    }

    fn map_object(&self, source: &dyn Mappable, destination: &mut dyn Mappable) -> Result<(), FieldError> {
        let source_shape = source.shape();
        if source_shape.is_empty() {
            return Ok(());
        }
        let destination_shape = self.destination_shape(destination)?;

        for attribute in &source_shape.fields {
            let name = attribute.name.as_str();
            let value = source
                .get(name)
                .ok_or_else(|| FieldError::unknown_field(&source_shape.name, name))?;

            match value {
                Value::Null => {
                    tracing::trace!(field = name, "null attribute skipped");
                }
                Value::Sequence(items) => {
                    self.map_sequence(name, items, &destination_shape, destination)?;
                }
                Value::Scalar(scalar) => {
                    self.map_leaf(name, scalar, &destination_shape, destination)?;
                }
                Value::Object(object) => {
                    self.map_composite(name, object, &destination_shape, destination)?;
                }
            }
        }
        Ok(())
    }

    fn map_leaf(
        &self,
        name: &str,
        value: Scalar,
        destination_shape: &TypeShape,
        destination: &mut dyn Mappable,
    ) -> Result<(), FieldError> {
        match resolve(destination_shape, name) {
            Some(field) => {
                let assigned = adapt::update(field, value)?;
                destination.set(&field.name, assigned)
            }
            None => {
                for field in find_bound_attributes(destination_shape, name) {
                    tracing::debug!(source = name, destination = %field.name, "bound field");
                    destination.set(&field.name, value.clone())?;
                }
                Ok(())
            }
        }
    }

    fn map_composite(
        &self,
        name: &str,
        object: &dyn Mappable,
        destination_shape: &TypeShape,
        destination: &mut dyn Mappable,
    ) -> Result<(), FieldError> {
        if is_leaf(&Value::Object(object)) {
            tracing::trace!(field = name, "attribute-less object skipped");
            return Ok(());
        }

        let Some(field) = resolve(destination_shape, name) else {
            return match self.config.fallback {
                CompositeFallback::Skip => {
                    tracing::debug!(field = name, "no destination for composite attribute, skipped");
                    Ok(())
                }
                CompositeFallback::Merge => self.map_object(object, destination),
            };
        };

        if !matches!(field.kind, FieldKind::Object { .. }) {
            return Err(FieldError::incompatible_type(
                &field.name,
                &field.kind,
                format_args!("object {}", object.shape().name),
            ));
        }
        let nested = destination.object_mut(&field.name)?;
        self.map_object(object, nested)
    }

    fn map_sequence(
        &self,
        name: &str,
        items: Vec<Value<'_>>,
        destination_shape: &TypeShape,
        destination: &mut dyn Mappable,
    ) -> Result<(), FieldError> {
        let target = destination_shape
            .field(name)
            .filter(|f| collection::element_type(f).is_some());

        for item in items {
            let Value::Object(element) = item else {
                tracing::trace!(field = name, "null or leaf element skipped");
                continue;
            };
            if !has_attributes(element) {
                continue;
            }
            let Some(field) = target else {
                tracing::debug!(field = name, "no destination sequence, element skipped");
                continue;
            };
            collection::materialize(destination, field, &mut |slot: &mut dyn Mappable| {
                self.map_object(element, slot)
            })?;
        }
        Ok(())
    }

    /// Destination shape with named adapters resolved and configuration rules applied on top.
    fn destination_shape(&self, destination: &dyn Mappable) -> Result<TypeShape, FieldError> {
        let mut shape = destination.shape();
        for field in &mut shape.fields {
            if field.adapter.is_some() {
                continue;
            }
            if let Some(name) = field.adapter_name.as_deref() {
                let adapter = self
                    .registry
                    .get(name)
                    .ok_or_else(|| FieldError::unknown_adapter(name))?;
                field.adapter = Some(adapter);
            }
        }

        let Some(rules) = self.config.rules_for(&shape.name) else {
            return Ok(shape);
        };

        for binding in &rules.bindings {
            let type_name = shape.name.clone();
            let field = shape
                .field_mut(&binding.target)
                .ok_or_else(|| FieldError::unknown_field(&type_name, &binding.target))?;
            field.bindings.extend(binding.sources.iter().cloned());
        }

        for transform in &rules.transforms {
            let adapter = self
                .registry
                .get(&transform.adapter)
                .ok_or_else(|| FieldError::unknown_adapter(&transform.adapter))?;
            let type_name = shape.name.clone();
            let field = shape
                .field_mut(&transform.target)
                .ok_or_else(|| FieldError::unknown_field(&type_name, &transform.target))?;
            field.adapter = Some(adapter);
        }
        Ok(shape)
    }
}

/// Map `source` into a new `D` using a default `Mapper`.
pub fn map_entry<D: Mappable + Default>(source: &dyn Mappable) -> Result<D, MappingError> {
    Mapper::new().map_entry(source)
}

/// Populate `destination` from `source` using a default `Mapper`.
pub fn map(source: &dyn Mappable, destination: &mut dyn Mappable) -> Result<(), MappingError> {
    Mapper::new().map(source, destination)
}
