use serde::Deserialize;

use reshape_api::dynamic::SchemaSet;

use crate::error::ConfigError;
use crate::registry::AdapterRegistry;

/// Mapping configuration: parsed from TOML or built in code.
///
/// Rules are keyed by destination type name and add to whatever the type
/// declares through `#[mapper(...)]` attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapperConfig {
    /// What to do with a composite source attribute that has no destination
    /// attribute of the same name.
    #[serde(default)]
    pub fallback: CompositeFallback,

    #[serde(default)]
    pub types: Vec<TypeRules>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeFallback {
    /// Drop the attribute and log it.
    #[default]
    Skip,
    /// Map the attribute's fields into the destination currently being populated.
    Merge,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeRules {
    /// Destination type name, as reported by `TypeShape::name`.
    pub name: String,
    #[serde(default)]
    pub bindings: Vec<BindingRule>,
    #[serde(default)]
    pub transforms: Vec<TransformRule>,
}

/// Destination field `target` receives source leaf fields named in `sources`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindingRule {
    pub target: String,
    pub sources: Vec<String>,
}

/// Destination field `target` converts mismatched leaves with registered adapter `adapter`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransformRule {
    pub target: String,
    pub adapter: String,
}

impl MapperConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Self::parse(&read_file(path)?)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn rules_for(&self, type_name: &str) -> Option<&TypeRules> {
        self.types.iter().find(|t| t.name == type_name)
    }

    pub fn with_fallback(mut self, fallback: CompositeFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_binding(mut self, type_name: &str, target: &str, source: &str) -> Self {
        let rules = self.rules_mut(type_name);
        match rules.bindings.iter_mut().find(|b| b.target == target) {
            Some(binding) => binding.sources.push(source.to_string()),
            None => rules.bindings.push(BindingRule {
                target: target.to_string(),
                sources: vec![source.to_string()],
            }),
        }
        self
    }

    pub fn with_transform(mut self, type_name: &str, target: &str, adapter: &str) -> Self {
        self.rules_mut(type_name).transforms.push(TransformRule {
            target: target.to_string(),
            adapter: adapter.to_string(),
        });
        self
    }

    /// Check that every transform names an adapter present in `registry`.
    pub fn validate(&self, registry: &AdapterRegistry) -> Result<(), ConfigError> {
        for rules in &self.types {
            for transform in &rules.transforms {
                if registry.get(&transform.adapter).is_none() {
                    return Err(ConfigError::Invalid(format!(
                        "{}.{}: unknown adapter '{}'",
                        rules.name, transform.target, transform.adapter
                    )));
                }
            }
        }
        Ok(())
    }

    fn rules_mut(&mut self, type_name: &str) -> &mut TypeRules {
        let index = match self.types.iter().position(|t| t.name == type_name) {
            Some(index) => index,
            None => {
                self.types.push(TypeRules {
                    name: type_name.to_string(),
                    bindings: Vec::new(),
                    transforms: Vec::new(),
                });
                self.types.len() - 1
            }
        };
        &mut self.types[index]
    }
}

/// Check that every field `adapter` in `schema` is present in `registry`.
pub fn validate_schema(schema: &SchemaSet, registry: &AdapterRegistry) -> Result<(), ConfigError> {
    for ty in &schema.types {
        for field in &ty.fields {
            if let Some(adapter) = &field.adapter {
                if registry.get(adapter).is_none() {
                    return Err(ConfigError::Invalid(format!(
                        "{}.{}: unknown adapter '{adapter}'",
                        ty.name, field.name
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Load a destination schema from a TOML file.
pub fn load_schema(path: &str) -> Result<SchemaSet, ConfigError> {
    parse_schema(&read_file(path)?).map_err(|e| e.with_context(path))
}

/// Parse and validate a destination schema from a TOML string.
pub fn parse_schema(toml_str: &str) -> Result<SchemaSet, ConfigError> {
    let schema: SchemaSet = toml::from_str(toml_str)?;
    schema
        .validate()
        .map_err(|e| ConfigError::Invalid(e.message))?;
    Ok(schema)
}

fn read_file(path: &str) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })
}
