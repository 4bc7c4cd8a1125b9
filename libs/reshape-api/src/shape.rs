use std::fmt;

use crate::adapter::AdapterRef;
use crate::value::ScalarKind;

/// Declared shape of a mappable type: its name and attributes in declaration order.
///
/// Rebuilt on every call to `Mappable::shape`; nothing is cached between mappings.
#[derive(Debug, Clone)]
pub struct TypeShape {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// `true` when the type declares no attributes.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single declared attribute.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// Source field names this attribute is bound to when the destination
    /// has no field of the same name.
    pub bindings: Vec<String>,
    /// Adapter consulted when an incoming leaf's kind differs from `kind`.
    pub adapter: Option<AdapterRef>,
    /// Registry name of an adapter, resolved by the mapper when `adapter` is unset.
    pub adapter_name: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            bindings: Vec::new(),
            adapter: None,
            adapter_name: None,
        }
    }

    pub fn with_binding(mut self, source_field: impl Into<String>) -> Self {
        self.bindings.push(source_field.into());
        self
    }

    pub fn with_adapter(mut self, adapter: AdapterRef) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn with_adapter_name(mut self, name: impl Into<String>) -> Self {
        self.adapter_name = Some(name.into());
        self
    }

    pub fn is_bound_to(&self, source_field: &str) -> bool {
        self.bindings.iter().any(|b| b == source_field)
    }
}

/// Declared type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Leaf(ScalarKind),
    Object { type_name: String },
    Sequence {
        element: ElementKind,
        container: ContainerKind,
    },
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Leaf(kind) => write!(f, "{kind}"),
            FieldKind::Object { type_name } => write!(f, "object {type_name}"),
            FieldKind::Sequence { element, container } => write!(f, "{container}<{element}>"),
        }
    }
}

/// Declared element type of a sequence attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Leaf(ScalarKind),
    Object { type_name: String },
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Leaf(kind) => write!(f, "{kind}"),
            ElementKind::Object { type_name } => f.write_str(type_name),
        }
    }
}

/// Container a sequence attribute is declared with. The mapper appends into
/// the existing container and never changes its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// `Vec`.
    List,
    /// `VecDeque`.
    Deque,
    /// `BTreeSet`.
    OrderedSet,
    /// `HashSet`.
    HashSet,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerKind::List => "list",
            ContainerKind::Deque => "deque",
            ContainerKind::OrderedSet => "ordered_set",
            ContainerKind::HashSet => "hash_set",
        };
        f.write_str(name)
    }
}
