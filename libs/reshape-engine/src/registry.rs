use reshape_api::adapter::{
    AdapterRef, DateTimeToString, IntegerToString, LongToString, StringToDateTime,
    StringToInteger, StringToUuid, TypeAdapter, UuidToString,
};

/// Named type adapters available to `MapperConfig` transforms.
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    entries: Vec<(String, AdapterRef)>,
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registry holding every adapter shipped with `reshape-api`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register::<IntegerToString>("integer-to-string");
        registry.register::<LongToString>("long-to-string");
        registry.register::<StringToInteger>("string-to-integer");
        registry.register::<StringToUuid>("string-to-uuid");
        registry.register::<UuidToString>("uuid-to-string");
        registry.register::<StringToDateTime>("string-to-datetime");
        registry.register::<DateTimeToString>("datetime-to-string");
        registry
    }

    pub fn register<A: TypeAdapter>(&mut self, name: impl Into<String>) {
        self.insert(name, AdapterRef::of::<A>());
    }

    /// Add or replace the adapter registered under `name`.
    pub fn insert(&mut self, name: impl Into<String>, adapter: AdapterRef) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == &name) {
            entry.1 = adapter;
        } else {
            self.entries.push((name, adapter));
        }
    }

    pub fn get(&self, name: &str) -> Option<AdapterRef> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, a)| *a)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
