pub mod adapt;
pub mod classify;
pub mod collection;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod resolve;

pub use config::{CompositeFallback, MapperConfig};
pub use engine::{Mapper, map, map_entry};
pub use error::{ConfigError, GEN_ERROR_MESSAGE, MappingError};
pub use registry::AdapterRegistry;
