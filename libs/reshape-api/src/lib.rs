// Generated code refers to `reshape_api::...`; make that path resolve inside this crate too.
extern crate self as reshape_api;

pub mod adapter;
pub mod dynamic;
pub mod error;
pub mod mappable;
pub mod shape;
pub mod slot;
pub mod value;

pub use mappable::Mappable;
pub use reshape_api_derive::Mappable;
