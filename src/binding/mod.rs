//! Static per-model configuration: binding, primary-key shape, schema descriptor.

pub mod model;
pub mod schema;

pub use model::*;
pub use schema::*;
