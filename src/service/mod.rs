//! Data access and request validation behind the generic handler.

pub mod crud;
pub mod validation;

pub use crud::CrudService;
pub use validation::validate_insert;
