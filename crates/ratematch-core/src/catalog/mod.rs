//! Catalog loading and validation.
//!
//! A catalog is a JSON or YAML sequence of loan products. Documents are
//! checked against an embedded JSON Schema before they are deserialized.

mod parser;
mod schema;

pub use parser::{Catalog, CatalogError};
pub use schema::validate_catalog_schema;
