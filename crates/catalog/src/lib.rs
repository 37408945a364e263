//! `catalog` crate — static configuration for workflows and forms.
//!
//! Two repositories, both loaded from YAML at startup and cached for the
//! process lifetime with an explicit `reload()` (no global singletons):
//! - [`FormCatalog`]: form field schemas; implements the store's `FormRules`
//!   so submission completeness is judged against required fields.
//! - [`DefinitionRepository`]: workflow definitions, validated on load —
//!   step sequences, form references, and mapping field keys.

pub mod error;
pub mod forms;
pub mod repository;
pub mod validate;

pub use error::CatalogError;
pub use forms::{FormCatalog, FormField, FormSchema};
pub use repository::{load_definition_file, DefinitionRepository};
pub use validate::validate_definition;
