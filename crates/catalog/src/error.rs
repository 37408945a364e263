//! Typed error type for the catalog crate.

use engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("workflow definition not found: '{0}'")]
    NotFound(String),

    #[error("workflow '{workflow}' has an invalid step sequence: {source}")]
    InvalidSteps {
        workflow: String,
        #[source]
        source: EngineError,
    },

    #[error("workflow '{workflow}' step {position} references unknown form '{form_id}'")]
    UnknownForm {
        workflow: String,
        position: u32,
        form_id: String,
    },

    #[error(
        "workflow '{workflow}' step {position} maps {side} field '{field}', \
         which form '{form_id}' does not define"
    )]
    UnknownMappingField {
        workflow: String,
        position: u32,
        side: &'static str,
        field: String,
        form_id: String,
    },

    #[error("workflow id '{0}' is defined more than once")]
    DuplicateWorkflow(String),

    #[error("form id '{0}' is defined more than once")]
    DuplicateForm(String),
}
