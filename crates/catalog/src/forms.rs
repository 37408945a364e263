//! Form field schemas — what each form asks for and which fields must be
//! filled before its submission counts as complete.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use store::FormRules;

use crate::error::CatalogError;

/// One field on a form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// The schema of one form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSchema {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub fields: Vec<FormField>,
}

impl FormSchema {
    pub fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Whether `values` fill every required field.  Keys the schema does not
    /// define are stored but ignored here.
    pub fn is_satisfied(&self, values: &BTreeMap<String, String>) -> bool {
        self.fields
            .iter()
            .filter(|field| field.required)
            .all(|field| values.get(&field.key).is_some_and(|value| !value.is_empty()))
    }
}

/// Top-level shape of a forms YAML file.
#[derive(Debug, Deserialize)]
struct FormsFile {
    forms: Vec<FormSchema>,
}

/// Catalog of all known forms.
///
/// Loaded once; the submission store judges completeness through the
/// [`FormRules`] implementation below.
pub struct FormCatalog {
    forms: HashMap<String, FormSchema>,
}

impl FormCatalog {
    pub fn new(schemas: Vec<FormSchema>) -> Result<Self, CatalogError> {
        let mut forms = HashMap::with_capacity(schemas.len());
        for schema in schemas {
            let id = schema.id.clone();
            if forms.insert(id.clone(), schema).is_some() {
                return Err(CatalogError::DuplicateForm(id));
            }
        }
        Ok(Self { forms })
    }

    /// Load a forms YAML file (`forms: [{id, title, fields: [...]}, …]`).
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let file: FormsFile =
            serde_yaml::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        info!("loaded {} form schema(s) from {}", file.forms.len(), path.display());
        Self::new(file.forms)
    }

    pub fn get(&self, form_id: &str) -> Option<&FormSchema> {
        self.forms.get(form_id)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl FormRules for FormCatalog {
    fn contains(&self, form_id: &str) -> bool {
        self.forms.contains_key(form_id)
    }

    fn is_complete(&self, form_id: &str, values: &BTreeMap<String, String>) -> bool {
        self.get(form_id)
            .is_some_and(|schema| schema.is_satisfied(values))
    }
}
