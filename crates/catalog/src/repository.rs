//! The workflow definition repository.
//!
//! An explicit, constructed object (passed to callers at construction time —
//! no module-level singletons): scans a directory of YAML definition files
//! once, validates each against the form catalog, and caches the results.
//! `reload()` re-scans and atomically swaps the cache, for hot-reload during
//! development.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use engine::{StepDefinition, WorkflowDefinition};

use crate::error::CatalogError;
use crate::forms::FormCatalog;
use crate::validate::validate_definition;

/// Parse and validate a single workflow definition file.
pub fn load_definition_file(
    path: &Path,
    forms: &FormCatalog,
) -> Result<WorkflowDefinition, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    let definition: WorkflowDefinition =
        serde_yaml::from_str(&content).map_err(|source| CatalogError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    validate_definition(&definition, forms)?;
    Ok(definition)
}

pub struct DefinitionRepository {
    dir: PathBuf,
    forms: Arc<FormCatalog>,
    cache: RwLock<HashMap<String, Arc<WorkflowDefinition>>>,
}

impl DefinitionRepository {
    /// Scan `dir` for `*.yaml`/`*.yml` workflow definitions and validate them
    /// against `forms`.  Fails if the directory is unreadable or any
    /// definition is invalid — a broken definition should stop startup, not
    /// surface mid-filing.
    pub fn open(dir: impl Into<PathBuf>, forms: Arc<FormCatalog>) -> Result<Self, CatalogError> {
        let repository = Self {
            dir: dir.into(),
            forms,
            cache: RwLock::new(HashMap::new()),
        };
        repository.reload()?;
        Ok(repository)
    }

    /// Re-scan the definitions directory and swap the cache.
    pub fn reload(&self) -> Result<(), CatalogError> {
        let mut loaded: HashMap<String, Arc<WorkflowDefinition>> = HashMap::new();

        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .and_then(|extension| extension.to_str())
                .is_some_and(|extension| extension == "yaml" || extension == "yml");
            if !is_yaml {
                if path.is_file() {
                    warn!("ignoring non-YAML file {}", path.display());
                }
                continue;
            }

            let definition = load_definition_file(&path, &self.forms)?;
            let id = definition.id.clone();
            if loaded.insert(id.clone(), Arc::new(definition)).is_some() {
                return Err(CatalogError::DuplicateWorkflow(id));
            }
        }

        info!(
            "loaded {} workflow definition(s) from {}",
            loaded.len(),
            self.dir.display()
        );

        let mut cache = self.cache.write().expect("definition cache lock poisoned");
        *cache = loaded;
        Ok(())
    }

    /// The definition for `workflow_id`.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] when no definition exists for the id.
    pub fn load(&self, workflow_id: &str) -> Result<Arc<WorkflowDefinition>, CatalogError> {
        let cache = self.cache.read().expect("definition cache lock poisoned");
        cache
            .get(workflow_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(workflow_id.to_owned()))
    }

    /// The ordered steps of `workflow_id`.
    pub fn steps_for(&self, workflow_id: &str) -> Result<Vec<StepDefinition>, CatalogError> {
        Ok(self.load(workflow_id)?.steps.clone())
    }

    /// The step at `position`, or `None` when out of range — out-of-range is
    /// not an error, just "no such step".
    pub fn step_at(
        &self,
        workflow_id: &str,
        position: u32,
    ) -> Result<Option<StepDefinition>, CatalogError> {
        Ok(self.load(workflow_id)?.step_at(position).cloned())
    }

    /// All definitions, ordered by id.
    pub fn list(&self) -> Vec<Arc<WorkflowDefinition>> {
        let cache = self.cache.read().expect("definition cache lock poisoned");
        let mut definitions: Vec<_> = cache.values().cloned().collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }
}
