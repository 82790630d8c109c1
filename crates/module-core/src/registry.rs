//! Module registry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::error::ModuleError;
use crate::module::Module;

/// Name-keyed collection of modules.
///
/// Registration is rare and dispatch is frequent, so lookups take a read
/// lock and [`ModuleRegistry::list`] hands out a copy rather than a guard.
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, Arc<dyn Module>>>,
}

impl ModuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(HashMap::new()),
        }
    }

    /// Register a module under its name.
    ///
    /// If the name is already taken the existing module is kept, a warning is
    /// logged and `false` is returned.
    pub fn register(&self, module: Arc<dyn Module>) -> bool {
        let name = module.name().to_string();
        let mut modules = self.modules.write().unwrap_or_else(PoisonError::into_inner);

        if modules.contains_key(&name) {
            warn!(module = %name, "Module registered twice, keeping the first");
            return false;
        }

        info!(module = %name, "Registering module");
        modules.insert(name, module);
        true
    }

    /// Snapshot of the registered modules, ordered by name.
    pub fn list(&self) -> Vec<Arc<dyn Module>> {
        let modules = self.modules.read().unwrap_or_else(PoisonError::into_inner);
        let mut snapshot: Vec<_> = modules.values().cloned().collect();
        snapshot.sort_by(|a, b| a.name().cmp(b.name()));
        snapshot
    }

    /// Get a module by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Module>> {
        let modules = self.modules.read().unwrap_or_else(PoisonError::into_inner);
        modules.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.modules.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Initialize every module in name order, stopping at the first failure.
    pub async fn initialize_all(&self) -> Result<(), ModuleError> {
        for module in self.list() {
            info!(module = %module.name(), "Initializing module");
            if let Err(e) = module.initialize().await {
                error!(module = %module.name(), "Failed to initialize module: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Shut every module down concurrently.
    ///
    /// All modules are asked to stop even if some fail; the failures are
    /// logged and returned.
    pub async fn shutdown_all(&self) -> Vec<ModuleError> {
        let modules = self.list();
        let results = join_all(modules.iter().map(|module| async move {
            let result = module.shutdown().await;
            if let Err(ref e) = result {
                error!(module = %module.name(), "Module shutdown error: {}", e);
            }
            result
        }))
        .await;

        results.into_iter().filter_map(Result::err).collect()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
