//! Module name to constructor map.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::ModuleContext;
use crate::module::Module;

/// Builds a module instance bound to a context.
pub type ModuleConstructor = Arc<dyn Fn(ModuleContext) -> Module + Send + Sync>;

/// Explicit registry of loadable modules.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    constructors: FxHashMap<String, ModuleConstructor>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, replacing any previous constructor.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn(ModuleContext) -> Module + Send + Sync + 'static,
    ) -> &mut Self {
        self.constructors.insert(name.into(), Arc::new(constructor));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn instantiate(&self, name: &str, context: ModuleContext) -> Option<Module> {
        self.constructors.get(name).map(|c| c(context))
    }

    /// Registered names, sorted.
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.available()).finish()
    }
}
