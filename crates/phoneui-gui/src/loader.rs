//! Sources of backend modules.
//!
//! Library names are resolved against modules compiled into the binary.
//! Shared objects are never opened at runtime, so a backend built
//! separately must be linked in (through `#[backend]`) or handed to a
//! [`StaticLoader`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::module::{BACKEND_MODULES, BackendDecl, BackendModule};

/// Resolves a configured library name to a backend module.
pub trait BackendLoader: Send + Sync {
    /// Opens `library`, or returns `None` if it is unknown.
    fn open(&self, library: &str) -> Option<Arc<BackendModule>>;
}

// =============================================================================
// LinkedLoader
// =============================================================================

/// Loader over the modules registered with `#[backend(...)]`.
///
/// If several modules register the same library name a warning is emitted
/// and the **first** one wins.
#[derive(Clone, Copy)]
pub struct LinkedLoader {
    table: &'static [BackendDecl],
}

impl LinkedLoader {
    pub fn new() -> Self {
        Self {
            table: BACKEND_MODULES.static_slice(),
        }
    }

    /// Loader over an explicit table instead of the link-time one.
    pub fn from_table(table: &'static [BackendDecl]) -> Self {
        Self { table }
    }

    /// Library names available to this loader.
    pub fn libraries(&self) -> impl Iterator<Item = &'static str> {
        self.table.iter().map(|d| d.library)
    }
}

impl Default for LinkedLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendLoader for LinkedLoader {
    fn open(&self, library: &str) -> Option<Arc<BackendModule>> {
        let mut matches = self.table.iter().filter(|d| d.library == library);
        let decl = matches.next()?;
        let extra = matches.count();
        if extra > 0 {
            warn!(
                count = extra + 1,
                library = %library,
                "Multiple backend modules registered, using first"
            );
        }
        debug!(library = %library, "Opening linked backend module");
        Some(Arc::new((decl.open)()))
    }
}

// =============================================================================
// StaticLoader
// =============================================================================

/// Loader over modules supplied at runtime.
#[derive(Default)]
pub struct StaticLoader {
    modules: HashMap<String, Arc<BackendModule>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `module` under its library name.
    pub fn with_module(mut self, module: BackendModule) -> Self {
        self.insert(module);
        self
    }

    pub fn insert(&mut self, module: BackendModule) {
        self.modules
            .insert(module.library().to_string(), Arc::new(module));
    }
}

impl BackendLoader for StaticLoader {
    fn open(&self, library: &str) -> Option<Arc<BackendModule>> {
        self.modules.get(library).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first() -> BackendModule {
        BackendModule::builder("dup").unit("first", || {}).build()
    }

    fn second() -> BackendModule {
        BackendModule::builder("dup").unit("second", || {}).build()
    }

    static TABLE: [BackendDecl; 2] = [
        BackendDecl {
            library: "dup",
            open: first,
        },
        BackendDecl {
            library: "dup",
            open: second,
        },
    ];

    #[test]
    fn test_linked_loader_first_wins() {
        let loader = LinkedLoader::from_table(&TABLE);
        let module = loader.open("dup").unwrap();
        assert!(module.resolve("first").is_some());
        assert!(module.resolve("second").is_none());
        assert!(loader.open("missing").is_none());
    }

    #[test]
    fn test_static_loader() {
        let loader = StaticLoader::new().with_module(first());
        assert!(loader.open("dup").is_some());
        assert!(loader.open("other").is_none());
    }
}
