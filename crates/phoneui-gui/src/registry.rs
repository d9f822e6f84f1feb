//! The capability registry.
//!
//! Holds one [`BackendSlot`] per [`Capability`]. Slots are filled once at
//! startup by [`CapabilityRegistry::load_all`] and only read afterwards.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::capability::Capability;
use crate::config::{BackendsConfig, MissingOperationPolicy};
use crate::entry::{Args, EntryPoint, ExitNotify};
use crate::error::{GuiError, GuiResult};
use crate::loader::BackendLoader;
use crate::module::{BackendModule, INIT, symbol_name};

/// State of a capability slot.
#[derive(Debug, Clone)]
pub enum SlotState {
    Loaded(Arc<BackendModule>),
    Absent,
}

/// A capability and the backend serving it.
#[derive(Debug, Clone)]
pub struct BackendSlot {
    pub capability: Capability,
    pub state: SlotState,
}

impl BackendSlot {
    pub fn module(&self) -> Option<&Arc<BackendModule>> {
        match &self.state {
            SlotState::Loaded(module) => Some(module),
            SlotState::Absent => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, SlotState::Loaded(_))
    }
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The entry point was invoked.
    Invoked,
    /// The backend has no usable entry point; nothing was invoked.
    Skipped,
}

/// Registry of capability slots.
pub struct CapabilityRegistry {
    slots: RwLock<Vec<BackendSlot>>,
    policy: MissingOperationPolicy,
}

impl CapabilityRegistry {
    /// Creates a registry with every slot absent.
    pub fn new(policy: MissingOperationPolicy) -> Self {
        let slots = Capability::ALL
            .into_iter()
            .map(|capability| BackendSlot {
                capability,
                state: SlotState::Absent,
            })
            .collect();
        Self {
            slots: RwLock::new(slots),
            policy,
        }
    }

    pub fn policy(&self) -> MissingOperationPolicy {
        self.policy
    }

    /// Loads the backend configured for `capability`.
    ///
    /// # Errors
    /// - [`GuiError::MissingLibrary`] if no library is configured.
    /// - [`GuiError::LibraryNotFound`] if the loader does not know the library.
    /// - [`GuiError::AlreadyLoaded`] if the slot is already populated.
    pub fn load_backend(
        &self,
        capability: Capability,
        config: &BackendsConfig,
        loader: &dyn BackendLoader,
    ) -> GuiResult<()> {
        let library = config
            .library(capability)
            .ok_or(GuiError::MissingLibrary { capability })?;

        let mut slots = self.slots.write();
        let slot = &mut slots[capability.index()];
        if slot.is_loaded() {
            return Err(GuiError::AlreadyLoaded(capability));
        }

        let module = loader
            .open(library)
            .ok_or_else(|| GuiError::LibraryNotFound {
                capability,
                library: library.to_string(),
            })?;

        info!(capability = %capability, library = %library, "Loaded backend");
        slot.state = SlotState::Loaded(module);
        Ok(())
    }

    /// Loads every capability in order, stopping at the first failure.
    pub fn load_all(&self, config: &BackendsConfig, loader: &dyn BackendLoader) -> GuiResult<()> {
        for capability in Capability::ALL {
            self.load_backend(capability, config, loader)?;
        }
        Ok(())
    }

    pub fn slot(&self, capability: Capability) -> BackendSlot {
        self.slots.read()[capability.index()].clone()
    }

    pub fn module(&self, capability: Capability) -> Option<Arc<BackendModule>> {
        self.slot(capability).module().cloned()
    }

    /// Looks up `operation` in the backend of `capability`.
    ///
    /// # Errors
    /// Returns [`GuiError::NotLoaded`] if the slot is absent.
    pub fn resolve(&self, capability: Capability, operation: &str) -> GuiResult<Option<EntryPoint>> {
        let module = self
            .module(capability)
            .ok_or(GuiError::NotLoaded(capability))?;
        Ok(module.resolve(operation).cloned())
    }

    /// Invokes `operation` of `capability` with `args`.
    ///
    /// A missing entry point, or one exported with another signature, is
    /// handled according to the registry's [`MissingOperationPolicy`].
    pub fn dispatch(
        &self,
        capability: Capability,
        operation: &str,
        args: Args<'_>,
    ) -> GuiResult<Dispatch> {
        let expected = args.signature();
        let Some(entry) = self.resolve(capability, operation)? else {
            return self.on_missing(GuiError::MissingOperation {
                capability,
                operation: operation.to_string(),
            });
        };

        match entry.invoke(args) {
            Ok(()) => Ok(Dispatch::Invoked),
            Err(found) => self.on_missing(GuiError::SignatureMismatch {
                operation: symbol_name(operation),
                expected,
                found,
            }),
        }
    }

    fn on_missing(&self, err: GuiError) -> GuiResult<Dispatch> {
        match self.policy {
            MissingOperationPolicy::Ignore => {
                debug!(error = %err, "Skipping dispatch");
                Ok(Dispatch::Skipped)
            }
            MissingOperationPolicy::Warn => {
                warn!(error = %err, "Skipping dispatch");
                Ok(Dispatch::Skipped)
            }
            MissingOperationPolicy::Error => Err(err),
        }
    }

    /// Runs the initializer of every loaded backend.
    ///
    /// Backends without an initializer are skipped.
    pub fn init_all(&self, args: &[String], exit_notify: ExitNotify) {
        let slots = self.slots.read().clone();
        for slot in slots {
            let Some(module) = slot.module() else {
                continue;
            };
            match module.resolve(INIT) {
                Some(entry) => {
                    if let Err(found) = entry.invoke(Args::Init(args, exit_notify.clone())) {
                        warn!(
                            capability = %slot.capability,
                            signature = %found,
                            "Backend initializer has the wrong signature"
                        );
                    }
                }
                None => debug!(capability = %slot.capability, "Backend has no initializer"),
            }
        }
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new(MissingOperationPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticLoader;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn loader_with(module: BackendModule) -> StaticLoader {
        StaticLoader::new().with_module(module)
    }

    #[test]
    fn test_load_all() {
        let registry = CapabilityRegistry::default();
        let loader = loader_with(BackendModule::builder("test").build());
        registry
            .load_all(&BackendsConfig::uniform("test"), &loader)
            .unwrap();

        for capability in Capability::ALL {
            assert!(registry.slot(capability).is_loaded());
        }
    }

    #[test]
    fn test_missing_library_is_fatal() {
        let registry = CapabilityRegistry::default();
        let loader = loader_with(BackendModule::builder("test").build());
        let config = BackendsConfig::new().with(Capability::Dialer, "test");

        assert_eq!(
            registry.load_all(&config, &loader),
            Err(GuiError::MissingLibrary {
                capability: Capability::Messages
            })
        );
    }

    #[test]
    fn test_unknown_library_is_fatal() {
        let registry = CapabilityRegistry::default();
        let err = registry
            .load_backend(
                Capability::Dialer,
                &BackendsConfig::uniform("nope"),
                &StaticLoader::new(),
            )
            .unwrap_err();
        assert!(matches!(err, GuiError::LibraryNotFound { .. }));
        assert!(!registry.slot(Capability::Dialer).is_loaded());
    }

    #[test]
    fn test_slot_loaded_at_most_once() {
        let registry = CapabilityRegistry::default();
        let loader = loader_with(BackendModule::builder("test").build());
        let config = BackendsConfig::uniform("test");

        registry.load_backend(Capability::Calls, &config, &loader).unwrap();
        assert_eq!(
            registry.load_backend(Capability::Calls, &config, &loader),
            Err(GuiError::AlreadyLoaded(Capability::Calls))
        );
    }

    #[test]
    fn test_dispatch_missing_operation_is_noop() {
        for policy in [MissingOperationPolicy::Ignore, MissingOperationPolicy::Warn] {
            let registry = CapabilityRegistry::new(policy);
            let loader = loader_with(BackendModule::builder("test").build());
            registry
                .load_all(&BackendsConfig::uniform("test"), &loader)
                .unwrap();

            for capability in Capability::ALL {
                let result = registry.dispatch(capability, "dialer_show", Args::Unit);
                assert_eq!(result, Ok(Dispatch::Skipped));
            }
        }
    }

    #[test]
    fn test_dispatch_missing_operation_error_policy() {
        let registry = CapabilityRegistry::new(MissingOperationPolicy::Error);
        let loader = loader_with(BackendModule::builder("test").build());
        registry
            .load_all(&BackendsConfig::uniform("test"), &loader)
            .unwrap();

        let err = registry
            .dispatch(Capability::Dialer, "dialer_show", Args::Unit)
            .unwrap_err();
        assert!(matches!(err, GuiError::MissingOperation { .. }));
    }

    #[test]
    fn test_dispatch_invokes_entry() {
        let hits = Arc::new(AtomicUsize::new(0));
        let module = BackendModule::builder("test")
            .int("messages_message_show", {
                let hits = hits.clone();
                move |id| {
                    assert_eq!(id, 7);
                    hits.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build();
        let registry = CapabilityRegistry::default();
        registry
            .load_all(&BackendsConfig::uniform("test"), &loader_with(module))
            .unwrap();

        let result = registry.dispatch(Capability::Messages, "messages_message_show", Args::Int(7));
        assert_eq!(result, Ok(Dispatch::Invoked));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_signature_mismatch_is_skipped() {
        let hits = Arc::new(AtomicUsize::new(0));
        let module = BackendModule::builder("test")
            .unit("dialog_show", {
                let hits = hits.clone();
                move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build();
        let registry = CapabilityRegistry::default();
        registry
            .load_all(&BackendsConfig::uniform("test"), &loader_with(module))
            .unwrap();

        let result = registry.dispatch(Capability::Notification, "dialog_show", Args::Int(1));
        assert_eq!(result, Ok(Dispatch::Skipped));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dispatch_to_unloaded_slot() {
        let registry = CapabilityRegistry::default();
        assert_eq!(
            registry.dispatch(Capability::Dialer, "dialer_show", Args::Unit),
            Err(GuiError::NotLoaded(Capability::Dialer))
        );
    }

    #[test]
    fn test_init_all_runs_every_initializer() {
        let inits = Arc::new(AtomicUsize::new(0));
        let exits = Arc::new(AtomicUsize::new(0));
        let with_init = BackendModule::builder("with-init")
            .init({
                let inits = inits.clone();
                move |args, exit| {
                    assert_eq!(args, ["phoneui", "--verbose"]);
                    inits.fetch_add(1, Ordering::SeqCst);
                    exit();
                }
            })
            .build();
        let without_init = BackendModule::builder("without-init").build();
        let loader = StaticLoader::new()
            .with_module(with_init)
            .with_module(without_init);

        let config = BackendsConfig::uniform("with-init").with(Capability::Settings, "without-init");
        let registry = CapabilityRegistry::default();
        registry.load_all(&config, &loader).unwrap();

        let exit_notify: ExitNotify = {
            let exits = exits.clone();
            Arc::new(move || {
                exits.fetch_add(1, Ordering::SeqCst);
            })
        };
        let args = vec!["phoneui".to_string(), "--verbose".to_string()];
        registry.init_all(&args, exit_notify);

        assert_eq!(inits.load(Ordering::SeqCst), 7);
        assert_eq!(exits.load(Ordering::SeqCst), 7);
    }
}
