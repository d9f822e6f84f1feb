//! # phoneui
//!
//! Shim between phone UI frontends and the telephony, PIM and system
//! services of a phone middleware.
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────────────┐     ┌────────────────────────────┐
//!  application ─▶│ PhoneGui             │────▶│ backend per capability     │
//!       │        │ (capability registry)│     │ (dialer, messages, ...)    │
//!       │        └──────────────────────┘     └────────────────────────────┘
//!       │        ┌──────────────────────┐     ┌────────────────────────────┐
//!       └───────▶│ PhoneUtils           │────▶│ Bus: GSM, PIM, usage, ...  │
//!                │ (call bridge)        │◀────│ replies → callback(result) │
//!                └──────────────────────┘     └────────────────────────────┘
//! ```
//!
//! - **phoneui-gui**: loads one backend per capability and forwards UI
//!   operations to the entry points it exports
//! - **phoneui-utils**: issues remote calls and delivers each result to an
//!   optional callback exactly once
//! - **phoneui-runtime**: configuration, logging and startup order
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use phoneui::prelude::*;
//!
//! #[backend("phoneui-console")]
//! fn console() -> BackendModule {
//!     BackendModule::builder("phoneui-console")
//!         .call_status("incoming_call_show", |id, _, number| println!("call {id} from {number}"))
//!         .build()
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = PhoneUiRuntime::builder().start(my_bus())?;
//!     runtime.utils().dial("*100#", callback(|r, _| println!("{r:?}")), ())?;
//!     runtime.run().await;
//!     Ok(())
//! }
//! ```
//!
//! `#[backend]` expands to paths under `phoneui_gui`, so backend crates
//! depend on `phoneui-gui` next to this crate.
//!
//! ## Features
//!
//! - `toml-config` *(default)*: `phoneui.toml` configuration files
//! - `yaml-config`: `phoneui.yaml` configuration files
//! - `json-log`: JSON log lines
//! - `test-util`: the scripted `MockBus`

pub use phoneui_core as core;
pub use phoneui_gui as gui;
pub use phoneui_runtime as runtime;
pub use phoneui_utils as utils;

pub use phoneui_macros::backend;

/// Commonly used types.
///
/// ```rust,ignore
/// use phoneui::prelude::*;
/// ```
pub mod prelude {
    pub use phoneui_macros::backend;

    // Runtime
    pub use phoneui_runtime::{PhoneUiConfig, PhoneUiRuntime, RuntimeError};

    // Backends
    pub use phoneui_gui::{
        BackendModule, Capability, Dispatch, ExitNotify, GuiError, MissingOperationPolicy, PhoneGui,
    };

    // Services
    pub use phoneui_core::{Bus, Connection, ObjectRef, Record, ServiceError, ServiceResult, Value};
    pub use phoneui_utils::{
        CallId, Callback, Direction, PhoneUtils, SharedCallback, callback, shared_callback,
    };

    pub use phoneui_runtime::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use phoneui_core::{MockBus, json};
    use phoneui_gui::{BackendsConfig, LinkedLoader};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::time::Duration;

    static LAST_INCOMING: AtomicI32 = AtomicI32::new(-1);

    #[backend("phoneui-umbrella-test")]
    fn umbrella_backend() -> BackendModule {
        BackendModule::builder("phoneui-umbrella-test")
            .call_status("incoming_call_show", |id, _, _| {
                LAST_INCOMING.store(id, Ordering::SeqCst);
            })
            .build()
    }

    #[test]
    fn test_backend_macro_registers_module() {
        assert!(LinkedLoader::new().libraries().any(|l| l == "phoneui-umbrella-test"));
    }

    #[tokio::test]
    async fn test_runtime_end_to_end() {
        let bus = Arc::new(MockBus::new(|_, method, _| match method {
            "Initiate" => Ok(json!(4)),
            _ => Ok(Value::Null),
        }));

        let runtime = PhoneUiRuntime::builder()
            .search_path(std::env::temp_dir().join("phoneui-umbrella-none"))
            .without_env()
            .merge(PhoneUiConfig {
                backends: BackendsConfig::uniform("phoneui-umbrella-test"),
                ..Default::default()
            })
            .start(bus.clone())
            .unwrap();

        assert_eq!(
            runtime.gui().incoming_call_show(7, 0, "+4912345"),
            Ok(Dispatch::Invoked)
        );
        assert_eq!(LAST_INCOMING.load(Ordering::SeqCst), 7);
        assert_eq!(runtime.gui().dialer_show(), Ok(Dispatch::Skipped));

        let (tx, rx) = tokio::sync::oneshot::channel();
        runtime
            .utils()
            .call_initiate(
                "+4912345",
                callback(move |result: ServiceResult<i32>, tag: &'static str| {
                    let _ = tx.send((result, tag));
                }),
                "outgoing",
            )
            .unwrap();

        let (result, tag) = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Ok(4));
        assert_eq!(tag, "outgoing");
        assert_eq!(bus.calls_to("Initiate")[0].args, vec![json!("+4912345"), json!("voice")]);

        runtime.shutdown();
        assert!(!runtime.connection().is_ready());
    }
}
