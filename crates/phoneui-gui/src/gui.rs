//! Typed facade over the registry.
//!
//! Each method forwards to the backend of the capability that owns the
//! operation. A backend that does not export the operation is handled by
//! the registry's [`MissingOperationPolicy`](crate::MissingOperationPolicy).

use std::sync::Arc;

use crate::capability::Capability;
use crate::entry::{Args, ExitNotify};
use crate::error::GuiResult;
use crate::registry::{CapabilityRegistry, Dispatch};

/// Generates a facade method dispatching `$name` to `$cap`.
macro_rules! gui_operation {
    ($(#[$meta:meta])* $name:ident, $cap:ident, () $(,)?) => {
        $(#[$meta])*
        pub fn $name(&self) -> GuiResult<Dispatch> {
            self.registry.dispatch(Capability::$cap, stringify!($name), Args::Unit)
        }
    };
    ($(#[$meta:meta])* $name:ident, $cap:ident, ($($arg:ident: $typ:ty),+) => $variant:ident $(,)?) => {
        $(#[$meta])*
        pub fn $name(&self, $($arg: $typ),+) -> GuiResult<Dispatch> {
            self.registry.dispatch(Capability::$cap, stringify!($name), Args::$variant($($arg),+))
        }
    };
}

/// Phone UI facade.
#[derive(Clone)]
pub struct PhoneGui {
    registry: Arc<CapabilityRegistry>,
}

impl PhoneGui {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Initializes every loaded backend with the process arguments.
    pub fn init(&self, args: &[String], exit_notify: ExitNotify) {
        self.registry.init_all(args, exit_notify);
    }

    // =========================================================================
    // Calls
    // =========================================================================

    gui_operation!(
        /// Shows the incoming call screen.
        incoming_call_show,
        Calls,
        (id: i32, status: i32, number: &str) => CallStatus
    );

    gui_operation!(incoming_call_hide, Calls, (id: i32) => Int);

    gui_operation!(
        /// Shows the outgoing call screen.
        outgoing_call_show,
        Calls,
        (id: i32, status: i32, number: &str) => CallStatus
    );

    gui_operation!(outgoing_call_hide, Calls, (id: i32) => Int);

    // =========================================================================
    // Contacts
    // =========================================================================

    gui_operation!(contacts_show, Contacts, ());
    gui_operation!(contacts_hide, Contacts, ());

    gui_operation!(
        /// Shows the new-contact editor, optionally prefilled.
        contacts_new_show,
        Contacts,
        (name: Option<&str>, number: Option<&str>) => NameNumber
    );

    gui_operation!(contacts_new_hide, Contacts, ());

    // =========================================================================
    // Dialer
    // =========================================================================

    gui_operation!(dialer_show, Dialer, ());
    gui_operation!(dialer_hide, Dialer, ());

    // =========================================================================
    // Notification
    // =========================================================================

    gui_operation!(
        /// Shows a dialog of the given type.
        dialog_show,
        Notification,
        (dialog_type: i32) => Int
    );

    gui_operation!(dialog_hide, Notification, ());

    gui_operation!(
        /// Shows the SIM authentication screen for `status`.
        sim_auth_show,
        Notification,
        (status: i32) => Int
    );

    gui_operation!(sim_auth_hide, Notification, (status: i32) => Int);

    gui_operation!(
        /// Shows a network USSD response.
        ussd_show,
        Notification,
        (mode: i32, message: &str) => ModeMessage
    );

    gui_operation!(ussd_hide, Notification, ());

    // =========================================================================
    // Messages
    // =========================================================================

    gui_operation!(messages_show, Messages, ());
    gui_operation!(messages_hide, Messages, ());

    gui_operation!(
        /// Shows a single message.
        messages_message_show,
        Messages,
        (id: i32) => Int
    );

    gui_operation!(messages_message_hide, Messages, ());
}
