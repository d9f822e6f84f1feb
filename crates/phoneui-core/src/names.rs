//! Well-known bus names of the freesmartphone.org services.

use crate::bus::ObjectRef;

// =============================================================================
// Services and object paths
// =============================================================================

pub const GSM_SERVICE: &str = "org.freesmartphone.ogsmd";
pub const GSM_DEVICE_PATH: &str = "/org/freesmartphone/GSM/Device";

pub const PIM_SERVICE: &str = "org.freesmartphone.opimd";
pub const PIM_CALLS_PATH: &str = "/org/freesmartphone/PIM/Calls";
pub const PIM_CONTACTS_PATH: &str = "/org/freesmartphone/PIM/Contacts";
pub const PIM_MESSAGES_PATH: &str = "/org/freesmartphone/PIM/Messages";
pub const PIM_NOTES_PATH: &str = "/org/freesmartphone/PIM/Notes";

pub const USAGE_SERVICE: &str = "org.freesmartphone.ousaged";
pub const USAGE_PATH: &str = "/org/freesmartphone/Usage";

pub const DEVICE_SERVICE: &str = "org.freesmartphone.odeviced";
pub const IDLE_NOTIFIER_PATH: &str = "/org/freesmartphone/Device/IdleNotifier/0";

pub const NETWORK_SERVICE: &str = "org.freesmartphone.onetworkd";
pub const NETWORK_PATH: &str = "/org/freesmartphone/Network";

pub const PHONEFSO_SERVICE: &str = "org.shr.phonefso";
pub const PHONEFSO_USAGE_PATH: &str = "/org/shr/phonefso/Usage";

// =============================================================================
// Interfaces
// =============================================================================

pub mod interface {
    pub const GSM_CALL: &str = "org.freesmartphone.GSM.Call";
    pub const GSM_NETWORK: &str = "org.freesmartphone.GSM.Network";
    pub const GSM_SMS: &str = "org.freesmartphone.GSM.SMS";
    pub const GSM_PDP: &str = "org.freesmartphone.GSM.PDP";

    pub const PIM_CALLS: &str = "org.freesmartphone.PIM.Calls";
    pub const PIM_CALL: &str = "org.freesmartphone.PIM.Call";
    pub const PIM_CALL_QUERY: &str = "org.freesmartphone.PIM.CallQuery";
    pub const PIM_CONTACTS: &str = "org.freesmartphone.PIM.Contacts";
    pub const PIM_CONTACT: &str = "org.freesmartphone.PIM.Contact";
    pub const PIM_CONTACT_QUERY: &str = "org.freesmartphone.PIM.ContactQuery";
    pub const PIM_MESSAGES: &str = "org.freesmartphone.PIM.Messages";
    pub const PIM_MESSAGE: &str = "org.freesmartphone.PIM.Message";
    pub const PIM_MESSAGE_QUERY: &str = "org.freesmartphone.PIM.MessageQuery";
    pub const PIM_NOTES: &str = "org.freesmartphone.PIM.Notes";
    pub const PIM_NOTE_QUERY: &str = "org.freesmartphone.PIM.NoteQuery";
    pub const PIM_FIELDS: &str = "org.freesmartphone.PIM.Fields";

    pub const USAGE: &str = "org.freesmartphone.Usage";
    pub const IDLE_NOTIFIER: &str = "org.freesmartphone.Device.IdleNotifier";
    pub const NETWORK: &str = "org.freesmartphone.Network";

    pub const PHONEFSO_USAGE: &str = "org.shr.phonefso.Usage";
}

// =============================================================================
// Object constructors
// =============================================================================

pub fn gsm_device(interface: &str) -> ObjectRef {
    ObjectRef::new(GSM_SERVICE, GSM_DEVICE_PATH, interface)
}

/// An object served by the PIM daemon at `path`.
pub fn pim_object(path: &str, interface: &str) -> ObjectRef {
    ObjectRef::new(PIM_SERVICE, path, interface)
}

pub fn usage() -> ObjectRef {
    ObjectRef::new(USAGE_SERVICE, USAGE_PATH, interface::USAGE)
}

pub fn idle_notifier() -> ObjectRef {
    ObjectRef::new(DEVICE_SERVICE, IDLE_NOTIFIER_PATH, interface::IDLE_NOTIFIER)
}

pub fn network() -> ObjectRef {
    ObjectRef::new(NETWORK_SERVICE, NETWORK_PATH, interface::NETWORK)
}

pub fn phonefso_usage() -> ObjectRef {
    ObjectRef::new(PHONEFSO_SERVICE, PHONEFSO_USAGE_PATH, interface::PHONEFSO_USAGE)
}
