//! Callback-style facade over every domain client.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use phoneui_core::{Connection, ObjectRef, QueryOptions, Record, ServiceError, Value};

use crate::bridge::{CallBridge, Callback, SharedCallback, Submitted, SubmittedBatch};
use crate::calls::CallsClient;
use crate::contacts::ContactsClient;
use crate::messages::{MessageFields, MessagesClient};
use crate::query::Direction;
use crate::sms::{SmsClient, SmsReceipt};
use crate::system::{IdleState, PdpCredentials, ResourcePolicy, SystemClient};

/// Entry point for UI code talking to the phone services.
///
/// Every operation returns as soon as the call is issued. Its result is
/// handed to `callback` together with `userdata`, exactly once, from the
/// async runtime. Callers that prefer to await can use the domain clients
/// ([`calls`](Self::calls), [`contacts`](Self::contacts), ...) directly.
#[derive(Debug, Clone)]
pub struct PhoneUtils {
    bridge: CallBridge,
    calls: CallsClient,
    contacts: ContactsClient,
    messages: MessagesClient,
    sms: SmsClient,
    system: SystemClient,
}

impl PhoneUtils {
    /// Creates the facade. With `log_sent_messages`, every sent SMS is also
    /// stored in the message store.
    pub fn new(connection: Connection, log_sent_messages: bool) -> Self {
        let bridge = CallBridge::new(connection.clone());
        Self {
            calls: CallsClient::new(connection.clone()),
            contacts: ContactsClient::new(connection.clone()),
            messages: MessagesClient::new(connection.clone()),
            system: SystemClient::new(connection),
            sms: SmsClient::new(bridge.clone(), log_sent_messages),
            bridge,
        }
    }

    pub fn bridge(&self) -> &CallBridge {
        &self.bridge
    }

    pub fn connection(&self) -> &Connection {
        self.bridge.connection()
    }

    pub fn calls(&self) -> &CallsClient {
        &self.calls
    }

    pub fn contacts(&self) -> &ContactsClient {
        &self.contacts
    }

    pub fn messages(&self) -> &MessagesClient {
        &self.messages
    }

    pub fn sms(&self) -> &SmsClient {
        &self.sms
    }

    pub fn system(&self) -> &SystemClient {
        &self.system
    }

    /// Issues an arbitrary method call and decodes the reply into `T`.
    pub fn invoke<T, U>(
        &self,
        operation: &'static str,
        object: ObjectRef,
        method: &'static str,
        args: Vec<Value>,
        callback: Option<Callback<T, U>>,
        userdata: U,
    ) -> Submitted
    where
        T: DeserializeOwned + Send + 'static,
        U: Send + 'static,
    {
        let call = self.bridge.proxy(object).request(method, args);
        self.bridge.issue(operation, call, callback, userdata)
    }

    // =========================================================================
    // Calls
    // =========================================================================

    impl_call!(
        /// Starts a voice call; the callback receives the call id.
        call_initiate => calls.initiate(number: &str) -> i32
    );
    impl_call!(call_release => calls.release(id: i32) -> ());
    impl_call!(call_activate => calls.activate(id: i32) -> ());
    impl_call!(call_send_dtmf => calls.send_dtmf(tones: &str) -> ());
    impl_call!(ussd_initiate => calls.ussd_initiate(request: &str) -> ());
    impl_call!(
        /// Sends a USSD request or starts a voice call. The callback
        /// receives the call id, or `0` for USSD.
        dial => calls.dial(number: &str) -> i32
    );

    impl_call!(
        calls_query => calls.query(options: &QueryOptions, filter: Option<&Record>) -> Vec<Record>
    );
    impl_call!(
        calls_get_full => calls.get_full(
            options: &QueryOptions,
            direction: Option<Direction>,
            answered: Option<bool>
        ) -> Vec<Record>
    );
    impl_call!(
        /// The most recent `limit` calls, newest first.
        calls_get => calls.get(limit: Option<i32>) -> Vec<Record>
    );
    impl_call!(call_get => calls.get_call(path: &str) -> Record);

    // =========================================================================
    // Contacts
    // =========================================================================

    impl_call!(contact_get => contacts.get(path: &str) -> Record);
    impl_call!(
        /// Stores a new contact; the callback receives its path.
        contact_add => contacts.add(record: Record) -> String
    );
    impl_call!(contact_update => contacts.update(path: &str, record: Record) -> ());
    impl_call!(contact_delete => contacts.delete(path: &str) -> ());
    impl_call!(
        contact_get_fields_for_type => contacts.fields_for_type(path: &str, field_type: &str) -> Record
    );
    impl_call!(
        /// Field definitions, without system fields.
        contacts_fields_get => contacts.fields() -> BTreeMap<String, String>
    );
    impl_call!(
        contacts_fields_get_with_type => contacts.fields_with_type(field_type: &str) -> Vec<String>
    );
    impl_call!(contacts_field_type_get => contacts.field_type(name: &str) -> String);
    impl_call!(contacts_field_add => contacts.field_add(name: &str, field_type: &str) -> ());
    impl_call!(contacts_field_remove => contacts.field_remove(name: &str) -> ());
    impl_call!(
        /// Queries contacts; the callback receives them ordered by display name.
        contacts_query => contacts.query(options: &QueryOptions, filter: Option<&Record>) -> Vec<Record>
    );
    impl_call!(contacts_get => contacts.list() -> Vec<Record>);

    /// Finds the contact owning `number`; the callback receives `None` when
    /// there is no match.
    ///
    /// # Errors
    /// A lookup without a callback is rejected, as is an empty number.
    pub fn contact_lookup<U: Send + 'static>(
        &self,
        number: &str,
        callback: Option<Callback<Option<Record>, U>>,
        userdata: U,
    ) -> Submitted {
        if callback.is_none() {
            return Err(ServiceError::invalid("contact lookup requires a callback"));
        }
        let call = self.contacts.lookup(number)?;
        self.bridge.issue("contact_lookup", call, callback, userdata)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    impl_call!(
        /// Stores a message; the callback receives its path.
        message_add => messages.add(record: Record) -> String
    );
    impl_call!(message_add_fields => messages.add_fields(fields: &MessageFields) -> String);
    impl_call!(message_update => messages.update(path: &str, record: Record) -> ());
    impl_call!(
        message_update_fields => messages.update_fields(path: &str, fields: &MessageFields) -> ()
    );
    impl_call!(message_delete => messages.delete(path: &str) -> ());
    impl_call!(message_set_new_status => messages.set_new_status(path: &str, is_new: bool) -> ());
    impl_call!(message_set_read_status => messages.set_read_status(path: &str, read: bool) -> ());
    impl_call!(message_set_sent_status => messages.set_sent_status(path: &str, sent: bool) -> ());
    impl_call!(message_get => messages.get(path: &str) -> Record);
    impl_call!(
        messages_query => messages.query(options: &QueryOptions, filter: Option<&Record>) -> Vec<Record>
    );
    impl_call!(
        messages_query_full => messages.query_full(options: &QueryOptions, fields: &MessageFields) -> Vec<Record>
    );
    impl_call!(
        messages_get_full => messages.get_full(options: &QueryOptions, direction: Option<Direction>) -> Vec<Record>
    );
    impl_call!(
        /// Every message, newest first.
        messages_get => messages.get_all() -> Vec<Record>
    );

    /// Sends an SMS to each recipient; see [`SmsClient::send`].
    pub fn sms_send<U: Clone + Send + 'static>(
        &self,
        message: &str,
        recipients: &[Record],
        callback: Option<SharedCallback<SmsReceipt, U>>,
        userdata: U,
    ) -> SubmittedBatch {
        self.sms.send(message, recipients, callback, userdata)
    }

    // =========================================================================
    // System
    // =========================================================================

    impl_call!(usage_suspend => system.suspend() -> ());
    impl_call!(usage_shutdown => system.shutdown() -> ());
    impl_call!(
        resources_get_resource_policy => system.get_resource_policy(resource: &str) -> ResourcePolicy
    );
    impl_call!(
        resources_set_resource_policy => system.set_resource_policy(
            resource: &str,
            policy: ResourcePolicy
        ) -> ()
    );
    impl_call!(idle_set_state => system.idle_set_state(state: IdleState) -> ());
    impl_call!(pdp_activate_context => system.pdp_activate_context() -> ());
    impl_call!(pdp_deactivate_context => system.pdp_deactivate_context() -> ());
    impl_call!(pdp_get_credentials => system.pdp_get_credentials() -> PdpCredentials);
    impl_call!(
        network_start_connection_sharing => system.start_connection_sharing(iface: &str) -> ()
    );
    impl_call!(
        network_stop_connection_sharing => system.stop_connection_sharing(iface: &str) -> ()
    );
    impl_call!(get_offline_mode => system.get_offline_mode() -> bool);
    impl_call!(set_offline_mode => system.set_offline_mode(offline: bool) -> ());
    impl_call!(set_pin => system.set_pin(pin: &str, save: bool) -> ());
}
