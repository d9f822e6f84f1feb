//! Power, resources, idle state, packet data and offline mode.

use std::fmt;

use serde::{Deserialize, Serialize};

use phoneui_core::names::{self, interface};
use phoneui_core::{Connection, Proxy, ServiceResult, Value};

use crate::bridge::{CallFuture, discard, require};

/// Policy of a resource managed by the usage daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourcePolicy {
    Enabled,
    Disabled,
    Auto,
}

impl ResourcePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourcePolicy::Enabled => "enabled",
            ResourcePolicy::Disabled => "disabled",
            ResourcePolicy::Auto => "auto",
        }
    }
}

impl fmt::Display for ResourcePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Idle notifier states, from busy to suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleState {
    Busy,
    Idle,
    IdleDim,
    IdlePrelock,
    Lock,
    Suspend,
    Awake,
}

impl IdleState {
    pub fn as_str(self) -> &'static str {
        match self {
            IdleState::Busy => "busy",
            IdleState::Idle => "idle",
            IdleState::IdleDim => "idle_dim",
            IdleState::IdlePrelock => "idle_prelock",
            IdleState::Lock => "lock",
            IdleState::Suspend => "suspend",
            IdleState::Awake => "awake",
        }
    }
}

/// Packet data access credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String, String)")]
pub struct PdpCredentials {
    pub apn: String,
    pub user: String,
    pub password: String,
}

impl From<(String, String, String)> for PdpCredentials {
    fn from((apn, user, password): (String, String, String)) -> Self {
        Self { apn, user, password }
    }
}

#[derive(Debug, Clone)]
pub struct SystemClient {
    connection: Connection,
}

impl SystemClient {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    fn usage(&self) -> Proxy {
        self.connection.proxy(names::usage())
    }

    fn pdp(&self) -> Proxy {
        self.connection.proxy(names::gsm_device(interface::GSM_PDP))
    }

    fn network(&self) -> Proxy {
        self.connection.proxy(names::network())
    }

    fn phonefso(&self) -> Proxy {
        self.connection.proxy(names::phonefso_usage())
    }

    // =========================================================================
    // Usage
    // =========================================================================

    pub fn suspend(&self) -> CallFuture<()> {
        discard(self.usage(), "Suspend", vec![])
    }

    pub fn shutdown(&self) -> CallFuture<()> {
        discard(self.usage(), "Shutdown", vec![])
    }

    pub fn get_resource_policy(&self, resource: &str) -> ServiceResult<CallFuture<ResourcePolicy>> {
        require("resource", resource)?;
        Ok(self
            .usage()
            .request("GetResourcePolicy", vec![Value::from(resource)]))
    }

    pub fn set_resource_policy(
        &self,
        resource: &str,
        policy: ResourcePolicy,
    ) -> ServiceResult<CallFuture<()>> {
        require("resource", resource)?;
        Ok(discard(
            self.usage(),
            "SetResourcePolicy",
            vec![Value::from(resource), Value::from(policy.as_str())],
        ))
    }

    // =========================================================================
    // Device
    // =========================================================================

    pub fn idle_set_state(&self, state: IdleState) -> CallFuture<()> {
        discard(
            self.connection.proxy(names::idle_notifier()),
            "SetState",
            vec![Value::from(state.as_str())],
        )
    }

    // =========================================================================
    // Network
    // =========================================================================

    pub fn pdp_activate_context(&self) -> CallFuture<()> {
        discard(self.pdp(), "ActivateContext", vec![])
    }

    pub fn pdp_deactivate_context(&self) -> CallFuture<()> {
        discard(self.pdp(), "DeactivateContext", vec![])
    }

    pub fn pdp_get_credentials(&self) -> CallFuture<PdpCredentials> {
        self.pdp().request("GetCredentials", vec![])
    }

    pub fn start_connection_sharing(&self, iface: &str) -> ServiceResult<CallFuture<()>> {
        require("interface", iface)?;
        Ok(discard(
            self.network(),
            "StartConnectionSharingWithInterface",
            vec![Value::from(iface)],
        ))
    }

    pub fn stop_connection_sharing(&self, iface: &str) -> ServiceResult<CallFuture<()>> {
        require("interface", iface)?;
        Ok(discard(
            self.network(),
            "StopConnectionSharingWithInterface",
            vec![Value::from(iface)],
        ))
    }

    // =========================================================================
    // Phone daemon
    // =========================================================================

    pub fn get_offline_mode(&self) -> CallFuture<bool> {
        self.phonefso().request("GetOfflineMode", vec![])
    }

    pub fn set_offline_mode(&self, offline: bool) -> CallFuture<()> {
        discard(self.phonefso(), "SetOfflineMode", vec![Value::Bool(offline)])
    }

    /// Sets the SIM PIN, optionally remembering it for the next unlock.
    pub fn set_pin(&self, pin: &str, save: bool) -> ServiceResult<CallFuture<()>> {
        require("pin", pin)?;
        Ok(discard(
            self.phonefso(),
            "SetPin",
            vec![Value::from(pin), Value::Bool(save)],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ready_connection;
    use phoneui_core::{MockBus, ServiceError, json};
    use std::sync::Arc;

    fn client(bus: &Arc<MockBus>) -> SystemClient {
        SystemClient::new(ready_connection(bus.clone()))
    }

    #[test]
    fn test_usage_calls() {
        let bus = Arc::new(MockBus::new(|_, method, _| match method {
            "GetResourcePolicy" => Ok(json!("auto")),
            _ => Ok(Value::Null),
        }));
        let client = client(&bus);

        tokio_test::block_on(async {
            client.suspend().await.unwrap();
            client.shutdown().await.unwrap();
            let policy = client.get_resource_policy("GSM").unwrap().await.unwrap();
            assert_eq!(policy, ResourcePolicy::Auto);
            client
                .set_resource_policy("WiFi", ResourcePolicy::Disabled)
                .unwrap()
                .await
                .unwrap();
        });

        assert_eq!(bus.calls_to("Suspend")[0].target, names::usage());
        assert_eq!(
            bus.calls_to("SetResourcePolicy")[0].args,
            vec![json!("WiFi"), json!("disabled")]
        );
    }

    #[test]
    fn test_unknown_policy_is_decode_error() {
        let bus = Arc::new(MockBus::new(|_, _, _| Ok(json!("sometimes"))));
        let result = tokio_test::block_on(client(&bus).get_resource_policy("CPU").unwrap());
        assert!(matches!(result, Err(ServiceError::Decode(_))));
    }

    #[test]
    fn test_idle_state_names() {
        let bus = Arc::new(MockBus::silent());
        tokio_test::block_on(client(&bus).idle_set_state(IdleState::IdlePrelock)).unwrap();

        let call = &bus.calls_to("SetState")[0];
        assert_eq!(call.args, vec![json!("idle_prelock")]);
        assert_eq!(call.target, names::idle_notifier());
        assert_eq!(serde_json::to_value(IdleState::IdleDim).unwrap(), json!("idle_dim"));
    }

    #[test]
    fn test_pdp_credentials() {
        let bus = Arc::new(MockBus::new(|_, _, _| Ok(json!(["internet", "user", "secret"]))));
        let credentials = tokio_test::block_on(client(&bus).pdp_get_credentials()).unwrap();

        assert_eq!(
            credentials,
            PdpCredentials {
                apn: "internet".into(),
                user: "user".into(),
                password: "secret".into(),
            }
        );
        assert_eq!(bus.calls()[0].target.interface, interface::GSM_PDP);
    }

    #[test]
    fn test_connection_sharing() {
        let bus = Arc::new(MockBus::silent());
        let client = client(&bus);
        tokio_test::block_on(async {
            client.start_connection_sharing("usb0").unwrap().await.unwrap();
            client.stop_connection_sharing("usb0").unwrap().await.unwrap();
        });

        assert_eq!(bus.count("StartConnectionSharingWithInterface"), 1);
        assert_eq!(bus.count("StopConnectionSharingWithInterface"), 1);
        assert!(client.start_connection_sharing("").is_err());
    }

    #[test]
    fn test_offline_mode_and_pin() {
        let bus = Arc::new(MockBus::new(|_, method, _| match method {
            "GetOfflineMode" => Ok(json!(true)),
            _ => Ok(Value::Null),
        }));
        let client = client(&bus);
        tokio_test::block_on(async {
            assert!(client.get_offline_mode().await.unwrap());
            client.set_offline_mode(false).await.unwrap();
            client.set_pin("1234", true).unwrap().await.unwrap();
        });

        assert_eq!(bus.calls()[0].target, names::phonefso_usage());
        assert_eq!(bus.calls_to("SetPin")[0].args, vec![json!("1234"), json!(true)]);
        assert!(matches!(client.set_pin("", false), Err(ServiceError::InvalidArgument(_))));
    }
}
