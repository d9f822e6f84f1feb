//! Sending SMS with an optional copy in the message store.
//!
//! Each recipient gets its own packet running this chain:
//!
//! ```text
//! [Messages.Add draft] ──▶ SMS.SendTextMessage ──▶ [Message.Update New=!sent] (detached)
//!                                              └──▶ callback(reference, timestamp)
//! ```
//!
//! Storing the draft never blocks the send: if it fails, the message still
//! goes out and no status update follows.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use phoneui_core::names::{self, interface};
use phoneui_core::record::{display_phone, strip_filler_chars};
use phoneui_core::{Record, ServiceError, ServiceResult, Value};

use crate::bridge::{CallBridge, Callback, CallFuture, SharedCallback, SubmittedBatch};
use crate::messages::{MessageFields, MessagesClient};
use crate::query::Direction;

/// Source recorded on stored SMS.
const SMS_SOURCE: &str = "SMS";

/// Outcome of a sent SMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i32, String)")]
pub struct SmsReceipt {
    /// Transaction reference assigned by the modem.
    pub reference: i32,
    pub timestamp: String,
}

impl From<(i32, String)> for SmsReceipt {
    fn from((reference, timestamp): (i32, String)) -> Self {
        Self { reference, timestamp }
    }
}

#[derive(Debug, Clone)]
pub struct SmsClient {
    bridge: CallBridge,
    messages: MessagesClient,
    log_sent_messages: bool,
}

impl SmsClient {
    pub fn new(bridge: CallBridge, log_sent_messages: bool) -> Self {
        let messages = MessagesClient::new(bridge.connection().clone());
        Self {
            bridge,
            messages,
            log_sent_messages,
        }
    }

    pub fn logs_sent_messages(&self) -> bool {
        self.log_sent_messages
    }

    /// Sends `message` to every recipient that has a phone number.
    ///
    /// Recipients are contact-like records; their number is picked with
    /// [`display_phone`] and stripped of filler characters. `callback` runs
    /// once per recipient with a clone of `userdata`.
    ///
    /// # Errors
    /// Fails synchronously, without issuing anything, when `recipients` is
    /// empty or there is no async runtime.
    pub fn send<U>(
        &self,
        message: &str,
        recipients: &[Record],
        callback: Option<SharedCallback<SmsReceipt, U>>,
        userdata: U,
    ) -> SubmittedBatch
    where
        U: Clone + Send + 'static,
    {
        if recipients.is_empty() {
            return Err(ServiceError::invalid("no recipients"));
        }

        let mut ids = Vec::with_capacity(recipients.len());
        for (index, recipient) in recipients.iter().enumerate() {
            let Some(number) = display_phone(recipient)
                .map(|n| strip_filler_chars(&n))
                .filter(|n| !n.is_empty())
            else {
                warn!(recipient = index, "Recipient has no phone number, skipping");
                continue;
            };

            info!(recipient = index + 1, number = %number, "Sending SMS");
            let chain = self.send_one(number, message.to_string());
            let callback = callback.clone().map(|cb| -> Callback<SmsReceipt, U> {
                Box::new(move |result, userdata| cb(result, userdata))
            });
            ids.push(self.bridge.issue("sms_send", chain, callback, userdata.clone())?);
        }
        Ok(ids)
    }

    fn send_one(&self, number: String, message: String) -> CallFuture<SmsReceipt> {
        let client = self.clone();
        Box::pin(async move {
            let draft = if client.log_sent_messages {
                client.store_draft(&number, &message).await
            } else {
                None
            };

            let sms = client
                .bridge
                .proxy(names::gsm_device(interface::GSM_SMS));
            let result: ServiceResult<SmsReceipt> = sms
                .call_as(
                    "SendTextMessage",
                    vec![Value::from(number.as_str()), Value::from(message), Value::Bool(false)],
                )
                .await;

            if let Err(e) = &result {
                warn!(number = %number, error = %e, "Failed to send SMS");
            }
            if let Some(path) = draft {
                client.mark_sent(&path, result.is_ok());
            }
            result
        })
    }

    async fn store_draft(&self, number: &str, message: &str) -> Option<String> {
        let fields = MessageFields {
            direction: Some(Direction::Out),
            timestamp: unix_now(),
            content: Some(message.to_string()),
            source: Some(SMS_SOURCE.to_string()),
            is_new: true,
            peer: Some(number.to_string()),
        };
        match self.messages.add_fields(&fields).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(number = %number, error = %e, "Failed to store sent message");
                None
            }
        }
    }

    fn mark_sent(&self, path: &str, sent: bool) {
        let issued = self
            .messages
            .set_sent_status(path, sent)
            .and_then(|update| self.bridge.fire_and_forget("message_set_sent_status", update));
        if let Err(e) = issued {
            warn!(message = %path, error = %e, "Failed to update sent status");
        }
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::shared_callback;
    use crate::test_support::{ready_connection, wait_until};
    use phoneui_core::{MockBus, json};
    use parking_lot::Mutex;
    use std::sync::Arc;

    const DRAFT: &str = "/org/freesmartphone/PIM/Messages/9";

    fn recipient(fields: Value) -> Record {
        match fields {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn sms_bus(add: ServiceResult<Value>, send: ServiceResult<Value>) -> Arc<MockBus> {
        Arc::new(MockBus::new(move |_, method, _| match method {
            "Add" => add.clone(),
            "SendTextMessage" => send.clone(),
            _ => Ok(Value::Null),
        }))
    }

    type Results = Arc<Mutex<Vec<(ServiceResult<SmsReceipt>, &'static str)>>>;

    fn collector() -> (Results, Option<SharedCallback<SmsReceipt, &'static str>>) {
        let results: Results = Arc::new(Mutex::new(Vec::new()));
        let sink = results.clone();
        (results, shared_callback(move |r, u| sink.lock().push((r, u))))
    }

    #[tokio::test]
    async fn test_send_and_log_chain() {
        let bus = sms_bus(Ok(json!(DRAFT)), Ok(json!([7, "2010-01-01T00:00:00"])));
        let bridge = CallBridge::new(ready_connection(bus.clone()));
        let sms = SmsClient::new(bridge.clone(), true);
        let (results, callback) = collector();

        let ids = sms
            .send("hello", &[recipient(json!({ "Phone": "+49 (170) 123-45" }))], callback, "ctx")
            .unwrap();
        assert_eq!(ids.len(), 1);

        wait_until(|| bus.count("Update") == 1).await;
        wait_until(|| results.lock().len() == 1).await;

        let add = &bus.calls_to("Add")[0];
        let draft = &add.args[0];
        assert_eq!(draft["Peer"], json!("+4917012345"));
        assert_eq!(draft["Direction"], json!("out"));
        assert_eq!(draft["Source"], json!("SMS"));
        assert_eq!(draft["Content"], json!("hello"));
        assert_eq!(draft["New"], json!(true));
        assert!(draft["Timestamp"].as_i64().unwrap() > 0);

        let send = &bus.calls_to("SendTextMessage")[0];
        assert_eq!(send.args, vec![json!("+4917012345"), json!("hello"), json!(false)]);
        assert_eq!(send.target.interface, interface::GSM_SMS);

        let update = &bus.calls_to("Update")[0];
        assert_eq!(update.target.path, DRAFT);
        assert_eq!(update.args, vec![json!({ "New": false })]);

        let (result, userdata) = results.lock()[0].clone();
        assert_eq!(
            result,
            Ok(SmsReceipt {
                reference: 7,
                timestamp: "2010-01-01T00:00:00".into()
            })
        );
        assert_eq!(userdata, "ctx");

        wait_until(|| bridge.stats().in_flight() == 0).await;
        assert_eq!(bridge.stats().issued(), 2);
    }

    #[tokio::test]
    async fn test_failed_persist_still_sends() {
        let bus = sms_bus(
            Err(ServiceError::remote("org.freesmartphone.PIM.Error", "full")),
            Ok(json!([1, "now"])),
        );
        let bridge = CallBridge::new(ready_connection(bus.clone()));
        let sms = SmsClient::new(bridge.clone(), true);
        let (results, callback) = collector();

        sms.send("hi", &[recipient(json!({ "Phone": "0123" }))], callback, "x")
            .unwrap();

        wait_until(|| results.lock().len() == 1).await;
        assert!(results.lock()[0].0.is_ok());
        assert_eq!(bus.count("SendTextMessage"), 1);
        wait_until(|| bridge.stats().in_flight() == 0).await;
        assert_eq!(bus.count("Update"), 0);
    }

    #[tokio::test]
    async fn test_failed_send_marks_draft_unsent() {
        let bus = sms_bus(
            Ok(json!(DRAFT)),
            Err(ServiceError::remote("org.freesmartphone.GSM.Error", "no network")),
        );
        let sms = SmsClient::new(CallBridge::new(ready_connection(bus.clone())), true);
        let (results, callback) = collector();

        sms.send("hi", &[recipient(json!({ "Phone": "0123" }))], callback, "x")
            .unwrap();

        wait_until(|| results.lock().len() == 1).await;
        assert!(matches!(results.lock()[0].0, Err(ServiceError::Remote { .. })));
        wait_until(|| bus.count("Update") == 1).await;
        assert_eq!(bus.calls_to("Update")[0].args, vec![json!({ "New": true })]);
    }

    #[tokio::test]
    async fn test_logging_disabled_sends_directly() {
        let bus = sms_bus(Ok(json!(DRAFT)), Ok(json!([2, "t"])));
        let sms = SmsClient::new(CallBridge::new(ready_connection(bus.clone())), false);
        let (results, callback) = collector();

        sms.send("hi", &[recipient(json!({ "Phone": "0123" }))], callback, "x")
            .unwrap();

        wait_until(|| results.lock().len() == 1).await;
        assert_eq!(bus.count("Add"), 0);
        assert_eq!(bus.count("Update"), 0);
    }

    #[tokio::test]
    async fn test_fan_out_skips_recipients_without_number() {
        let bus = sms_bus(Ok(json!(DRAFT)), Ok(json!([3, "t"])));
        let sms = SmsClient::new(CallBridge::new(ready_connection(bus.clone())), false);
        let (results, callback) = collector();

        let recipients = [
            recipient(json!({ "Phone": "111" })),
            recipient(json!({ "Name": "No number" })),
            recipient(json!({ "Mobile phone": ["222", "333"] })),
        ];
        let ids = sms.send("hi", &recipients, callback, "fan").unwrap();
        assert_eq!(ids.len(), 2);

        wait_until(|| results.lock().len() == 2).await;
        let mut numbers: Vec<_> = bus
            .calls_to("SendTextMessage")
            .into_iter()
            .map(|c| c.args[0].clone())
            .collect();
        numbers.sort_by_key(|n| n.to_string());
        assert_eq!(numbers, vec![json!("111"), json!("222")]);
        assert!(results.lock().iter().all(|(_, u)| *u == "fan"));
    }

    #[test]
    fn test_empty_recipients_rejected() {
        let bus = Arc::new(MockBus::silent());
        let bridge = CallBridge::new(ready_connection(bus.clone()));
        let sms = SmsClient::new(bridge.clone(), true);

        let result = sms.send::<()>("hi", &[], None, ());
        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
        assert_eq!(bridge.stats().issued(), 0);
    }

    #[test]
    fn test_receipt_decodes_from_pair() {
        let receipt: SmsReceipt = serde_json::from_value(json!([5, "ts"])).unwrap();
        assert_eq!(receipt.reference, 5);
        assert_eq!(receipt.timestamp, "ts");
    }
}
