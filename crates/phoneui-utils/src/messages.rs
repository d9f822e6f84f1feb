//! Stored messages.

use phoneui_core::names::{self, interface};
use phoneui_core::{Connection, Proxy, QueryDescriptor, QueryOptions, Record, ServiceResult, Value};

use crate::bridge::{CallFuture, discard, require};
use crate::query::{Direction, PimDomain, run_query};

pub const TIMESTAMP_FIELD: &str = "Timestamp";
pub const CONTENT_FIELD: &str = "Content";
pub const SOURCE_FIELD: &str = "Source";
pub const NEW_FIELD: &str = "New";
pub const PEER_FIELD: &str = "Peer";

/// The common fields of a message.
///
/// Only fields that are set make it into the record, except `New`, which
/// is always written. A timestamp of zero or less counts as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFields {
    pub direction: Option<Direction>,
    pub timestamp: i64,
    pub content: Option<String>,
    pub source: Option<String>,
    pub is_new: bool,
    pub peer: Option<String>,
}

impl MessageFields {
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        if let Some(direction) = self.direction {
            record.insert(Direction::FIELD.into(), direction.into());
        }
        if self.timestamp > 0 {
            record.insert(TIMESTAMP_FIELD.into(), Value::from(self.timestamp));
        }
        if let Some(content) = &self.content {
            record.insert(CONTENT_FIELD.into(), Value::from(content.as_str()));
        }
        if let Some(source) = &self.source {
            record.insert(SOURCE_FIELD.into(), Value::from(source.as_str()));
        }
        record.insert(NEW_FIELD.into(), Value::Bool(self.is_new));
        if let Some(peer) = &self.peer {
            record.insert(PEER_FIELD.into(), Value::from(peer.as_str()));
        }
        record
    }
}

#[derive(Debug, Clone)]
pub struct MessagesClient {
    connection: Connection,
}

impl MessagesClient {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    fn messages(&self) -> Proxy {
        self.connection.proxy(PimDomain::Messages.object())
    }

    fn message(&self, path: &str) -> ServiceResult<Proxy> {
        require("path", path)?;
        Ok(self
            .connection
            .proxy(names::pim_object(path, interface::PIM_MESSAGE)))
    }

    /// Stores a message; resolves to its path.
    pub fn add(&self, record: Record) -> CallFuture<String> {
        self.messages().request("Add", vec![Value::Object(record)])
    }

    pub fn add_fields(&self, fields: &MessageFields) -> CallFuture<String> {
        self.add(fields.to_record())
    }

    pub fn update(&self, path: &str, record: Record) -> ServiceResult<CallFuture<()>> {
        Ok(discard(self.message(path)?, "Update", vec![Value::Object(record)]))
    }

    pub fn update_fields(&self, path: &str, fields: &MessageFields) -> ServiceResult<CallFuture<()>> {
        self.update(path, fields.to_record())
    }

    pub fn delete(&self, path: &str) -> ServiceResult<CallFuture<()>> {
        Ok(discard(self.message(path)?, "Delete", vec![]))
    }

    pub fn set_new_status(&self, path: &str, is_new: bool) -> ServiceResult<CallFuture<()>> {
        let fields = MessageFields {
            is_new,
            ..MessageFields::default()
        };
        self.update_fields(path, &fields)
    }

    /// A read message is no longer new.
    pub fn set_read_status(&self, path: &str, read: bool) -> ServiceResult<CallFuture<()>> {
        self.set_new_status(path, !read)
    }

    /// A sent message is no longer new.
    pub fn set_sent_status(&self, path: &str, sent: bool) -> ServiceResult<CallFuture<()>> {
        self.set_new_status(path, !sent)
    }

    pub fn get(&self, path: &str) -> ServiceResult<CallFuture<Record>> {
        Ok(self.message(path)?.request("GetContent", vec![]))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn query(&self, options: &QueryOptions, filter: Option<&Record>) -> CallFuture<Vec<Record>> {
        let descriptor = QueryDescriptor::build(options, filter);
        Box::pin(run_query(self.connection.clone(), PimDomain::Messages, descriptor))
    }

    /// Queries messages matching the given fields.
    pub fn query_full(&self, options: &QueryOptions, fields: &MessageFields) -> CallFuture<Vec<Record>> {
        self.query(options, Some(&fields.to_record()))
    }

    pub fn get_full(&self, options: &QueryOptions, direction: Option<Direction>) -> CallFuture<Vec<Record>> {
        let mut filter = Record::new();
        if let Some(direction) = direction {
            filter.insert(Direction::FIELD.into(), direction.into());
        }
        self.query(options, Some(&filter))
    }

    /// Every message, newest first.
    pub fn get_all(&self) -> CallFuture<Vec<Record>> {
        let options = QueryOptions::new()
            .sort_by(TIMESTAMP_FIELD)
            .descending(true)
            .resolve_phonenumber(true);
        self.get_full(&options, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ready_connection;
    use phoneui_core::{MockBus, ServiceError, json};
    use std::sync::Arc;

    const MSG: &str = "/org/freesmartphone/PIM/Messages/3";

    fn client(bus: &Arc<MockBus>) -> MessagesClient {
        MessagesClient::new(ready_connection(bus.clone()))
    }

    #[test]
    fn test_fields_to_record() {
        let fields = MessageFields {
            direction: Some(Direction::Out),
            timestamp: 1_262_304_000,
            content: Some("hi".into()),
            source: Some("SMS".into()),
            is_new: true,
            peer: Some("0123".into()),
        };
        assert_eq!(
            Value::Object(fields.to_record()),
            json!({
                "Direction": "out",
                "Timestamp": 1_262_304_000,
                "Content": "hi",
                "Source": "SMS",
                "New": true,
                "Peer": "0123",
            })
        );
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let record = MessageFields::default().to_record();
        assert_eq!(Value::Object(record), json!({ "New": false }));

        let fields = MessageFields {
            timestamp: -5,
            ..MessageFields::default()
        };
        assert!(!fields.to_record().contains_key("Timestamp"));
    }

    #[tokio::test]
    async fn test_status_updates_flip_new() {
        let bus = Arc::new(MockBus::silent());
        let client = client(&bus);

        client.set_read_status(MSG, true).unwrap().await.unwrap();
        client.set_sent_status(MSG, false).unwrap().await.unwrap();
        client.set_new_status(MSG, false).unwrap().await.unwrap();

        let updates = bus.calls_to("Update");
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].args, vec![json!({ "New": false })]);
        assert_eq!(updates[1].args, vec![json!({ "New": true })]);
        assert_eq!(updates[2].args, vec![json!({ "New": false })]);
        assert_eq!(updates[0].target.interface, interface::PIM_MESSAGE);
        assert_eq!(updates[0].target.path, MSG);
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let bus = Arc::new(MockBus::silent());
        let client = client(&bus);
        assert!(matches!(client.get(""), Err(ServiceError::InvalidArgument(_))));
        assert!(matches!(client.delete(""), Err(ServiceError::InvalidArgument(_))));
        assert!(matches!(client.set_read_status("", true), Err(ServiceError::InvalidArgument(_))));
        assert!(bus.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_fields_goes_to_messages() {
        let bus = Arc::new(MockBus::new(|_, _, _| Ok(json!(MSG))));
        let fields = MessageFields {
            content: Some("hello".into()),
            ..MessageFields::default()
        };
        let path = client(&bus).add_fields(&fields).await.unwrap();

        assert_eq!(path, MSG);
        let add = &bus.calls_to("Add")[0];
        assert_eq!(add.target.path, names::PIM_MESSAGES_PATH);
        assert_eq!(add.target.interface, interface::PIM_MESSAGES);
    }

    #[tokio::test]
    async fn test_get_all_query() {
        let bus = Arc::new(MockBus::new(|_, method, _| match method {
            "Query" => Ok(json!("/q/2")),
            "GetResultCount" => Ok(json!(2)),
            "GetMultipleResults" => Ok(json!([{ "Content": "b" }, { "Content": "a" }])),
            _ => Ok(Value::Null),
        }));
        let messages = client(&bus).get_all().await.unwrap();

        assert_eq!(messages[0]["Content"], json!("b"));
        let descriptor = &bus.calls_to("Query")[0].args[0];
        assert_eq!(descriptor["_sortby"], json!("Timestamp"));
        assert_eq!(descriptor["_sortdesc"], json!(true));
        assert_eq!(descriptor["_limit"], json!(-1));
        assert_eq!(descriptor["_resolve_phonenumber"], json!(true));
        assert!(descriptor.get("Direction").is_none());
    }

    #[tokio::test]
    async fn test_query_full_uses_fields_as_filter() {
        let bus = Arc::new(MockBus::new(|_, method, _| match method {
            "Query" => Ok(json!("/q/3")),
            _ => Ok(json!(0)),
        }));
        let fields = MessageFields {
            peer: Some("0123".into()),
            is_new: true,
            ..MessageFields::default()
        };
        client(&bus)
            .query_full(&QueryOptions::new().at_least_one(true), &fields)
            .await
            .unwrap();

        let descriptor = &bus.calls_to("Query")[0].args[0];
        assert_eq!(descriptor["Peer"], json!("0123"));
        assert_eq!(descriptor["New"], json!(true));
        assert_eq!(descriptor["_at_least_one"], json!(true));
    }
}
