//! Contacts and contact field definitions.

use std::collections::BTreeMap;

use tracing::debug;

use phoneui_core::descriptor::AT_LEAST_ONE;
use phoneui_core::names::{self, interface};
use phoneui_core::record::PATH;
use phoneui_core::{Connection, Proxy, QueryDescriptor, QueryOptions, Record, ServiceResult, Value};

use crate::bridge::{CallFuture, discard, require};
use crate::query::{PimDomain, run_query};

/// Field type holding phone numbers.
pub const PHONENUMBER_TYPE: &str = "phonenumber";

/// Object path of the contact with the given entry id.
pub fn contact_path(id: i32) -> String {
    format!("{}/{}", names::PIM_CONTACTS_PATH, id)
}

#[derive(Debug, Clone)]
pub struct ContactsClient {
    connection: Connection,
}

impl ContactsClient {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    fn contacts(&self) -> Proxy {
        self.connection.proxy(PimDomain::Contacts.object())
    }

    fn fields_proxy(&self) -> Proxy {
        self.connection
            .proxy(names::pim_object(names::PIM_CONTACTS_PATH, interface::PIM_FIELDS))
    }

    fn contact(&self, path: &str) -> ServiceResult<Proxy> {
        require("path", path)?;
        Ok(self
            .connection
            .proxy(names::pim_object(path, interface::PIM_CONTACT)))
    }

    // =========================================================================
    // Entries
    // =========================================================================

    pub fn get(&self, path: &str) -> ServiceResult<CallFuture<Record>> {
        Ok(self.contact(path)?.request("GetContent", vec![]))
    }

    /// Stores a new contact; resolves to its path.
    pub fn add(&self, record: Record) -> CallFuture<String> {
        self.contacts().request("Add", vec![Value::Object(record)])
    }

    pub fn update(&self, path: &str, record: Record) -> ServiceResult<CallFuture<()>> {
        Ok(discard(self.contact(path)?, "Update", vec![Value::Object(record)]))
    }

    pub fn delete(&self, path: &str) -> ServiceResult<CallFuture<()>> {
        Ok(discard(self.contact(path)?, "Delete", vec![]))
    }

    /// The fields of a contact that have the given type.
    pub fn fields_for_type(&self, path: &str, field_type: &str) -> ServiceResult<CallFuture<Record>> {
        require("type", field_type)?;
        let selector = format!("${field_type}");
        Ok(self.contact(path)?.request("GetMultipleFields", vec![Value::from(selector)]))
    }

    /// Finds the contact owning `number`.
    ///
    /// Every field of type `phonenumber` is matched against the number; the
    /// first hit is read in full. Resolves to `None` when no contact matches.
    pub fn lookup(&self, number: &str) -> ServiceResult<CallFuture<Option<Record>>> {
        require("number", number)?;
        let number = number.to_string();
        let client = self.clone();

        Ok(Box::pin(async move {
            let fields: Vec<String> = client
                .fields_proxy()
                .call_as("ListFieldsWithType", vec![Value::from(PHONENUMBER_TYPE)])
                .await?;
            if fields.is_empty() {
                debug!("No phone number fields defined");
                return Ok(None);
            }

            let mut query = Record::new();
            query.insert(AT_LEAST_ONE.into(), Value::Bool(true));
            for field in fields {
                query.insert(field, Value::from(number.as_str()));
            }

            let path: Option<String> = client
                .contacts()
                .call_as(
                    "GetSingleEntrySingleField",
                    vec![Value::Object(query), Value::from(PATH)],
                )
                .await?;
            match path.filter(|p| !p.is_empty()) {
                Some(path) => {
                    debug!(number = %number, contact = %path, "Found contact");
                    client.get(&path)?.await.map(Some)
                }
                None => Ok(None),
            }
        }))
    }

    // =========================================================================
    // Field definitions
    // =========================================================================

    /// Field names mapped to their types, without system fields.
    pub fn fields(&self) -> CallFuture<BTreeMap<String, String>> {
        let proxy = self.fields_proxy();
        Box::pin(async move {
            let mut fields: BTreeMap<String, String> = proxy.call_as("ListFields", vec![]).await?;
            fields.remove(PATH);
            Ok(fields)
        })
    }

    pub fn fields_with_type(&self, field_type: &str) -> ServiceResult<CallFuture<Vec<String>>> {
        require("type", field_type)?;
        Ok(self
            .fields_proxy()
            .request("ListFieldsWithType", vec![Value::from(field_type)]))
    }

    /// Type of the named field.
    pub fn field_type(&self, name: &str) -> ServiceResult<CallFuture<String>> {
        require("name", name)?;
        Ok(self.fields_proxy().request("GetType", vec![Value::from(name)]))
    }

    pub fn field_add(&self, name: &str, field_type: &str) -> ServiceResult<CallFuture<()>> {
        require("name", name)?;
        require("type", field_type)?;
        Ok(discard(
            self.fields_proxy(),
            "AddField",
            vec![Value::from(name), Value::from(field_type)],
        ))
    }

    pub fn field_remove(&self, name: &str) -> ServiceResult<CallFuture<()>> {
        require("name", name)?;
        Ok(discard(self.fields_proxy(), "DeleteField", vec![Value::from(name)]))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Queries contacts; results are ordered by display name.
    pub fn query(&self, options: &QueryOptions, filter: Option<&Record>) -> CallFuture<Vec<Record>> {
        let descriptor = QueryDescriptor::build(options, filter);
        Box::pin(run_query(self.connection.clone(), PimDomain::Contacts, descriptor))
    }

    /// Every contact, ordered by display name.
    pub fn list(&self) -> CallFuture<Vec<Record>> {
        self.query(&QueryOptions::new(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ready_connection;
    use phoneui_core::{MockBus, ServiceError, json};
    use std::sync::Arc;

    const ALICE: &str = "/org/freesmartphone/PIM/Contacts/12";

    fn client(bus: &Arc<MockBus>) -> ContactsClient {
        ContactsClient::new(ready_connection(bus.clone()))
    }

    fn lookup_bus(fields: Value, hit: Value) -> Arc<MockBus> {
        Arc::new(MockBus::new(move |_, method, _| match method {
            "ListFieldsWithType" => Ok(fields.clone()),
            "GetSingleEntrySingleField" => Ok(hit.clone()),
            "GetContent" => Ok(json!({ "Name": "Alice", "Phone": "0123" })),
            _ => Ok(Value::Null),
        }))
    }

    #[test]
    fn test_contact_path() {
        assert_eq!(contact_path(12), ALICE);
    }

    #[tokio::test]
    async fn test_lookup_chain() {
        let bus = lookup_bus(json!(["Phone", "Mobile phone"]), json!(ALICE));
        let contact = client(&bus).lookup("0123").unwrap().await.unwrap().unwrap();

        assert_eq!(contact["Name"], json!("Alice"));

        let listing = &bus.calls_to("ListFieldsWithType")[0];
        assert_eq!(listing.args, vec![json!("phonenumber")]);
        assert_eq!(listing.target.interface, interface::PIM_FIELDS);

        let single = &bus.calls_to("GetSingleEntrySingleField")[0];
        assert_eq!(
            single.args[0],
            json!({ "_at_least_one": true, "Phone": "0123", "Mobile phone": "0123" })
        );
        assert_eq!(single.args[1], json!("Path"));

        let content = &bus.calls_to("GetContent")[0];
        assert_eq!(content.target.path, ALICE);
        assert_eq!(content.target.interface, interface::PIM_CONTACT);
    }

    #[tokio::test]
    async fn test_lookup_without_match() {
        let bus = lookup_bus(json!(["Phone"]), json!(""));
        assert_eq!(client(&bus).lookup("0123").unwrap().await, Ok(None));
        assert_eq!(bus.count("GetContent"), 0);

        let bus = lookup_bus(json!(["Phone"]), Value::Null);
        assert_eq!(client(&bus).lookup("0123").unwrap().await, Ok(None));
    }

    #[tokio::test]
    async fn test_lookup_without_phone_fields() {
        let bus = lookup_bus(json!([]), json!(ALICE));
        assert_eq!(client(&bus).lookup("0123").unwrap().await, Ok(None));
        assert_eq!(bus.count("GetSingleEntrySingleField"), 0);
    }

    #[tokio::test]
    async fn test_lookup_forwards_errors() {
        let bus = Arc::new(MockBus::new(|_, _, _| {
            Err(ServiceError::remote("org.freesmartphone.PIM.Error", "down"))
        }));
        let result = client(&bus).lookup("0123").unwrap().await;
        assert!(matches!(result, Err(ServiceError::Remote { .. })));
    }

    #[tokio::test]
    async fn test_fields_strip_path() {
        let bus = Arc::new(MockBus::new(|_, _, _| {
            Ok(json!({ "Name": "name", "Path": "objectpath", "Phone": "phonenumber" }))
        }));
        let fields = client(&bus).fields().await.unwrap();

        assert_eq!(fields.len(), 2);
        assert!(!fields.contains_key("Path"));
        assert_eq!(fields["Phone"], "phonenumber");
    }

    #[tokio::test]
    async fn test_fields_for_type_uses_selector() {
        let bus = Arc::new(MockBus::new(|_, _, _| Ok(json!({ "Phone": "0123" }))));
        client(&bus).fields_for_type(ALICE, "phonenumber").unwrap().await.unwrap();

        let call = &bus.calls_to("GetMultipleFields")[0];
        assert_eq!(call.args, vec![json!("$phonenumber")]);
        assert_eq!(call.target.path, ALICE);
    }

    #[tokio::test]
    async fn test_field_management() {
        let bus = Arc::new(MockBus::silent());
        let client = client(&bus);
        client.field_add("Birthday", "date").unwrap().await.unwrap();
        client.field_remove("Birthday").unwrap().await.unwrap();

        assert_eq!(bus.calls_to("AddField")[0].args, vec![json!("Birthday"), json!("date")]);
        assert_eq!(bus.calls_to("DeleteField")[0].args, vec![json!("Birthday")]);
        assert!(client.field_add("", "date").is_err());
    }

    #[tokio::test]
    async fn test_add_update_delete() {
        let bus = Arc::new(MockBus::new(|_, method, _| match method {
            "Add" => Ok(json!(ALICE)),
            _ => Ok(Value::Null),
        }));
        let client = client(&bus);

        let mut record = Record::new();
        record.insert("Name".into(), json!("Alice"));
        let path = client.add(record.clone()).await.unwrap();
        assert_eq!(path, ALICE);

        client.update(&path, record).unwrap().await.unwrap();
        client.delete(&path).unwrap().await.unwrap();

        assert_eq!(bus.calls_to("Add")[0].target.path, names::PIM_CONTACTS_PATH);
        assert_eq!(bus.calls_to("Update")[0].target.path, ALICE);
        assert_eq!(bus.calls_to("Delete")[0].target.path, ALICE);
        assert!(matches!(client.delete(""), Err(ServiceError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let bus = Arc::new(MockBus::new(|_, method, _| match method {
            "Query" => Ok(json!("/q/1")),
            "GetResultCount" => Ok(json!(3)),
            "GetMultipleResults" => Ok(json!([
                { "Name": "Zoe" },
                { "Nickname": "bob" },
                { "Phone": "0123" },
            ])),
            _ => Ok(Value::Null),
        }));
        let contacts = client(&bus).list().await.unwrap();

        assert_eq!(contacts[0]["Phone"], json!("0123"));
        assert_eq!(contacts[1]["Nickname"], json!("bob"));
        assert_eq!(contacts[2]["Name"], json!("Zoe"));
    }
}
