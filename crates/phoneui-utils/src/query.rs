//! Paged PIM queries.
//!
//! A query runs in four steps, each gated on the previous one:
//!
//! ```text
//! Query(descriptor) ──▶ GetResultCount ──▶ GetMultipleResults(count) ──▶ Dispose
//! ```
//!
//! Once the server has handed out a cursor path, the cursor is disposed
//! exactly once, whether or not counting and fetching succeed.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, trace};

use phoneui_core::record::sort_by_display_name;
use phoneui_core::{Connection, ObjectRef, Proxy, QueryDescriptor, Record, ServiceResult, Value, names};

/// A PIM storage domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PimDomain {
    Calls,
    Contacts,
    Messages,
    Notes,
}

impl PimDomain {
    pub fn path(self) -> &'static str {
        match self {
            PimDomain::Calls => names::PIM_CALLS_PATH,
            PimDomain::Contacts => names::PIM_CONTACTS_PATH,
            PimDomain::Messages => names::PIM_MESSAGES_PATH,
            PimDomain::Notes => names::PIM_NOTES_PATH,
        }
    }

    pub fn interface(self) -> &'static str {
        match self {
            PimDomain::Calls => names::interface::PIM_CALLS,
            PimDomain::Contacts => names::interface::PIM_CONTACTS,
            PimDomain::Messages => names::interface::PIM_MESSAGES,
            PimDomain::Notes => names::interface::PIM_NOTES,
        }
    }

    /// Interface of the cursor objects this domain hands out.
    pub fn query_interface(self) -> &'static str {
        match self {
            PimDomain::Calls => names::interface::PIM_CALL_QUERY,
            PimDomain::Contacts => names::interface::PIM_CONTACT_QUERY,
            PimDomain::Messages => names::interface::PIM_MESSAGE_QUERY,
            PimDomain::Notes => names::interface::PIM_NOTE_QUERY,
        }
    }

    /// The domain's collection object.
    pub fn object(self) -> ObjectRef {
        names::pim_object(self.path(), self.interface())
    }

    /// Whether results are reordered client-side by display name.
    ///
    /// Other domains keep the server order requested through `_sortby`.
    pub fn sorts_by_display_name(self) -> bool {
        self == PimDomain::Contacts
    }
}

/// Direction of a call or message, as stored in the `Direction` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub const FIELD: &'static str = "Direction";

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Direction> for Value {
    fn from(direction: Direction) -> Self {
        Value::from(direction.as_str())
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// Server-side result cursor, disposed on drop.
struct QueryCursor {
    proxy: Option<Proxy>,
}

impl QueryCursor {
    fn new(proxy: Proxy) -> Self {
        Self { proxy: Some(proxy) }
    }

    fn proxy(&self) -> Option<&Proxy> {
        self.proxy.as_ref()
    }

    async fn count(&self) -> ServiceResult<i32> {
        match self.proxy() {
            Some(proxy) => proxy.call_as("GetResultCount", vec![]).await,
            None => Ok(0),
        }
    }

    async fn fetch(&self, count: i32) -> ServiceResult<Vec<Record>> {
        match self.proxy() {
            Some(proxy) => proxy.call_as("GetMultipleResults", vec![Value::from(count)]).await,
            None => Ok(Vec::new()),
        }
    }

    /// Sends `Dispose` without waiting for the reply.
    fn dispose(&mut self) {
        let Some(proxy) = self.proxy.take() else {
            return;
        };

        let path = proxy.object().path.clone();
        match Handle::try_current() {
            Ok(runtime) => {
                trace!(cursor = %path, "Disposing query cursor");
                runtime.spawn(async move {
                    if let Err(e) = proxy.release("Dispose", vec![]).await {
                        debug!(cursor = %path, error = %e, "Failed to dispose query cursor");
                    }
                });
            }
            Err(_) => debug!(cursor = %path, "No runtime left to dispose query cursor"),
        }
    }
}

impl Drop for QueryCursor {
    fn drop(&mut self) {
        self.dispose();
    }
}

// =============================================================================
// Query
// =============================================================================

/// Runs a complete paged query against `domain`.
pub async fn run_query(
    connection: Connection,
    domain: PimDomain,
    descriptor: QueryDescriptor,
) -> ServiceResult<Vec<Record>> {
    let collection = connection.proxy(domain.object());
    let cursor_path: String = collection.call_as("Query", vec![descriptor.into_value()]).await?;
    trace!(domain = ?domain, cursor = %cursor_path, "Query cursor opened");

    let mut cursor = QueryCursor::new(
        connection.proxy(names::pim_object(&cursor_path, domain.query_interface())),
    );
    let fetched = fetch_all(&cursor).await;
    cursor.dispose();

    let mut entries = fetched?;
    if domain.sorts_by_display_name() {
        sort_by_display_name(&mut entries);
    }
    Ok(entries)
}

async fn fetch_all(cursor: &QueryCursor) -> ServiceResult<Vec<Record>> {
    let count = cursor.count().await?;
    if count <= 0 {
        return Ok(Vec::new());
    }
    cursor.fetch(count).await
}
