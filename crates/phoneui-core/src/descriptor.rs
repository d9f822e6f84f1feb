//! Query descriptors sent to the PIM query methods.
//!
//! A descriptor is a flat field map. Keys starting with [`RESERVED_PREFIX`]
//! are control keys interpreted by the service (sorting, paging, phone
//! number resolution); every other key is a field filter.

use serde_json::Value;
use tracing::debug;

use crate::record::Record;

/// Prefix shared by every control key.
pub const RESERVED_PREFIX: char = '_';

/// Field to sort by.
pub const SORT_BY: &str = "_sortby";
/// Sort descending when `true`.
pub const SORT_DESC: &str = "_sortdesc";
/// Match any filter field instead of all of them.
pub const AT_LEAST_ONE: &str = "_at_least_one";
/// Let the service resolve phone numbers to contacts.
pub const RESOLVE_PHONENUMBER: &str = "_resolve_phonenumber";
/// Index of the first result.
pub const LIMIT_START: &str = "_limit_start";
/// Maximum number of results, `-1` for no limit.
pub const LIMIT: &str = "_limit";

/// Returns `true` if `key` is in the reserved control namespace.
pub fn is_reserved(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}

// =============================================================================
// QueryOptions
// =============================================================================

/// Control options of a PIM query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Field to sort by; empty names are ignored.
    pub sort_by: Option<String>,
    /// Reverse the sort order.
    pub sort_desc: bool,
    /// Disjunction of the filter fields.
    pub at_least_one: bool,
    /// Resolve phone numbers to contacts.
    pub resolve_phonenumber: bool,
    /// Index of the first result.
    pub limit_start: i32,
    /// Maximum number of results, `-1` for no limit.
    pub limit: i32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            sort_by: None,
            sort_desc: false,
            at_least_one: false,
            resolve_phonenumber: false,
            limit_start: 0,
            limit: -1,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_by = Some(field.into());
        self
    }

    pub fn descending(mut self, desc: bool) -> Self {
        self.sort_desc = desc;
        self
    }

    pub fn at_least_one(mut self, yes: bool) -> Self {
        self.at_least_one = yes;
        self
    }

    pub fn resolve_phonenumber(mut self, yes: bool) -> Self {
        self.resolve_phonenumber = yes;
        self
    }

    pub fn start(mut self, start: i32) -> Self {
        self.limit_start = start;
        self
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = limit;
        self
    }
}

// =============================================================================
// QueryDescriptor
// =============================================================================

/// A query payload: control keys plus a copy of the caller's filter fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryDescriptor {
    fields: Record,
}

impl QueryDescriptor {
    /// Builds a fresh descriptor.
    ///
    /// Control keys come from `options`. Filter fields are shallow-copied
    /// from `filter`; filter keys in the reserved namespace are dropped so
    /// they never replace a control key. `filter` itself is left untouched.
    pub fn build(options: &QueryOptions, filter: Option<&Record>) -> Self {
        let mut fields = Record::new();

        if let Some(sort_by) = options.sort_by.as_deref().filter(|s| !s.is_empty()) {
            fields.insert(SORT_BY.into(), Value::from(sort_by));
        }
        if options.sort_desc {
            fields.insert(SORT_DESC.into(), Value::Bool(true));
        }
        if options.at_least_one {
            fields.insert(AT_LEAST_ONE.into(), Value::Bool(true));
        }
        if options.resolve_phonenumber {
            fields.insert(RESOLVE_PHONENUMBER.into(), Value::Bool(true));
        }
        fields.insert(LIMIT_START.into(), Value::from(options.limit_start));
        fields.insert(LIMIT.into(), Value::from(options.limit));

        for (key, value) in filter.into_iter().flatten() {
            if is_reserved(key) {
                debug!(key = %key, "Dropping reserved key from query filter");
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }

        Self { fields }
    }

    /// Adds a filter field. Reserved keys are rejected and `false` returned.
    pub fn insert_filter(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if is_reserved(&key) {
            return false;
        }
        self.fields.insert(key, value.into());
        true
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<QueryDescriptor> for Value {
    fn from(descriptor: QueryDescriptor) -> Self {
        descriptor.into_value()
    }
}
