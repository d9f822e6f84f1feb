//! PIM records and the display-name ordering used for contact lists.
//!
//! A record is a flat map from field name to typed value, exactly as the
//! PIM service hands it out. Contact records carry the name components
//! [`NAME`], [`NICKNAME`], [`MIDDLENAME`], [`SURNAME`] and [`AFFILIATION`];
//! [`display_name`] folds them into a single string by a fixed priority.

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// A PIM record: field name to typed value.
pub type Record = Map<String, Value>;

/// Given name.
pub const NAME: &str = "Name";
/// Nickname.
pub const NICKNAME: &str = "Nickname";
/// Middle name.
pub const MIDDLENAME: &str = "Middlename";
/// Family name.
pub const SURNAME: &str = "Surname";
/// Affiliation / organisation.
pub const AFFILIATION: &str = "Affiliation";
/// System field holding the object path of a record.
pub const PATH: &str = "Path";
/// Default phone number field.
pub const PHONE: &str = "Phone";

/// Characters stripped from phone numbers before dialling or sending.
const FILLER_CHARS: &[char] = &[' ', '-', '(', ')', '.', '/'];

fn field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

/// Derives the display name of a contact record.
///
/// Returns `None` when none of the name components is present.
pub fn display_name(record: &Record) -> Option<String> {
    let name = field(record, NAME);
    let nick = field(record, NICKNAME);
    let middle = field(record, MIDDLENAME);
    let surname = field(record, SURNAME);
    let affiliation = field(record, AFFILIATION);

    let display = match (name, nick, middle, surname, affiliation) {
        (Some(n), Some(k), _, Some(s), Some(a)) => format!("{n} '{k}' {s} ({a})"),
        (Some(n), Some(k), _, Some(s), None) => format!("{n} '{k}' {s}"),
        (Some(n), _, Some(m), Some(s), Some(a)) => format!("{n} {m} {s} ({a})"),
        (Some(n), _, Some(m), Some(s), None) => format!("{n} {m} {s}"),
        (Some(n), _, _, Some(s), Some(a)) => format!("{n} {s} ({a})"),
        (Some(n), _, _, Some(s), None) => format!("{n} {s}"),
        (_, Some(k), _, _, Some(a)) => format!("{k} ({a})"),
        (_, Some(k), _, _, None) => k.to_string(),
        (Some(n), _, _, _, Some(a)) => format!("{n} ({a})"),
        (Some(n), _, _, _, None) => n.to_string(),
        (None, None, _, Some(s), Some(a)) => format!("{s} ({a})"),
        (None, None, _, Some(s), None) => s.to_string(),
        (None, None, _, None, Some(a)) => a.to_string(),
        (None, None, _, None, None) => return None,
    };
    Some(display)
}

/// Collates two display names: case-folded first, raw text as tie-break.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

/// Orders two contact records by display name.
///
/// Records without a display name sort before every named record and are
/// equal among themselves.
pub fn compare_by_display_name(a: &Record, b: &Record) -> Ordering {
    match (display_name(a), display_name(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => collate(&a, &b),
    }
}

/// Stable in-place sort of contact records by display name.
pub fn sort_by_display_name(records: &mut [Record]) {
    records.sort_by_cached_key(|r| display_name(r).map(SortKey));
}

/// Sort key wrapper so cached keys use [`collate`].
#[derive(PartialEq, Eq)]
struct SortKey(String);

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        collate(&self.0, &other.0)
    }
}

/// Picks the phone number to use for a contact.
///
/// The field named exactly `Phone` wins; otherwise the first field whose
/// name mentions a phone is used. List values contribute their first entry.
pub fn display_phone(record: &Record) -> Option<String> {
    fn phone_value(value: &Value) -> Option<&str> {
        match value {
            Value::String(s) => Some(s),
            Value::Array(items) => items.first().and_then(Value::as_str),
            _ => None,
        }
    }

    if let Some(phone) = record.get(PHONE).and_then(phone_value) {
        return Some(phone.to_string());
    }

    record
        .iter()
        .filter(|(key, _)| key.contains("Phone") || key.contains("phone"))
        .find_map(|(_, value)| phone_value(value))
        .map(str::to_string)
}

/// Removes filler characters (spaces, dashes, brackets, dots, slashes).
pub fn strip_filler_chars(number: &str) -> String {
    number.chars().filter(|c| !FILLER_CHARS.contains(c)).collect()
}
