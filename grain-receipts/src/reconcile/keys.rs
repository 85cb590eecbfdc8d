//! Join key derivation
//!
//! Both sources carry the application document number, but the ticket side
//! stores it zero-padded while the invoice side may not. Keys are compared
//! after stripping whitespace and leading zeros.

use serde_json::Value;

/// Normalize an identifier into a join key.
///
/// Leading zeros and surrounding whitespace are removed; an all-zero or blank
/// identifier yields the empty key, which never joins.
pub fn derive_key(raw: &str) -> String {
    raw.trim_start_matches(|c: char| c == '0' || c.is_whitespace())
        .trim_end()
        .to_string()
}

/// Join key of a field value; null and missing values yield the empty key
pub fn key_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => derive_key(s),
        Some(Value::Number(n)) => match (n.as_u64(), n.as_i64()) {
            (Some(u), _) => derive_key(&u.to_string()),
            (None, Some(i)) => derive_key(&i.to_string()),
            _ => derive_key(&n.to_string()),
        },
        Some(other) => derive_key(&other.to_string()),
    }
}
