//! Left join of ticket rows onto invoice rows

use super::keys::key_of;
use serde_json::Value;
use shared::RawRow;
use std::collections::{HashMap, HashSet};

/// Suffix for invoice fields whose name already exists on the ticket side
pub const SECONDARY_SUFFIX: &str = "_fat";

/// Left-join `primary` onto `secondary`.
///
/// Every primary row appears once per matching secondary row, or once with
/// null secondary fields when nothing matches. Rows whose key is empty never
/// match. `fallback_columns` names the secondary fields to add when the
/// secondary side has no rows at all.
pub fn left_join(
    primary: Vec<RawRow>,
    primary_key: &str,
    secondary: &[RawRow],
    secondary_key: &str,
    fallback_columns: &[String],
) -> Vec<RawRow> {
    let secondary_columns = secondary_columns(secondary, fallback_columns);
    let primary_columns: HashSet<&str> = primary
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    // Output name of each secondary column
    let output_names: Vec<String> = secondary_columns
        .iter()
        .map(|c| {
            if primary_columns.contains(c.as_str()) {
                format!("{c}{SECONDARY_SUFFIX}")
            } else {
                c.clone()
            }
        })
        .collect();

    let mut index: HashMap<String, Vec<&RawRow>> = HashMap::new();
    for row in secondary {
        let key = key_of(row.get(secondary_key));
        if !key.is_empty() {
            index.entry(key).or_default().push(row);
        }
    }

    let mut joined = Vec::with_capacity(primary.len());
    for row in primary {
        let key = key_of(row.get(primary_key));
        let matches = if key.is_empty() {
            None
        } else {
            index.get(&key)
        };

        match matches {
            Some(matches) => {
                for matched in matches {
                    let mut out = row.clone();
                    for (column, name) in secondary_columns.iter().zip(&output_names) {
                        let value = matched.get(column).cloned().unwrap_or(Value::Null);
                        out.insert(name.clone(), value);
                    }
                    joined.push(out);
                }
            }
            None => {
                let mut out = row;
                for name in &output_names {
                    out.insert(name.clone(), Value::Null);
                }
                joined.push(out);
            }
        }
    }

    joined
}

/// Secondary field names in first-seen order, or the fallback when there are no rows
fn secondary_columns(secondary: &[RawRow], fallback: &[String]) -> Vec<String> {
    if secondary.is_empty() {
        return fallback.to_vec();
    }
    let mut seen = HashSet::new();
    secondary
        .iter()
        .flat_map(|row| row.keys())
        .filter(|k| seen.insert(k.as_str()))
        .cloned()
        .collect()
}
