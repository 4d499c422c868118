//! Column-header resolution for file instantiation and spreadsheet export.
//!
//! A document's column specification is an ordered array of entries that may
//! use either `key`/`label` or the older `id`/`name` field names. Resolution
//! produces three aligned sequences (keys, display headers, lower-cased
//! types) that drive both placeholder generation and the export header row.
//! When a document declares no columns at all, keys are inferred by scanning
//! the nodes.

use serde_json::Value;

use crate::document::CUSTOM_KEY;

/// Keys that, when discovered by the node scan, are pulled to the front of
/// the inferred column order.
const PREFERRED_KEYS: [&str; 11] = [
    "id", "code", "title", "type", "parentId", "viKey", "vcKey", "weight", "required", "active",
    "order",
];

/// Aligned, ordered column metadata: `keys[i]` / `headers[i]` / `types[i]`
/// describe the same column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub keys: Vec<String>,
    pub headers: Vec<String>,
    pub types: Vec<String>,
}

impl ResolvedColumns {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

/// The column key of a specification entry: `key`, falling back to `id`.
pub fn column_key(entry: &Value) -> Option<&str> {
    entry
        .get("key")
        .and_then(Value::as_str)
        .or_else(|| entry.get("id").and_then(Value::as_str))
}

/// The display label of a specification entry: `label`, falling back to `name`.
pub fn column_label(entry: &Value) -> Option<&str> {
    entry
        .get("label")
        .and_then(Value::as_str)
        .or_else(|| entry.get("name").and_then(Value::as_str))
}

/// Resolve an ordered column specification into aligned keys/headers/types.
///
/// Entries whose key is empty after trimming are skipped. The header is the
/// trimmed label when present, otherwise the key; a header that already
/// appeared earlier in the sequence is disambiguated by appending the key in
/// parentheses, so only the first occurrence keeps the bare label. Types are
/// lower-cased; a missing type yields an empty string.
pub fn resolve_columns(columns: &[Value]) -> ResolvedColumns {
    let mut keys = Vec::with_capacity(columns.len());
    let mut headers: Vec<String> = Vec::with_capacity(columns.len());
    let mut types = Vec::with_capacity(columns.len());

    for entry in columns {
        let Some(key) = column_key(entry).map(str::trim).filter(|k| !k.is_empty()) else {
            continue;
        };

        let label = column_label(entry)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(key);

        let header = if headers.iter().any(|h| h == label) {
            format!("{label} ({key})")
        } else {
            label.to_string()
        };

        let ty = entry
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_lowercase();

        keys.push(key.to_string());
        headers.push(header);
        types.push(ty);
    }

    ResolvedColumns {
        keys,
        headers,
        types,
    }
}

/// Infer column keys by scanning node attributes, for documents that declare
/// no columns.
///
/// Collects every top-level attribute name (excluding the custom container)
/// and every nested custom attribute name in first-seen order, then moves
/// the [`PREFERRED_KEYS`] that were discovered to the front. Headers equal
/// keys and all types are empty.
pub fn infer_columns_from_nodes(nodes: &[Value]) -> ResolvedColumns {
    let mut seen: Vec<String> = Vec::new();

    for node in nodes {
        let Some(obj) = node.as_object() else { continue };
        for key in obj.keys() {
            if key != CUSTOM_KEY && !seen.iter().any(|s| s == key) {
                seen.push(key.clone());
            }
        }
        if let Some(custom) = obj.get(CUSTOM_KEY).and_then(Value::as_object) {
            for key in custom.keys() {
                if !seen.iter().any(|s| s == key) {
                    seen.push(key.clone());
                }
            }
        }
    }

    let mut keys: Vec<String> = PREFERRED_KEYS
        .iter()
        .filter(|preferred| seen.iter().any(|s| s == *preferred))
        .map(|s| s.to_string())
        .collect();
    for key in seen {
        if !keys.iter().any(|k| *k == key) {
            keys.push(key);
        }
    }

    ResolvedColumns {
        headers: keys.clone(),
        types: vec![String::new(); keys.len()],
        keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_key_label_type() {
        let columns = [
            json!({"key": "code", "label": "Código", "type": "Text"}),
            json!({"key": "desc", "label": "Descripción", "type": "LONGTEXT"}),
        ];
        let resolved = resolve_columns(&columns);
        assert_eq!(resolved.keys, ["code", "desc"]);
        assert_eq!(resolved.headers, ["Código", "Descripción"]);
        assert_eq!(resolved.types, ["text", "longtext"]);
    }

    #[test]
    fn accepts_legacy_id_name_entries() {
        let columns = [json!({"id": "col_item", "name": "Ítem", "type": "text"})];
        let resolved = resolve_columns(&columns);
        assert_eq!(resolved.keys, ["col_item"]);
        assert_eq!(resolved.headers, ["Ítem"]);
    }

    #[test]
    fn skips_entries_without_a_key() {
        let columns = [
            json!({"label": "orphan"}),
            json!({"key": "  ", "label": "blank"}),
            json!({"key": "kept"}),
        ];
        let resolved = resolve_columns(&columns);
        assert_eq!(resolved.keys, ["kept"]);
    }

    #[test]
    fn missing_label_falls_back_to_key() {
        let columns = [json!({"key": "weight"}), json!({"key": "x", "label": "   "})];
        let resolved = resolve_columns(&columns);
        assert_eq!(resolved.headers, ["weight", "x"]);
    }

    #[test]
    fn duplicate_labels_are_disambiguated() {
        let columns = [
            json!({"key": "a", "label": "A"}),
            json!({"key": "a", "label": "A"}),
        ];
        let resolved = resolve_columns(&columns);
        assert_eq!(resolved.headers, ["A", "A (a)"]);
    }

    #[test]
    fn headers_are_unique_across_mixed_sources() {
        let columns = [
            json!({"key": "code", "label": "Código"}),
            json!({"key": "codigo", "label": "Código"}),
        ];
        let resolved = resolve_columns(&columns);
        assert_eq!(resolved.headers, ["Código", "Código (codigo)"]);
        let mut deduped = resolved.headers.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), resolved.headers.len());
    }

    #[test]
    fn infers_keys_in_first_seen_order_with_preferred_front() {
        let nodes = [
            json!({"zeta": 1, "code": "C-1", "custom": {"Descripción": "x"}}),
            json!({"id": "2", "alpha": true}),
        ];
        let resolved = infer_columns_from_nodes(&nodes);
        // Preferred keys first (id, code), then discovery order.
        assert_eq!(resolved.keys, ["id", "code", "zeta", "Descripción", "alpha"]);
        assert_eq!(resolved.headers, resolved.keys);
        assert!(resolved.types.iter().all(String::is_empty));
    }

    #[test]
    fn inference_excludes_the_custom_container_itself() {
        let nodes = [json!({"id": "1", "custom": {"extra": 1}})];
        let resolved = infer_columns_from_nodes(&nodes);
        assert_eq!(resolved.keys, ["id", "extra"]);
    }

    #[test]
    fn inference_of_empty_nodes_is_empty() {
        assert!(infer_columns_from_nodes(&[]).is_empty());
    }
}
