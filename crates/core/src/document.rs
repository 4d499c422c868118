//! Canonical document access and legacy-shape unwrapping.
//!
//! Template documents were stored in three different shapes over the life of
//! the product. Rather than migrating stored rows, every read goes through
//! [`unwrap_document`], which recognizes each historical shape and returns
//! the flat `{ui, meta, columns, nodes, ...}` object. All legacy-shape
//! knowledge lives in this module.

use serde_json::{Map, Value};

/// Name of the nested container holding per-node custom fields.
pub const CUSTOM_KEY: &str = "custom";

/// Extract the flat document from a raw stored JSON value.
///
/// Shapes are tried in order:
///
/// 1. `{template: {...}, data: {...}}` -- the canonical file wrapper;
///    returns `data`.
/// 2. `{data: {...}}` where `data` holds at least one of `columns` / `nodes`
///    / `meta` -- an accidentally double-wrapped document; returns `data`.
/// 3. Anything else -- already flat; returned unchanged.
///
/// Non-object input yields an empty object. Applying the function to its own
/// output is a no-op for well-formed documents.
pub fn unwrap_document(raw: &Value) -> Value {
    let Some(obj) = raw.as_object() else {
        return Value::Object(Map::new());
    };

    if obj.contains_key("template") {
        if let Some(data) = obj.get("data").and_then(Value::as_object) {
            return Value::Object(data.clone());
        }
    }

    if let Some(data) = obj.get("data").and_then(Value::as_object) {
        if data.contains_key("columns") || data.contains_key("nodes") || data.contains_key("meta")
        {
            return Value::Object(data.clone());
        }
    }

    raw.clone()
}

/// The document's data nodes, or an empty slice when absent or not an array.
pub fn document_nodes(document: &Value) -> &[Value] {
    document
        .get("nodes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The document's column specification, or an empty slice.
pub fn document_columns(document: &Value) -> &[Value] {
    document
        .get("columns")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_template_data_wrapper() {
        let raw = json!({
            "template": {"id": "t1", "code": "TPL-1", "version": 3},
            "data": {"columns": [], "nodes": [{"id": "1"}]}
        });
        let flat = unwrap_document(&raw);
        assert_eq!(flat, json!({"columns": [], "nodes": [{"id": "1"}]}));
    }

    #[test]
    fn unwraps_double_wrapped_data() {
        let raw = json!({"data": {"meta": {"name": "x"}, "nodes": []}});
        let flat = unwrap_document(&raw);
        assert_eq!(flat, json!({"meta": {"name": "x"}, "nodes": []}));
    }

    #[test]
    fn leaves_flat_document_unchanged() {
        let raw = json!({"ui": {}, "meta": {}, "columns": [], "nodes": []});
        assert_eq!(unwrap_document(&raw), raw);
    }

    #[test]
    fn data_key_without_document_markers_stays_put() {
        // A flat document that happens to carry an unrelated "data" field.
        let raw = json!({"nodes": [], "data": {"unrelated": true}});
        assert_eq!(unwrap_document(&raw), raw);
    }

    #[test]
    fn template_wrapper_with_non_object_data_falls_through() {
        let raw = json!({"template": {"id": "t"}, "data": [1, 2]});
        assert_eq!(unwrap_document(&raw), raw);
    }

    #[test]
    fn non_object_input_yields_empty_object() {
        assert_eq!(unwrap_document(&json!(null)), json!({}));
        assert_eq!(unwrap_document(&json!([1, 2])), json!({}));
        assert_eq!(unwrap_document(&json!("text")), json!({}));
    }

    #[test]
    fn unwrap_is_idempotent() {
        let shapes = [
            json!({"template": {"id": "t"}, "data": {"nodes": [{"id": "1"}]}}),
            json!({"data": {"columns": [{"key": "a"}]}}),
            json!({"ui": {}, "nodes": []}),
            json!(null),
        ];
        for raw in shapes {
            let once = unwrap_document(&raw);
            assert_eq!(unwrap_document(&once), once, "shape: {raw}");
        }
    }

    #[test]
    fn node_and_column_accessors_tolerate_missing_fields() {
        let doc = json!({"meta": {}});
        assert!(document_nodes(&doc).is_empty());
        assert!(document_columns(&doc).is_empty());

        let doc = json!({"nodes": "not-an-array", "columns": 7});
        assert!(document_nodes(&doc).is_empty());
        assert!(document_columns(&doc).is_empty());
    }
}
