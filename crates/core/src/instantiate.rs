//! File-document construction from a template.
//!
//! A file's document wraps a point-in-time copy of the template's flat
//! document with the identity of the template it came from. The provenance
//! block never changes afterwards, even if the template is later edited or
//! deactivated.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::document::unwrap_document;
use crate::error::CoreError;

/// Identity snapshot of the template a file was instantiated from.
#[derive(Debug, Clone)]
pub struct TemplateIdentity<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub version: i32,
}

/// Build a new file document from a template's stored document.
///
/// The template document is deep-copied and unwrapped to its flat shape, so
/// the result is always `{template: {id, code, version}, data: {...}}`
/// regardless of which historical shape the template was stored in. The
/// source value is never mutated.
pub fn build_file_document(template: &TemplateIdentity<'_>, template_document: &Value) -> Value {
    let data = unwrap_document(template_document);
    json!({
        "template": {
            "id": template.id.to_string(),
            "code": template.code,
            "version": template.version,
        },
        "data": data,
    })
}

/// Byte length of the canonical (compact) JSON serialization of a document.
pub fn document_size_bytes(document: &Value) -> Result<i64, CoreError> {
    serde_json::to_vec(document)
        .map(|bytes| bytes.len() as i64)
        .map_err(|e| CoreError::Validation(format!("Document cannot be serialized: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> TemplateIdentity<'static> {
        TemplateIdentity {
            id: Uuid::nil(),
            code: "TPL-BASE-001",
            version: 4,
        }
    }

    #[test]
    fn wraps_flat_template_document_with_provenance() {
        let template_doc = json!({"columns": [{"key": "a"}], "nodes": []});
        let file_doc = build_file_document(&identity(), &template_doc);

        assert_eq!(
            file_doc["template"],
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "code": "TPL-BASE-001",
                "version": 4,
            })
        );
        assert_eq!(file_doc["data"], template_doc);
    }

    #[test]
    fn unwraps_legacy_wrapped_template_documents() {
        let template_doc = json!({
            "template": {"id": "old", "code": "OLD", "version": 1},
            "data": {"nodes": [{"id": "1"}]}
        });
        let file_doc = build_file_document(&identity(), &template_doc);

        // The stale inner provenance is discarded; only the flat data survives.
        assert_eq!(file_doc["data"], json!({"nodes": [{"id": "1"}]}));
        assert_eq!(file_doc["template"]["code"], "TPL-BASE-001");
    }

    #[test]
    fn source_template_document_is_not_mutated() {
        let template_doc = json!({"meta": {"name": "base"}, "nodes": [{"id": "1"}]});
        let before = template_doc.clone();
        let _ = build_file_document(&identity(), &template_doc);
        assert_eq!(template_doc, before);
    }

    #[test]
    fn size_is_compact_serialization_length() {
        let doc = json!({"a": 1, "b": "x"});
        // {"a":1,"b":"x"} -> 15 bytes, no extraneous whitespace.
        assert_eq!(document_size_bytes(&doc).unwrap(), 15);
    }

    #[test]
    fn size_counts_utf8_bytes_not_chars() {
        let doc = json!({"name": "Ítem"});
        let expected = serde_json::to_vec(&doc).unwrap().len() as i64;
        assert_eq!(document_size_bytes(&doc).unwrap(), expected);
    }
}
