//! Multi-sheet xlsx export of a file document.
//!
//! The workbook is assembled fully in memory and returned as a byte buffer;
//! there is no partial-result or streaming path. Sheet order and the column
//! width heuristics are fixed so repeated exports of the same file are
//! byte-for-byte comparable.

use regex::Regex;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};
use serde_json::Value;

use crate::document::{document_columns, document_nodes, unwrap_document};
use crate::error::CoreError;
use crate::flatten::{flatten_row, render_cell, Scales};
use crate::headers::{column_key, column_label, infer_columns_from_nodes, resolve_columns};

/// Maximum length of the sanitized download filename (before the extension).
const MAX_FILENAME_LENGTH: usize = 120;

/// Background fill of header rows.
const HEADER_FILL: Color = Color::RGB(0xD9D9D9);

/// File-level fields shown on the Meta sheet.
#[derive(Debug, Clone)]
pub struct FileExportMeta {
    pub id: String,
    pub code: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<XlsxError> for CoreError {
    fn from(err: XlsxError) -> Self {
        CoreError::Internal(format!("Spreadsheet construction failed: {err}"))
    }
}

/// Build the export workbook for a file and return the xlsx bytes.
///
/// Sheets, in order: Checklist (one row per node), Meta (file and template
/// identity plus the document's `meta` entries), Preguntas, Intro, Columnas.
/// A file without a document is rejected before any workbook construction.
pub fn emit_workbook(file: &FileExportMeta, document: &Value) -> Result<Vec<u8>, CoreError> {
    if document.is_null() {
        return Err(CoreError::Validation(
            "File has no document to export".to_string(),
        ));
    }

    let data = unwrap_document(document);
    let columns = document_columns(&data);
    let nodes = document_nodes(&data);
    let scales = Scales::from_document(&data);

    let resolved = if columns.is_empty() {
        infer_columns_from_nodes(nodes)
    } else {
        resolve_columns(columns)
    };

    let header_format = Format::new()
        .set_bold()
        .set_background_color(HEADER_FILL)
        .set_text_wrap();
    let wrap_format = Format::new().set_text_wrap().set_align(FormatAlign::Top);

    let mut workbook = Workbook::new();

    // --- Checklist ---
    let sheet = workbook.add_worksheet();
    sheet.set_name("Checklist")?;

    let wrap_column: Vec<bool> = (0..resolved.len())
        .map(|i| wraps_text(&resolved.headers[i], &resolved.types[i]))
        .collect();

    for (col, header) in resolved.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    for (row_idx, node) in nodes.iter().enumerate() {
        let row = flatten_row(node, nodes, &resolved.keys, &scales);
        for (col, cell) in row.iter().enumerate() {
            let r = (row_idx + 1) as u32;
            if wrap_column[col] {
                sheet.write_string_with_format(r, col as u16, cell, &wrap_format)?;
            } else {
                sheet.write_string(r, col as u16, cell)?;
            }
        }
    }
    for col in 0..resolved.len() {
        let width = column_width(
            &resolved.keys[col],
            &resolved.headers[col],
            &resolved.types[col],
        );
        sheet.set_column_width(col as u16, width)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    if !resolved.is_empty() {
        sheet.autofilter(0, 0, nodes.len() as u32, (resolved.len() - 1) as u16)?;
    }

    // --- Meta ---
    let sheet = workbook.add_worksheet();
    sheet.set_name("Meta")?;
    write_header_row(sheet, &["Campo", "Valor"], &header_format)?;
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 80)?;

    let template = document.get("template").cloned().unwrap_or(Value::Null);
    let fixed_rows = [
        ("file_id", file.id.clone()),
        ("file_code", file.code.clone()),
        ("file_name", file.name.clone()),
        ("created_at", file.created_at.clone()),
        ("updated_at", file.updated_at.clone()),
        ("template_id", render_cell(&template["id"])),
        ("template_code", render_cell(&template["code"])),
        ("template_version", render_cell(&template["version"])),
    ];
    let mut row = 1u32;
    for (field, value) in &fixed_rows {
        sheet.write_string(row, 0, *field)?;
        sheet.write_string(row, 1, value)?;
        row += 1;
    }
    if let Some(meta) = data.get("meta").and_then(Value::as_object) {
        row += 1; // blank separator between file identity and document meta
        for (key, value) in meta {
            sheet.write_string(row, 0, key)?;
            sheet.write_string(row, 1, &render_cell(value))?;
            row += 1;
        }
    }

    // --- Preguntas ---
    let sheet = workbook.add_worksheet();
    sheet.set_name("Preguntas")?;
    write_header_row(sheet, &["Key", "Text"], &header_format)?;
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 90)?;
    if let Some(questions) = data.get("questions").and_then(Value::as_object) {
        for (row_idx, (key, text)) in questions.iter().enumerate() {
            let r = (row_idx + 1) as u32;
            sheet.write_string(r, 0, key)?;
            sheet.write_string_with_format(r, 1, &render_cell(text), &wrap_format)?;
        }
    }

    // --- Intro ---
    let sheet = workbook.add_worksheet();
    sheet.set_name("Intro")?;
    write_header_row(sheet, &["Index", "Text"], &header_format)?;
    sheet.set_column_width(0, 8)?;
    sheet.set_column_width(1, 100)?;
    if let Some(intro) = data.get("intro").and_then(Value::as_array) {
        for (idx, text) in intro.iter().enumerate() {
            let r = (idx + 1) as u32;
            sheet.write_number(r, 0, (idx + 1) as f64)?;
            sheet.write_string_with_format(r, 1, &render_cell(text), &wrap_format)?;
        }
    }

    // --- Columnas ---
    let sheet = workbook.add_worksheet();
    sheet.set_name("Columnas")?;
    write_header_row(sheet, &["key", "label", "type"], &header_format)?;
    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(1, 40)?;
    sheet.set_column_width(2, 14)?;
    for (row_idx, entry) in columns.iter().enumerate() {
        let r = (row_idx + 1) as u32;
        sheet.write_string(r, 0, column_key(entry).unwrap_or(""))?;
        sheet.write_string(r, 1, column_label(entry).unwrap_or(""))?;
        sheet.write_string(r, 2, entry.get("type").and_then(Value::as_str).unwrap_or(""))?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_header_row(
    sheet: &mut Worksheet,
    headers: &[&str],
    format: &Format,
) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, format)?;
    }
    Ok(())
}

/// Checklist column width, from the most specific signal available.
fn column_width(key: &str, header: &str, ty: &str) -> f64 {
    let header = header.to_lowercase();
    if ty == "longtext" || header.contains("descrip") {
        90.0
    } else if ty == "text" {
        40.0
    } else if key.eq_ignore_ascii_case("id") || key.chars().count() == 1 {
        6.0
    } else if header.contains("observ") {
        60.0
    } else if header.contains("agrup") {
        30.0
    } else {
        14.0
    }
}

/// Whether a Checklist column's data cells get wrap-text top alignment.
fn wraps_text(header: &str, ty: &str) -> bool {
    let header = header.to_lowercase();
    ty == "longtext"
        || header.contains("descrip")
        || header.contains("observ")
        || header.contains("justif")
}

/// Sanitize `"{code}-{name}"` into a safe download filename, `.xlsx` included.
///
/// Leading/trailing hyphens are stripped, any run of characters outside
/// `[A-Za-z0-9_.\- ]` becomes a single underscore, internal whitespace is
/// collapsed, and the result is capped at 120 characters. An empty result
/// falls back to `export`.
pub fn export_filename(code: &str, name: &str) -> String {
    let raw = format!("{code}-{name}");
    let stripped = raw.trim_matches('-');

    let unsafe_chars = Regex::new(r"[^A-Za-z0-9_.\- ]+").expect("filename pattern");
    let replaced = unsafe_chars.replace_all(stripped, "_");

    let whitespace = Regex::new(r"\s+").expect("whitespace pattern");
    let collapsed = whitespace.replace_all(&replaced, " ");

    let truncated: String = collapsed.chars().take(MAX_FILENAME_LENGTH).collect();
    let base = if truncated.is_empty() {
        "export".to_string()
    } else {
        truncated
    };
    format!("{base}.xlsx")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_meta() -> FileExportMeta {
        FileExportMeta {
            id: "7f000001-0000-0000-0000-000000000000".to_string(),
            code: "F-AB12CD".to_string(),
            name: "Inspección mensual".to_string(),
            created_at: "2024-03-01T10:00:00Z".to_string(),
            updated_at: "2024-03-02T11:30:00Z".to_string(),
        }
    }

    fn sample_document() -> Value {
        json!({
            "template": {"id": "t-1", "code": "TPL-BASE-001", "version": 2},
            "data": {
                "meta": {"area": "Planta 1"},
                "columns": [
                    {"key": "code", "label": "Código", "type": "text"},
                    {"key": "title", "label": "Ítem", "type": "longtext"},
                    {"key": "parent_code", "label": "Agrupación"},
                ],
                "nodes": [
                    {"id": "0", "code": "P-01", "title": "Bloque"},
                    {"id": "1", "code": "P-01.1", "parentId": "0",
                     "custom": {"title": "Revisar sellos"}},
                ],
                "intro": ["Instrucciones generales.", "Usar casco."],
                "questions": {"q1": "¿Se revisó el área?"}
            }
        })
    }

    #[test]
    fn emits_a_valid_xlsx_buffer() {
        let bytes = emit_workbook(&sample_meta(), &sample_document()).unwrap();
        // xlsx files are zip archives; check the magic instead of the size.
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn missing_document_fails_before_any_construction() {
        let err = emit_workbook(&sample_meta(), &Value::Null).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)), "got: {err:?}");
    }

    #[test]
    fn document_without_columns_uses_node_scan() {
        let document = json!({
            "template": {"id": "t", "code": "T", "version": 1},
            "data": {"nodes": [{"id": "1", "title": "x"}]}
        });
        let bytes = emit_workbook(&sample_meta(), &document).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_document_still_exports() {
        let document = json!({"template": {"id": "t", "code": "T", "version": 1}, "data": {}});
        let bytes = emit_workbook(&sample_meta(), &document).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn width_heuristics_follow_type_then_header_then_key() {
        assert_eq!(column_width("x", "Anything", "longtext"), 90.0);
        assert_eq!(column_width("x", "Descripción corta", ""), 90.0);
        assert_eq!(column_width("x", "Plain", "text"), 40.0);
        assert_eq!(column_width("id", "Identifier", ""), 6.0);
        assert_eq!(column_width("n", "Level", ""), 6.0);
        assert_eq!(column_width("obs", "Observaciones", ""), 60.0);
        assert_eq!(column_width("grp", "Agrupación", ""), 30.0);
        assert_eq!(column_width("other", "Other", ""), 14.0);
    }

    #[test]
    fn wrap_applies_to_long_and_annotated_columns() {
        assert!(wraps_text("x", "longtext"));
        assert!(wraps_text("Descripción", ""));
        assert!(wraps_text("Observaciones", ""));
        assert!(wraps_text("Justificación", ""));
        assert!(!wraps_text("Código", "text"));
    }

    #[test]
    fn filename_is_sanitized() {
        assert_eq!(
            export_filename("F-AB12CD", "Inspección mensual"),
            "F-AB12CD-Inspecci_n mensual.xlsx"
        );
    }

    #[test]
    fn filename_strips_hyphens_and_collapses_whitespace() {
        assert_eq!(export_filename("-F-1", "a   b-"), "F-1-a b.xlsx");
    }

    #[test]
    fn filename_empty_input_defaults_to_export() {
        assert_eq!(export_filename("", ""), "export.xlsx");
    }

    #[test]
    fn filename_is_truncated() {
        let long_name = "x".repeat(400);
        let filename = export_filename("F-1", &long_name);
        assert_eq!(filename.len(), MAX_FILENAME_LENGTH + ".xlsx".len());
    }
}
