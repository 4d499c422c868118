//! Row flattening: resolve one document node into an ordered row of cells.
//!
//! Nodes arrived from many template generations and mix English and Spanish
//! attribute names, camelCase and snake_case, and flat versus nested custom
//! fields. Rather than rejecting unknown shapes, each requested column is
//! resolved through an ordered chain of strategies, from exact lookup down
//! to semantic name-family guesses, and degrades to an empty cell instead of
//! dropping data.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::document::CUSTOM_KEY;
use crate::keys::normalize_key;

/// Field-name variants tried for grouping columns (`agrupación` and friends).
const GROUPING_VARIANTS: [&str; 7] = [
    "agrupacion",
    "agrupamiento",
    "agrupa",
    "agrup",
    "grupo",
    "group",
    "grouping",
];

/// Code-to-label lookup tables parsed from a document's `scales` object.
#[derive(Debug, Default)]
pub struct Scales {
    vi: Vec<(String, String)>,
    vc: Vec<(String, String)>,
}

impl Scales {
    /// Parse the `scales.VI` / `scales.VC` tables from a flat document.
    /// Missing or malformed tables yield empty lookups.
    pub fn from_document(document: &Value) -> Self {
        let scales = document.get("scales");
        Self {
            vi: scale_entries(scales.and_then(|s| s.get("VI"))),
            vc: scale_entries(scales.and_then(|s| s.get("VC"))),
        }
    }
}

fn scale_entries(table: Option<&Value>) -> Vec<(String, String)> {
    table
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let key = entry.get("key")?.as_str()?;
                    let label = entry.get("label")?.as_str()?;
                    Some((key.to_string(), label.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// One node's attributes merged into a single flat mapping, indexed four
/// ways for tolerant lookup.
struct FlatNode {
    exact: Map<String, Value>,
    lower: HashMap<String, Value>,
    upper: HashMap<String, Value>,
    normalized: HashMap<String, Value>,
}

impl FlatNode {
    /// Merge top-level attributes (excluding the custom container) with the
    /// nested custom attributes; custom values win on key collision.
    fn build(node: &Value) -> Self {
        let mut exact = Map::new();
        if let Some(obj) = node.as_object() {
            for (key, value) in obj {
                if key != CUSTOM_KEY {
                    exact.insert(key.clone(), value.clone());
                }
            }
            if let Some(custom) = obj.get(CUSTOM_KEY).and_then(Value::as_object) {
                for (key, value) in custom {
                    exact.insert(key.clone(), value.clone());
                }
            }
        }

        let mut lower = HashMap::new();
        let mut upper = HashMap::new();
        let mut normalized = HashMap::new();
        for (key, value) in &exact {
            lower
                .entry(key.to_lowercase())
                .or_insert_with(|| value.clone());
            upper
                .entry(key.to_uppercase())
                .or_insert_with(|| value.clone());
            normalized
                .entry(normalize_key(key))
                .or_insert_with(|| value.clone());
        }

        Self {
            exact,
            lower,
            upper,
            normalized,
        }
    }

    /// Look one candidate string up through the exact, lower-cased,
    /// upper-cased, and normalized indices, in that order.
    fn get(&self, candidate: &str) -> Option<&Value> {
        self.exact
            .get(candidate)
            .or_else(|| self.lower.get(&candidate.to_lowercase()))
            .or_else(|| self.upper.get(&candidate.to_uppercase()))
            .or_else(|| self.normalized.get(&normalize_key(candidate)))
    }
}

/// Candidate strings for a requested column key, in resolution order.
fn candidate_keys(key: &str, normalized: &str) -> Vec<String> {
    let mut candidates = vec![
        key.to_string(),
        key.to_lowercase(),
        key.to_uppercase(),
        normalized.to_string(),
    ];

    if normalized.contains("agrup") || normalized.contains("agrupa") || normalized.contains("agr")
    {
        candidates.extend(GROUPING_VARIANTS.iter().map(|v| v.to_string()));
    }

    // Purely numeric keys occasionally appear in hand-edited documents.
    if !normalized.is_empty() && normalized.bytes().all(|b| b.is_ascii_digit()) {
        candidates.push(normalized.to_string());
    }

    candidates
}

/// Render a scalar reference value (string or number) as a lookup string.
fn reference_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Resolve a `parent*` column by following the node's `parentId` (or
/// `parent`) reference to a sibling node and taking that node's `code` (or
/// `codigo`).
fn resolve_parent_code(flat: &FlatNode, all_nodes: &[Value]) -> Option<Value> {
    let parent_ref = flat.get("parentId").or_else(|| flat.get("parent"))?;
    let parent_id = reference_string(parent_ref)?;

    let parent = all_nodes.iter().find(|node| {
        node.get("id")
            .and_then(reference_string)
            .is_some_and(|id| id == parent_id)
    })?;

    parent
        .get("code")
        .or_else(|| parent.get("codigo"))
        .cloned()
}

/// Map a normalized column key to the node attributes its name family
/// conventionally refers to, and return the first attribute present.
fn standard_name_value(flat: &FlatNode, normalized: &str) -> Option<Value> {
    let fallbacks: &[&str] = if normalized == "id" {
        &["id"]
    } else if matches!(normalized, "code" | "codigo" | "cod") {
        &["code", "codigo"]
    } else if normalized.contains("title")
        || normalized.contains("enunci")
        || normalized.contains("nombre")
    {
        &["title", "titulo", "name"]
    } else if normalized.contains("observ") {
        &["observaciones", "obs"]
    } else if normalized.contains("desc") {
        &["desc", "descripcion", "observaciones"]
    } else if normalized.starts_with("vi") && !normalized.contains("label") {
        &["viKey", "vi"]
    } else if normalized.starts_with("vc") && !normalized.contains("label") {
        &["vcKey", "vc"]
    } else {
        return None;
    };

    fallbacks.iter().find_map(|name| flat.get(name).cloned())
}

/// Translate a resolved scale code into its display label when the column is
/// a VI/VC label column. An unknown code is left unchanged.
fn apply_scale_label(normalized: &str, value: Value, scales: &Scales) -> Value {
    let Some(code) = value.as_str().filter(|s| !s.is_empty()) else {
        return value;
    };

    let table = if normalized == "vilabel"
        || (normalized.contains("vi") && normalized.contains("label"))
    {
        &scales.vi
    } else if normalized == "vclabel"
        || (normalized.contains("vc") && normalized.contains("label"))
    {
        &scales.vc
    } else {
        return value;
    };

    match table.iter().find(|(key, _)| key == code) {
        Some((_, label)) => Value::String(label.clone()),
        None => value,
    }
}

/// Render a resolved value for tabular display. Structured values are
/// serialized to compact JSON so nothing is silently dropped.
pub(crate) fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

/// Resolve one node into a row of cells aligned to `column_keys`.
///
/// Resolution per key, first hit wins:
///
/// 1. Candidate strings (raw, lower, upper, normalized, plus grouping-name
///    variants for grouping columns) through the four lookup indices.
/// 2. Parent fallback for `parent*` keys: follow the node's parent reference
///    and take the parent's code.
/// 3. Name-family fallback (id, code, title, observations, description,
///    VI/VC keys).
/// 4. Empty string.
///
/// VI/VC label columns additionally translate the resolved code through the
/// scale tables. The returned row always has exactly `column_keys.len()`
/// entries.
pub fn flatten_row(
    node: &Value,
    all_nodes: &[Value],
    column_keys: &[String],
    scales: &Scales,
) -> Vec<String> {
    let flat = FlatNode::build(node);
    let mut row: Vec<String> = Vec::with_capacity(column_keys.len());

    for key in column_keys {
        let normalized = normalize_key(key);

        let mut resolved = candidate_keys(key, &normalized)
            .iter()
            .find_map(|candidate| flat.get(candidate).cloned());

        if resolved.is_none() && normalized.contains("parent") {
            resolved = resolve_parent_code(&flat, all_nodes);
        }

        if resolved.is_none() {
            resolved = standard_name_value(&flat, &normalized);
        }

        let cell = match resolved {
            Some(value) => render_cell(&apply_scale_label(&normalized, value, scales)),
            None => String::new(),
        };
        row.push(cell);
    }

    row.truncate(column_keys.len());
    row.resize(column_keys.len(), String::new());
    row
}
