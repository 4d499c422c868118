//! Field-name normalization for tolerant key matching.
//!
//! Stored documents accumulated several naming conventions over the years
//! (English/Spanish, camelCase/snake_case, accented headings typed by hand).
//! Every fuzzy key comparison in the crate goes through [`normalize_key`] so
//! that `"Descripción"`, `"descripcion"` and `" DESCRIPCION "` all collapse
//! to the same lookup key.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize an arbitrary field name for fuzzy matching.
///
/// Applies Unicode NFD decomposition and drops combining marks (stripping
/// diacritics), lower-cases, and keeps only `[a-z0-9_]`. Whitespace and any
/// other punctuation are removed. Total: never fails, and an empty or
/// all-symbol input yields an empty string.
pub fn normalize_key(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '_'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics() {
        assert_eq!(normalize_key("Descripción"), "descripcion");
        assert_eq!(normalize_key("código"), "codigo");
        assert_eq!(normalize_key("Número"), "numero");
    }

    #[test]
    fn folds_case() {
        assert_eq!(normalize_key("ParentId"), "parentid");
        assert_eq!(normalize_key("VI_KEY"), "vi_key");
    }

    #[test]
    fn removes_whitespace_and_symbols() {
        assert_eq!(normalize_key("  vi label "), "vilabel");
        assert_eq!(normalize_key("peso (%)"), "peso");
        assert_eq!(normalize_key("a-b.c"), "abc");
    }

    #[test]
    fn keeps_underscores_and_digits() {
        assert_eq!(normalize_key("col_1"), "col_1");
    }

    #[test]
    fn empty_and_symbol_only_inputs() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("¡¿!?"), "");
    }

    #[test]
    fn is_idempotent() {
        for s in ["Descripción", "  VI Label ", "col_1", "ÁÉÍÓÚ ñ"] {
            let once = normalize_key(s);
            assert_eq!(normalize_key(&once), once);
        }
    }
}
