//! Internal helpers for category-name normalization.
//!
//! Category uniqueness is enforced on the normalized key so "Café " and
//! "cafe" name the same category.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Trims and collapses inner whitespace; rejects empty names.
pub(crate) fn normalize_category_display(value: &str) -> ResultEngine<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EngineError::CategoryNotExist(value.to_string()));
    }
    Ok(collapsed)
}

/// Normalized uniqueness key: NFKD, combining marks stripped, lowercased.
pub(crate) fn normalize_category_key(display: &str) -> String {
    display
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}
