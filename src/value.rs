//! Cell values and the text coercion rule applied before storage.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single frame cell.
///
/// Cells are either one text value or a list of text values. Everything is
/// stored as text in the database; a list is folded into one string by the
/// coercion rule (see [`Cell::coerce`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// One text value.
    Text(String),
    /// A multi-valued cell, folded on write.
    List(Vec<String>),
}

impl Cell {
    /// Renders the cell into its single stored text form.
    ///
    /// A `Text` cell stores its string as-is. A `List` cell is
    /// de-duplicated (first occurrence wins) and the survivors joined with
    /// `,`. Callers must not rely on the survivor order, only on the set
    /// of values. The transform is lossy: `["a","a"]` stores `"a"`, and
    /// the original list cannot be reconstructed from the stored text.
    pub fn coerce(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::List(items) => {
                let mut seen = HashSet::new();
                let mut unique = Vec::with_capacity(items.len());
                for item in items {
                    if seen.insert(item.as_str()) {
                        unique.push(item.as_str());
                    }
                }
                unique.join(",")
            }
        }
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<String>> for Cell {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<Vec<&str>> for Cell {
    fn from(v: Vec<&str>) -> Self {
        Self::List(v.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_coerces_verbatim() {
        assert_eq!(Cell::from("hello").coerce(), "hello");
        assert_eq!(Cell::from(42_i64).coerce(), "42");
    }

    #[test]
    fn list_folds_duplicates() {
        assert_eq!(Cell::from(vec!["a", "a"]).coerce(), "a");
        assert_eq!(Cell::from(vec!["x", "x", "y"]).coerce(), "x,y");
    }

    #[test]
    fn equal_sets_coerce_identically() {
        let a = Cell::from(vec!["x", "x", "y"]).coerce();
        let b = Cell::from(vec!["x", "y"]).coerce();
        let mut sa: Vec<&str> = a.split(',').collect();
        let mut sb: Vec<&str> = b.split(',').collect();
        sa.sort_unstable();
        sb.sort_unstable();
        assert_eq!(sa, sb);
    }

    #[test]
    fn empty_list_coerces_to_empty_text() {
        assert_eq!(Cell::List(Vec::new()).coerce(), "");
    }
}
