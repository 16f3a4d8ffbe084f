//! Moves category trees in and out of flat spreadsheet rows.
//!
//! A header cell names a category by dotted path; a data cell may carry
//! several values joined by semicolons. Import builds each row's value
//! forest from the top-level columns down; export walks a value tree by
//! name for each requested path. Neither side touches files; callers own
//! the workbook.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::errors::CatalogError;
use crate::models::{Artwork, SchemaNode, ValueNode};
use crate::paths::{flatten_paths, node_at_path};

/// Trims a header cell and collapses whitespace around dots, so
/// `" Rok . Miesiąc "` and `"Rok.Miesiąc"` name the same category.
pub fn normalize_header_cell(cell: &str) -> String {
    let around_dots = Regex::new(r"\s*\.\s*").unwrap();
    around_dots.replace_all(cell.trim(), ".").into_owned()
}

/// Checks a header and its data rows before import. When an existing
/// collection's schema is given, the header must offer exactly that
/// schema's path set. On success returns the normalized header paths.
pub fn validate_header(
    header: &[String],
    rows: &[Vec<String>],
    existing_schema: Option<&[SchemaNode]>,
) -> Result<Vec<String>, CatalogError> {
    let normalized: Vec<String> = header
        .iter()
        .map(|cell| normalize_header_cell(cell))
        .collect();

    let mut seen = HashSet::new();
    for path in &normalized {
        if !seen.insert(path.as_str()) {
            return Err(CatalogError::DuplicateHeaderColumn(path.clone()));
        }
    }

    for (index, path) in normalized.iter().enumerate() {
        if path.is_empty() {
            return Err(CatalogError::EmptyHeaderField(index + 1));
        }
        // Catches both a trailing dot ("Tytuł.") and a blank inner segment
        // ("Tytuł. .Podtytuł" normalizes to "Tytuł..Podtytuł").
        if path.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(CatalogError::DanglingSubcategoryName(path.clone()));
        }
    }

    for path in &normalized {
        if let Some((parent, _)) = path.rsplit_once('.') {
            if !normalized.iter().any(|other| other == parent) {
                return Err(CatalogError::MissingParentCategory {
                    child: path.clone(),
                    parent: parent.to_string(),
                });
            }
        }
    }

    for (index, row) in rows.iter().enumerate() {
        if row.len() > header.len() {
            return Err(CatalogError::RowColumnCountMismatch {
                row: index + 1,
                cells: row.len(),
                columns: header.len(),
            });
        }
    }

    if let Some(schema) = existing_schema {
        let known: HashSet<String> = flatten_paths(schema).into_iter().collect();
        let offered: HashSet<String> = normalized.iter().cloned().collect();
        if known != offered {
            let mut missing: Vec<String> = known.difference(&offered).cloned().collect();
            let mut extra: Vec<String> = offered.difference(&known).cloned().collect();
            missing.sort();
            extra.sort();
            return Err(CatalogError::CategorySetMismatch { missing, extra });
        }
    }

    Ok(normalized)
}

/// Builds one artwork per data row. A column produces a category node only
/// when its cell carries a value or the header defines sub-columns for it.
pub fn parse_rows(header: &[String], rows: &[Vec<String>], collection_name: &str) -> Vec<Artwork> {
    let normalized: Vec<String> = header
        .iter()
        .map(|cell| normalize_header_cell(cell))
        .collect();
    rows.iter()
        .map(|row| Artwork::new(collection_name, row_forest(&normalized, row, "")))
        .collect()
}

/// Category nodes for the columns directly under `prefix`, in header order.
fn row_forest(header: &[String], row: &[String], prefix: &str) -> Vec<ValueNode> {
    let mut nodes = Vec::new();
    for (index, path) in header.iter().enumerate() {
        let name = match direct_child_name(path, prefix) {
            Some(name) => name,
            None => continue,
        };
        let cell = row.get(index).map(String::as_str).unwrap_or("");
        let parts: Vec<&str> = cell
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        let has_sub_columns = header
            .iter()
            .any(|other| direct_child_name(other, path).is_some());
        if parts.is_empty() && !has_sub_columns {
            continue;
        }
        nodes.push(ValueNode {
            name: name.to_string(),
            value: parts.join(";"),
            children: row_forest(header, row, path),
        });
    }
    nodes
}

/// `Some(child name)` when `path` sits exactly one level below `prefix`.
fn direct_child_name<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        if path.contains('.') {
            None
        } else {
            Some(path)
        }
    } else {
        let rest = path.strip_prefix(prefix)?.strip_prefix('.')?;
        if rest.is_empty() || rest.contains('.') {
            None
        } else {
            Some(rest)
        }
    }
}

/// One flat export row: each requested path mapped to the value found by a
/// by-name walk, or to an empty string when the tree lacks the path.
pub fn fill_row(paths: &[String], tree: &[ValueNode]) -> HashMap<String, String> {
    paths
        .iter()
        .map(|path| {
            let value = node_at_path(tree, path)
                .map(|node| node.values().join(";"))
                .unwrap_or_default();
            (path.clone(), value)
        })
        .collect()
}
