//! Structural validation binding an artwork's values to its collection's
//! schema.
//!
//! Matching here is positional: the i-th value node and the i-th schema
//! node are the same category at every depth. Name equality is checked on
//! top of the alignment, so reordering either tree alone breaks validation.

use crate::errors::CatalogError;
use crate::models::{SchemaNode, ValueNode};
use crate::paths::flatten_value_paths;

/// Checks a schema tree on its own, before any artwork is involved: the
/// root must define at least one category and no name may be blank.
pub fn well_formed_schema(schema: &[SchemaNode]) -> Result<(), CatalogError> {
    if schema.is_empty() {
        return Err(CatalogError::EmptyCategoryList);
    }
    for node in schema {
        well_formed_node(node)?;
    }
    Ok(())
}

fn well_formed_node(node: &SchemaNode) -> Result<(), CatalogError> {
    if node.name.trim().is_empty() {
        return Err(CatalogError::MalformedSchema(
            "category name cannot be blank".to_string(),
        ));
    }
    for child in &node.children {
        well_formed_node(child)?;
    }
    Ok(())
}

/// True when the value tree mirrors the schema exactly: equal length at
/// every depth, names aligned index by index, every value non-blank.
pub fn matches_schema(values: &[ValueNode], schema: &[SchemaNode]) -> bool {
    if values.is_empty() || schema.is_empty() {
        return false;
    }
    first_mismatch(values, schema, "").is_none()
}

fn first_mismatch(values: &[ValueNode], schema: &[SchemaNode], parent: &str) -> Option<String> {
    let scope = if parent.is_empty() { "top level" } else { parent };
    if values.len() != schema.len() {
        return Some(format!(
            "{} categories at {}, schema defines {}",
            values.len(),
            scope,
            schema.len()
        ));
    }
    for (index, (value, slot)) in values.iter().zip(schema).enumerate() {
        if value.name != slot.name {
            return Some(format!(
                "category '{}' at {} position {} should be '{}'",
                value.name,
                scope,
                index + 1,
                slot.name
            ));
        }
        let path = if parent.is_empty() {
            value.name.clone()
        } else {
            format!("{}.{}", parent, value.name)
        };
        if value.value.trim().is_empty() {
            return Some(format!("category '{}' has no value", path));
        }
        if let Some(mismatch) = first_mismatch(&value.children, &slot.children, &path) {
            return Some(mismatch);
        }
    }
    None
}

/// True when old values still fit inside an edited schema: at every depth
/// the new schema is at least as long as the old values. Names are not
/// compared; this is purely a length/position check, so trailing categories
/// may be appended but never removed.
pub fn fits_within_schema(old_values: &[ValueNode], new_schema: &[SchemaNode]) -> bool {
    old_values.len() <= new_schema.len()
        && old_values
            .iter()
            .zip(new_schema)
            .all(|(old, slot)| fits_within_schema(&old.children, &slot.children))
}

/// Gate for creating an artwork or replacing its values wholesale.
pub fn validate_create(schema: &[SchemaNode], values: &[ValueNode]) -> Result<(), CatalogError> {
    if values.is_empty() || schema.is_empty() {
        return Err(CatalogError::EmptyCategoryList);
    }
    match first_mismatch(values, schema, "") {
        None => Ok(()),
        Some(mismatch) => Err(CatalogError::StructuralMismatch(mismatch)),
    }
}

/// Gate for accepting a schema edit: every existing artwork's values must
/// still fit positionally inside the new shape. On failure the offending
/// artworks' category paths are enumerated as out of range.
pub fn check_schema_edit(
    existing: &[&[ValueNode]],
    new_schema: &[SchemaNode],
) -> Result<(), CatalogError> {
    let mut out_of_range: Vec<String> = Vec::new();
    for values in existing {
        if !fits_within_schema(values, new_schema) {
            for path in flatten_value_paths(values) {
                if !out_of_range.contains(&path) {
                    out_of_range.push(path);
                }
            }
        }
    }
    if out_of_range.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::SchemaEditIncompatible {
            paths: out_of_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_rejects_empty_root() {
        assert_eq!(
            well_formed_schema(&[]),
            Err(CatalogError::EmptyCategoryList)
        );
    }

    #[test]
    fn test_well_formed_rejects_blank_name_anywhere() {
        let schema = vec![SchemaNode::branch(
            "Rok",
            vec![SchemaNode::leaf("  ")],
        )];
        assert!(matches!(
            well_formed_schema(&schema),
            Err(CatalogError::MalformedSchema(_))
        ));
    }

    #[test]
    fn test_single_category_with_value_validates() {
        let schema = vec![SchemaNode::leaf("Tytuł")];
        let values = vec![ValueNode::leaf("Tytuł", "X")];
        assert!(validate_create(&schema, &values).is_ok());
    }

    #[test]
    fn test_swapped_order_fails_even_with_matching_names() {
        let schema = vec![SchemaNode::leaf("Tytuł"), SchemaNode::leaf("Rok")];
        let values = vec![
            ValueNode::leaf("Rok", "1999"),
            ValueNode::leaf("Tytuł", "X"),
        ];
        assert!(!matches_schema(&values, &schema));
        assert!(matches!(
            validate_create(&schema, &values),
            Err(CatalogError::StructuralMismatch(_))
        ));
    }

    #[test]
    fn test_blank_value_fails() {
        let schema = vec![SchemaNode::leaf("Tytuł")];
        let values = vec![ValueNode::leaf("Tytuł", "   ")];
        assert!(!matches_schema(&values, &schema));
    }

    #[test]
    fn test_length_must_match_at_every_depth() {
        let schema = vec![SchemaNode::branch(
            "Rok",
            vec![SchemaNode::leaf("Miesiąc")],
        )];
        let values = vec![ValueNode::leaf("Rok", "1999")];
        assert!(!matches_schema(&values, &schema));
    }

    #[test]
    fn test_empty_candidate_fails() {
        let schema = vec![SchemaNode::leaf("Tytuł")];
        assert!(!matches_schema(&[], &schema));
        assert_eq!(
            validate_create(&schema, &[]),
            Err(CatalogError::EmptyCategoryList)
        );
    }

    #[test]
    fn test_fits_allows_longer_schema_and_ignores_names() {
        let old = vec![ValueNode::leaf("Rok", "1999")];
        let new_schema = vec![SchemaNode::leaf("Wykonawca"), SchemaNode::leaf("Tytuł")];
        assert!(fits_within_schema(&old, &new_schema));
    }

    #[test]
    fn test_fits_rejects_shorter_schema() {
        let old = vec![
            ValueNode::leaf("Tytuł", "X"),
            ValueNode::leaf("Rok", "1999"),
        ];
        let new_schema = vec![SchemaNode::leaf("Tytuł")];
        assert!(!fits_within_schema(&old, &new_schema));
    }

    #[test]
    fn test_fits_recurses_into_children() {
        let old = vec![ValueNode::branch(
            "Rok",
            "1999",
            vec![
                ValueNode::leaf("Miesiąc", "Maj"),
                ValueNode::leaf("Dzień", "7"),
            ],
        )];
        let new_schema = vec![SchemaNode::branch(
            "Rok",
            vec![SchemaNode::leaf("Miesiąc")],
        )];
        assert!(!fits_within_schema(&old, &new_schema));
    }

    #[test]
    fn test_schema_edit_gate_enumerates_offending_paths() {
        let values = vec![
            ValueNode::leaf("Tytuł", "X"),
            ValueNode::branch("Rok", "1999", vec![ValueNode::leaf("Miesiąc", "Maj")]),
        ];
        let new_schema = vec![SchemaNode::leaf("Tytuł")];
        let trees: Vec<&[ValueNode]> = vec![&values];
        match check_schema_edit(&trees, &new_schema) {
            Err(CatalogError::SchemaEditIncompatible { paths }) => {
                assert_eq!(paths, vec!["Tytuł", "Rok", "Rok.Miesiąc"]);
            }
            other => panic!("expected incompatible edit, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_edit_gate_accepts_appended_categories() {
        let values = vec![ValueNode::leaf("Tytuł", "X")];
        let new_schema = vec![SchemaNode::leaf("Tytuł"), SchemaNode::leaf("Rok")];
        let trees: Vec<&[ValueNode]> = vec![&values];
        assert!(check_schema_edit(&trees, &new_schema).is_ok());
    }
}
