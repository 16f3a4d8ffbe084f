//! Carries an artwork's values forward when its collection's schema
//! changes.
//!
//! Matching is positional, the same discipline as validation: the value at
//! index i moves into the new schema's slot i, whatever either is named.
//! New trailing slots start blank, and a slot with no old counterpart
//! recurses into an all-empty subtree, so the result always mirrors the new
//! schema exactly.

use chrono::Utc;

use crate::models::{Artwork, SchemaNode, ValueNode};

/// Repairs one value tree against an edited schema.
pub fn reconcile(old_values: &[ValueNode], new_schema: &[SchemaNode]) -> Vec<ValueNode> {
    new_schema
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let old = old_values.get(index);
            ValueNode {
                name: slot.name.clone(),
                value: old.map(|node| node.value.clone()).unwrap_or_default(),
                children: reconcile(
                    old.map(|node| node.children.as_slice()).unwrap_or(&[]),
                    &slot.children,
                ),
            }
        })
        .collect()
}

/// Applies `reconcile` to every artwork of a collection, immediately after
/// a schema edit has been accepted, so no item is left structurally
/// invalid.
pub fn reconcile_artworks(artworks: Vec<Artwork>, new_schema: &[SchemaNode]) -> Vec<Artwork> {
    artworks
        .into_iter()
        .map(|mut artwork| {
            artwork.values = reconcile(&artwork.values, new_schema);
            artwork.updated_at = Utc::now();
            tracing::debug!(artwork = %artwork.id, "reconciled categories to edited schema");
            artwork
        })
        .collect()
}
