//! Orders artworks by the value found at a dotted category path.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;

use crate::models::Artwork;
use crate::paths::node_at_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort-key normalization: canonical decomposition, then an uppercase fold,
/// so case and composed diacritics do not split the ordering.
pub fn normalize_sort_key(value: &str) -> String {
    value.nfd().collect::<String>().to_uppercase()
}

/// Orders artworks by the value at `path`, walking each value tree by name.
/// Artworks without the category sort after those that have it; two
/// artworks both lacking it compare equal and keep their input order.
///
/// Descending order is the exact reverse of the ascending result, ties
/// included: the list is reversed wholesale, not re-sorted with an
/// inverted comparator.
pub fn sort_by_path(items: Vec<Artwork>, path: &str, direction: SortDirection) -> Vec<Artwork> {
    let mut keyed: Vec<(Option<String>, Artwork)> = items
        .into_iter()
        .map(|artwork| {
            let key = node_at_path(&artwork.values, path)
                .map(|node| normalize_sort_key(&node.value));
            (key, artwork)
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    let mut sorted: Vec<Artwork> = keyed.into_iter().map(|(_, artwork)| artwork).collect();
    if direction == SortDirection::Desc {
        sorted.reverse();
    }
    sorted
}
