//! Compiles search requests into document-filter expressions over the
//! category tree.
//!
//! The expression language is deliberately small: equality on a field,
//! `ElemMatch` (some element of an array field satisfies a condition) and
//! `All` (each listed condition is satisfied by some element, possibly a
//! different one per condition), with `And`/`Or` as glue. Any backend can
//! interpret it: `matches_artwork` is the in-memory interpreter used by the
//! file store and the tests, and `to_document` renders a document-store
//! query.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::models::{Artwork, SchemaNode, ValueNode};
use crate::paths::max_depth;

/// Field names as persisted in artwork documents.
const COLLECTION_NAME: &str = "collectionName";
const CATEGORIES: &str = "categories";
const SUBCATEGORIES: &str = "subcategories";
const NAME: &str = "name";
const VALUE: &str = "value";

/// Request keys that ride along with advanced-search parameters but name no
/// category.
const RESERVED_PARAMS: [&str; 5] = ["page", "size", "sort", "direction", "mode"];

/// Advanced-search input: dotted category path to an optional exact value.
/// A path with no value (or an empty one) only asserts the category.
pub type SearchParams = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    /// Field equals the value exactly.
    Eq(String, String),
    /// Field equals the value exactly, ignoring case.
    EqIgnoreCase(String, String),
    /// Array field with at least one element satisfying the condition.
    ElemMatch(String, Box<FilterExpr>),
    /// Array field where each condition is satisfied by some element.
    All(String, Vec<FilterExpr>),
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    pub fn eq(field: &str, value: impl Into<String>) -> Self {
        FilterExpr::Eq(field.to_string(), value.into())
    }

    pub fn eq_ignore_case(field: &str, value: impl Into<String>) -> Self {
        FilterExpr::EqIgnoreCase(field.to_string(), value.into())
    }

    pub fn elem_match(field: &str, condition: FilterExpr) -> Self {
        FilterExpr::ElemMatch(field.to_string(), Box::new(condition))
    }

    pub fn all(field: &str, conditions: Vec<FilterExpr>) -> Self {
        FilterExpr::All(field.to_string(), conditions)
    }

    /// Renders the expression as a document-store query. `All` entries
    /// become per-element conditions, case-insensitive equality an anchored
    /// regex.
    pub fn to_document(&self) -> Value {
        match self {
            FilterExpr::Eq(field, value) => object(field, Value::String(value.clone())),
            FilterExpr::EqIgnoreCase(field, value) => {
                let mut regex = Map::new();
                regex.insert(
                    "$regex".to_string(),
                    Value::String(format!("^{}$", regex::escape(value))),
                );
                regex.insert("$options".to_string(), Value::String("i".to_string()));
                object(field, Value::Object(regex))
            }
            FilterExpr::ElemMatch(field, condition) => object(
                field,
                object("$elemMatch", condition.to_document()),
            ),
            FilterExpr::All(field, conditions) => object(
                field,
                object(
                    "$all",
                    Value::Array(
                        conditions
                            .iter()
                            .map(|condition| object("$elemMatch", condition.to_document()))
                            .collect(),
                    ),
                ),
            ),
            FilterExpr::And(clauses) => object(
                "$and",
                Value::Array(clauses.iter().map(FilterExpr::to_document).collect()),
            ),
            FilterExpr::Or(clauses) => object(
                "$or",
                Value::Array(clauses.iter().map(FilterExpr::to_document).collect()),
            ),
        }
    }
}

fn object(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// Quick text search: matches any artwork of the collection carrying `text`
/// as an exact category value at any depth the schema reaches.
pub fn compile_quick_filter(
    text: &str,
    schema: &[SchemaNode],
    collection_name: &str,
) -> FilterExpr {
    let deepest = max_depth(schema).max(1);
    FilterExpr::And(vec![
        FilterExpr::eq(COLLECTION_NAME, collection_name),
        FilterExpr::elem_match(CATEGORIES, value_at_depth(text, 1, deepest)),
    ])
}

/// Condition on one category node at `depth`: its own value matches, or,
/// while the schema still reaches deeper, some subcategory's does.
fn value_at_depth(text: &str, depth: usize, deepest: usize) -> FilterExpr {
    let own = FilterExpr::eq(VALUE, text);
    if depth < deepest {
        FilterExpr::Or(vec![
            own,
            FilterExpr::elem_match(SUBCATEGORIES, value_at_depth(text, depth + 1, deepest)),
        ])
    } else {
        own
    }
}

/// Advanced per-category search. Only top-level paths in `params` seed
/// conditions; deeper entries attach to their top-level ancestor. Reserved
/// request keys are discarded.
pub fn compile_advanced_filter(params: &SearchParams, collection_name: &str) -> FilterExpr {
    let mut conditions = Vec::new();
    for (path, value) in params {
        if path.contains('.') || RESERVED_PARAMS.contains(&path.as_str()) {
            continue;
        }
        conditions.push(category_condition(path, path, value.as_deref(), params));
    }
    let mut clauses = vec![FilterExpr::eq(COLLECTION_NAME, collection_name)];
    if !conditions.is_empty() {
        clauses.push(FilterExpr::all(CATEGORIES, conditions));
    }
    FilterExpr::And(clauses)
}

/// Condition on one category node: its name, optionally its exact value,
/// and recursively the conditions for params one level deeper.
fn category_condition(
    full_path: &str,
    name: &str,
    value: Option<&str>,
    params: &SearchParams,
) -> FilterExpr {
    let mut parts = vec![FilterExpr::eq(NAME, name)];
    if let Some(value) = value {
        if !value.is_empty() {
            parts.push(FilterExpr::eq(VALUE, value));
        }
    }
    let deeper = deeper_conditions(full_path, params);
    if !deeper.is_empty() {
        parts.push(FilterExpr::all(SUBCATEGORIES, deeper));
    }
    if parts.len() == 1 {
        parts.remove(0)
    } else {
        FilterExpr::And(parts)
    }
}

fn deeper_conditions(prefix: &str, params: &SearchParams) -> Vec<FilterExpr> {
    let lead = format!("{}.", prefix);
    params
        .iter()
        .filter(|(path, _)| path.starts_with(&lead) && !path[lead.len()..].contains('.'))
        .map(|(path, value)| {
            category_condition(path, &path[lead.len()..], value.as_deref(), params)
        })
        .collect()
}

/// Exact, case-insensitive match on a top-level category value. Never
/// descends into subcategories; used for fast top-of-tree lookups.
pub fn compile_topmost_filter(text: &str) -> FilterExpr {
    FilterExpr::elem_match(CATEGORIES, FilterExpr::eq_ignore_case(VALUE, text))
}

/// Reference interpreter over an artwork document. Unknown fields never
/// match, mirroring a document store's behavior on absent fields.
pub fn matches_artwork(filter: &FilterExpr, artwork: &Artwork) -> bool {
    match filter {
        FilterExpr::Eq(field, value) => {
            field == COLLECTION_NAME && artwork.collection_name == *value
        }
        FilterExpr::EqIgnoreCase(field, value) => {
            field == COLLECTION_NAME && eq_ignore_case(&artwork.collection_name, value)
        }
        FilterExpr::ElemMatch(field, condition) => {
            field == CATEGORIES
                && artwork
                    .values
                    .iter()
                    .any(|node| matches_node(condition, node))
        }
        FilterExpr::All(field, conditions) => {
            field == CATEGORIES
                && conditions
                    .iter()
                    .all(|condition| artwork.values.iter().any(|node| matches_node(condition, node)))
        }
        FilterExpr::And(clauses) => clauses.iter().all(|clause| matches_artwork(clause, artwork)),
        FilterExpr::Or(clauses) => clauses.iter().any(|clause| matches_artwork(clause, artwork)),
    }
}

fn matches_node(filter: &FilterExpr, node: &ValueNode) -> bool {
    match filter {
        FilterExpr::Eq(field, value) => match field.as_str() {
            NAME => node.name == *value,
            VALUE => node.value == *value,
            _ => false,
        },
        FilterExpr::EqIgnoreCase(field, value) => match field.as_str() {
            NAME => eq_ignore_case(&node.name, value),
            VALUE => eq_ignore_case(&node.value, value),
            _ => false,
        },
        FilterExpr::ElemMatch(field, condition) => {
            field == SUBCATEGORIES
                && node
                    .children
                    .iter()
                    .any(|child| matches_node(condition, child))
        }
        FilterExpr::All(field, conditions) => {
            field == SUBCATEGORIES
                && conditions
                    .iter()
                    .all(|condition| node.children.iter().any(|child| matches_node(condition, child)))
        }
        FilterExpr::And(clauses) => clauses.iter().all(|clause| matches_node(clause, node)),
        FilterExpr::Or(clauses) => clauses.iter().any(|clause| matches_node(clause, node)),
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_uppercase() == b.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Vec<SchemaNode> {
        vec![
            SchemaNode::leaf("Tytuł"),
            SchemaNode::branch(
                "Rok",
                vec![SchemaNode::branch(
                    "Miesiąc",
                    vec![SchemaNode::leaf("Dzień")],
                )],
            ),
        ]
    }

    fn sample_artwork() -> Artwork {
        Artwork::new(
            "Plakaty",
            vec![
                ValueNode::leaf("Tytuł", "Cyrk"),
                ValueNode::branch(
                    "Rok",
                    "1999",
                    vec![ValueNode::branch(
                        "Miesiąc",
                        "Maj",
                        vec![ValueNode::leaf("Dzień", "7")],
                    )],
                ),
            ],
        )
    }

    #[test]
    fn test_quick_filter_matches_value_at_any_depth() {
        let schema = sample_schema();
        let artwork = sample_artwork();
        for text in ["Cyrk", "1999", "Maj", "7"] {
            let filter = compile_quick_filter(text, &schema, "Plakaty");
            assert!(matches_artwork(&filter, &artwork), "no match for {}", text);
        }
    }

    #[test]
    fn test_quick_filter_needs_exact_value() {
        let filter = compile_quick_filter("Cyr", &sample_schema(), "Plakaty");
        assert!(!matches_artwork(&filter, &sample_artwork()));
    }

    #[test]
    fn test_quick_filter_is_scoped_to_the_collection() {
        let filter = compile_quick_filter("Cyrk", &sample_schema(), "Obrazy");
        assert!(!matches_artwork(&filter, &sample_artwork()));
    }

    #[test]
    fn test_quick_filter_does_not_reach_below_schema_depth() {
        // Schema only one level deep, value hidden at level two.
        let schema = vec![SchemaNode::leaf("Tytuł")];
        let artwork = Artwork::new(
            "Plakaty",
            vec![ValueNode::branch(
                "Tytuł",
                "X",
                vec![ValueNode::leaf("Podtytuł", "Cyrk")],
            )],
        );
        let filter = compile_quick_filter("Cyrk", &schema, "Plakaty");
        assert!(!matches_artwork(&filter, &artwork));
    }

    #[test]
    fn test_advanced_filter_on_nested_path() {
        let mut params = SearchParams::new();
        params.insert("Rok".to_string(), None);
        params.insert("Rok.Miesiąc".to_string(), Some("Maj".to_string()));
        params.insert("page".to_string(), Some("2".to_string()));

        let filter = compile_advanced_filter(&params, "Plakaty");
        assert!(matches_artwork(&filter, &sample_artwork()));

        params.insert("Rok.Miesiąc".to_string(), Some("Czerwiec".to_string()));
        let filter = compile_advanced_filter(&params, "Plakaty");
        assert!(!matches_artwork(&filter, &sample_artwork()));
    }

    #[test]
    fn test_advanced_filter_name_only_asserts_presence() {
        let mut params = SearchParams::new();
        params.insert("Wystawa".to_string(), None);
        let filter = compile_advanced_filter(&params, "Plakaty");
        assert!(!matches_artwork(&filter, &sample_artwork()));

        let mut params = SearchParams::new();
        params.insert("Tytuł".to_string(), None);
        let filter = compile_advanced_filter(&params, "Plakaty");
        assert!(matches_artwork(&filter, &sample_artwork()));
    }

    #[test]
    fn test_advanced_filter_conditions_may_hit_different_elements() {
        let mut params = SearchParams::new();
        params.insert("Tytuł".to_string(), Some("Cyrk".to_string()));
        params.insert("Rok".to_string(), Some("1999".to_string()));
        let filter = compile_advanced_filter(&params, "Plakaty");
        assert!(matches_artwork(&filter, &sample_artwork()));
    }

    #[test]
    fn test_topmost_filter_is_case_insensitive_and_shallow() {
        let artwork = sample_artwork();
        assert!(matches_artwork(&compile_topmost_filter("cyrk"), &artwork));
        assert!(matches_artwork(&compile_topmost_filter("CYRK"), &artwork));
        // Exact, not substring.
        assert!(!matches_artwork(&compile_topmost_filter("cyr"), &artwork));
        // Top level only: "Maj" sits at depth two.
        assert!(!matches_artwork(&compile_topmost_filter("maj"), &artwork));
    }

    #[test]
    fn test_document_rendering() {
        let filter = compile_topmost_filter("Cyrk");
        let document = filter.to_document();
        assert_eq!(
            document["categories"]["$elemMatch"]["value"]["$regex"],
            "^Cyrk$"
        );
        assert_eq!(
            document["categories"]["$elemMatch"]["value"]["$options"],
            "i"
        );

        let quick = compile_quick_filter("X", &[SchemaNode::leaf("Tytuł")], "Plakaty");
        let document = quick.to_document();
        assert_eq!(document["$and"][0]["collectionName"], "Plakaty");
        assert_eq!(document["$and"][1]["categories"]["$elemMatch"]["value"], "X");
    }
}
