//! Dotted category paths over schema and value trees.

use crate::models::{find_child, SchemaNode, ValueNode};

/// Every category a schema defines, as dotted paths in the schema's own
/// pre-order: each root name first, then `parent.child` for every
/// descendant.
pub fn flatten_paths(schema: &[SchemaNode]) -> Vec<String> {
    let mut paths = Vec::new();
    for node in schema {
        push_paths(node, "", &mut paths);
    }
    paths
}

fn push_paths(node: &SchemaNode, prefix: &str, paths: &mut Vec<String>) {
    let path = if prefix.is_empty() {
        node.name.clone()
    } else {
        format!("{}.{}", prefix, node.name)
    };
    paths.push(path.clone());
    for child in &node.children {
        push_paths(child, &path, paths);
    }
}

/// The category paths a value tree actually carries, same pre-order as
/// `flatten_paths`.
pub fn flatten_value_paths(values: &[ValueNode]) -> Vec<String> {
    let mut paths = Vec::new();
    for node in values {
        push_value_paths(node, "", &mut paths);
    }
    paths
}

fn push_value_paths(node: &ValueNode, prefix: &str, paths: &mut Vec<String>) {
    let path = if prefix.is_empty() {
        node.name.clone()
    } else {
        format!("{}.{}", prefix, node.name)
    };
    paths.push(path.clone());
    for child in &node.children {
        push_value_paths(child, &path, paths);
    }
}

/// Deepest category level the schema defines, measured over its dotted
/// paths. Quick search nests one element condition per level.
pub fn max_depth(schema: &[SchemaNode]) -> usize {
    flatten_paths(schema)
        .iter()
        .map(|path| path.split('.').count())
        .max()
        .unwrap_or(0)
}

/// Walks a value tree by name, one dotted segment at a time. Returns the
/// node the last segment lands on, or `None` as soon as a segment has no
/// matching child.
pub fn node_at_path<'a>(nodes: &'a [ValueNode], path: &str) -> Option<&'a ValueNode> {
    let mut level = nodes;
    let mut found = None;
    for segment in path.split('.') {
        let node = find_child(level, segment)?;
        level = &node.children;
        found = Some(node);
    }
    found
}

/// Inverse of `flatten_paths`: builds a schema tree from dotted paths,
/// preserving the order in which names first appear. Used when a spreadsheet
/// header seeds a brand-new collection.
pub fn schema_from_paths(paths: &[String]) -> Vec<SchemaNode> {
    let mut roots = Vec::new();
    for path in paths {
        insert_path(&mut roots, &path.split('.').collect::<Vec<_>>());
    }
    roots
}

fn insert_path(nodes: &mut Vec<SchemaNode>, segments: &[&str]) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let index = match nodes.iter().position(|node| node.name == *first) {
        Some(index) => index,
        None => {
            nodes.push(SchemaNode::leaf(*first));
            nodes.len() - 1
        }
    };
    insert_path(&mut nodes[index].children, rest);
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

    #[test]
    fn test_flatten_preserves_preorder() {
        assert_eq!(
            flatten_paths(&sample_schema()),
            vec!["Tytuł", "Rok", "Rok.Miesiąc", "Rok.Miesiąc.Dzień"]
        );
    }

    #[test]
    fn test_max_depth() {
        assert_eq!(max_depth(&sample_schema()), 3);
        assert_eq!(max_depth(&[]), 0);
    }

    #[test]
    fn test_node_at_path_walks_by_name() {
        let values = vec![
            ValueNode::leaf("Tytuł", "X"),
            ValueNode::branch("Rok", "1999", vec![ValueNode::leaf("Miesiąc", "Maj")]),
        ];
        assert_eq!(node_at_path(&values, "Rok.Miesiąc").unwrap().value, "Maj");
        assert!(node_at_path(&values, "Rok.Dzień").is_none());
        assert!(node_at_path(&values, "").is_none());
    }

    #[test]
    fn test_schema_from_paths_round_trip() {
        let schema = sample_schema();
        let paths = flatten_paths(&schema);
        assert_eq!(schema_from_paths(&paths), schema);
    }

    #[test]
    fn test_schema_from_paths_accepts_arbitrary_order() {
        let paths = vec![
            "Rok.Miesiąc".to_string(),
            "Tytuł".to_string(),
            "Rok".to_string(),
        ];
        let schema = schema_from_paths(&paths);
        assert_eq!(flatten_paths(&schema), vec!["Rok", "Rok.Miesiąc", "Tytuł"]);
    }
}
