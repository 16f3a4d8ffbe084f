use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One category slot in a collection's schema tree. Carries no value;
/// artworks attach values through a mirrored `ValueNode` tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub name: String,
    #[serde(rename = "subcategories", default)]
    pub children: Vec<SchemaNode>,
}

impl SchemaNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<SchemaNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

/// One category instance on an artwork. `value` may hold several entries
/// joined by semicolons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueNode {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "subcategories", default)]
    pub children: Vec<ValueNode>,
}

impl ValueNode {
    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn branch(
        name: impl Into<String>,
        value: impl Into<String>,
        children: Vec<ValueNode>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            children,
        }
    }

    /// The individual entries of a multi-value field, trimmed, with blanks
    /// dropped.
    pub fn values(&self) -> Vec<String> {
        self.value
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// By-name sibling lookup, the traversal discipline of sorting, export and
/// filter compilation. Two nodes are "the same category" because their
/// names are equal, regardless of position.
///
/// Validation and reconciliation use the opposite discipline: they pair
/// nodes by child index, regardless of name. The two are never unified.
pub fn find_child<'a>(nodes: &'a [ValueNode], name: &str) -> Option<&'a ValueNode> {
    nodes.iter().find(|node| node.name == name)
}

/// A collection owns the schema its artworks must mirror. The schema is
/// replaced wholesale on edit, never patched node by node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "categories")]
    pub schema: Vec<SchemaNode>,
}

impl Collection {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Vec<SchemaNode>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            schema,
        }
    }
}

/// One item of a collection. The owning collection's name is denormalized
/// onto the document for query convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: Uuid,
    pub collection_name: String,
    #[serde(rename = "categories")]
    pub values: Vec<ValueNode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Artwork {
    pub fn new(collection_name: impl Into<String>, values: Vec<ValueNode>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            collection_name: collection_name.into(),
            values,
            created_at: now,
            updated_at: now,
        }
    }
}
