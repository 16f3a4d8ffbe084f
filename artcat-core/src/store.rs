//! File-backed realization of the persistence collaborator: one JSON
//! document per collection plus one artwork-array document, under a single
//! data directory. Raw documents pass the shape gate before
//! deserialization.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::warn;

use crate::document::{check_artwork_document, check_collection_document};
use crate::errors::CatalogError;
use crate::filtering::{matches_artwork, FilterExpr};
use crate::models::{Artwork, Collection};

pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.collection.json", name))
    }

    fn artworks_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.artworks.json", name))
    }

    /// Loads a collection document by name.
    pub fn fetch_schema(&self, name: &str) -> Result<Collection, CatalogError> {
        let path = self.collection_path(name);
        if !path.exists() {
            return Err(CatalogError::CollectionNotFound(name.to_string()));
        }
        let contents = fs::read_to_string(&path)?;
        let document: Value = serde_json::from_str(&contents)?;
        if let Err(defect) = check_collection_document(&document) {
            warn!(collection = name, %defect, "stored collection document failed the shape gate");
            return Err(defect);
        }
        Ok(serde_json::from_value(document)?)
    }

    /// Loads a collection's artworks, keeping only those matching `filter`
    /// when one is given. A collection with no artwork document yet is
    /// simply empty.
    pub fn fetch_items(
        &self,
        name: &str,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<Artwork>, CatalogError> {
        let path = self.artworks_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path)?;
        let documents: Value = serde_json::from_str(&contents)?;
        let Value::Array(entries) = documents else {
            return Err(CatalogError::CorruptDocument(
                "artwork store is not an array".to_string(),
            ));
        };
        let mut artworks = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Err(defect) = check_artwork_document(&entry) {
                warn!(collection = name, %defect, "stored artwork document failed the shape gate");
                return Err(defect);
            }
            artworks.push(serde_json::from_value(entry)?);
        }
        if let Some(filter) = filter {
            artworks.retain(|artwork| matches_artwork(filter, artwork));
        }
        Ok(artworks)
    }

    pub fn save_collection(&self, collection: &Collection) -> Result<(), CatalogError> {
        fs::create_dir_all(&self.root)?;
        let contents = serde_json::to_string_pretty(collection)?;
        fs::write(self.collection_path(&collection.name), contents)?;
        Ok(())
    }

    pub fn save_artworks(&self, name: &str, artworks: &[Artwork]) -> Result<(), CatalogError> {
        fs::create_dir_all(&self.root)?;
        let contents = serde_json::to_string_pretty(artworks)?;
        fs::write(self.artworks_path(name), contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::compile_quick_filter;
    use crate::models::{SchemaNode, ValueNode};

    fn sample_collection() -> Collection {
        Collection::new(
            "Plakaty",
            "Plakaty festiwalowe",
            vec![SchemaNode::leaf("Tytuł"), SchemaNode::leaf("Rok")],
        )
    }

    #[test]
    fn test_round_trip_collection_and_artworks() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let collection = sample_collection();
        store.save_collection(&collection).unwrap();

        let artworks = vec![
            Artwork::new(
                "Plakaty",
                vec![
                    ValueNode::leaf("Tytuł", "Cyrk"),
                    ValueNode::leaf("Rok", "1999"),
                ],
            ),
            Artwork::new(
                "Plakaty",
                vec![
                    ValueNode::leaf("Tytuł", "Afisz"),
                    ValueNode::leaf("Rok", "1975"),
                ],
            ),
        ];
        store.save_artworks("Plakaty", &artworks).unwrap();

        let loaded = store.fetch_schema("Plakaty").unwrap();
        assert_eq!(loaded.schema, collection.schema);

        let all = store.fetch_items("Plakaty", None).unwrap();
        assert_eq!(all.len(), 2);

        let filter = compile_quick_filter("1975", &loaded.schema, "Plakaty");
        let matched = store.fetch_items("Plakaty", Some(&filter)).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].values[0].value, "Afisz");
    }

    #[test]
    fn test_missing_collection_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        assert_eq!(
            store.fetch_schema("Obrazy"),
            Err(CatalogError::CollectionNotFound("Obrazy".to_string()))
        );
    }

    #[test]
    fn test_missing_artwork_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        assert!(store.fetch_items("Plakaty", None).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_stored_document_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(
            dir.path().join("Plakaty.artworks.json"),
            r#"[{"collectionName": "Plakaty", "categories": "Rok"}]"#,
        )
        .unwrap();
        assert!(matches!(
            store.fetch_items("Plakaty", None),
            Err(CatalogError::CorruptDocument(_))
        ));
    }
}
