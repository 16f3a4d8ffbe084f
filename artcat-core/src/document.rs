//! Shape gate for raw stored documents.
//!
//! A document that fails here is a defect in the store, not something a
//! user caused: it is reported as `CorruptDocument` and kept apart from the
//! validation outcomes the rest of the engine produces. The gate runs on
//! the raw JSON, before deserialization, so a `categories` field that is
//! not a sequence at all is caught instead of panicking a parse.

use serde_json::{json, Value};

use crate::errors::CatalogError;

fn collection_document_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["name", "categories"],
        "properties": {
            "name": { "type": "string" },
            "description": { "type": "string" },
            "categories": { "$ref": "#/$defs/nodes" }
        },
        "$defs": {
            "nodes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "subcategories": { "$ref": "#/$defs/nodes" }
                    }
                }
            }
        }
    })
}

fn artwork_document_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["collectionName", "categories"],
        "properties": {
            "collectionName": { "type": "string" },
            "categories": { "$ref": "#/$defs/nodes" },
            "createdAt": { "type": "string" },
            "updatedAt": { "type": "string" }
        },
        "$defs": {
            "nodes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "value": { "type": "string" },
                        "subcategories": { "$ref": "#/$defs/nodes" }
                    }
                }
            }
        }
    })
}

pub fn check_collection_document(document: &Value) -> Result<(), CatalogError> {
    check(&collection_document_schema(), document)
}

pub fn check_artwork_document(document: &Value) -> Result<(), CatalogError> {
    check(&artwork_document_schema(), document)
}

fn check(schema: &Value, document: &Value) -> Result<(), CatalogError> {
    let compiled = jsonschema::validator_for(schema).map_err(|error| {
        CatalogError::CorruptDocument(format!("document schema failed to compile: {}", error))
    })?;

    match compiled.validate(document) {
        Ok(()) => Ok(()),
        Err(error) => {
            let path_str = error.instance_path.to_string();
            let location = if path_str.is_empty() {
                "root".to_string()
            } else {
                path_str
            };
            Err(CatalogError::CorruptDocument(format!(
                "{} at {}",
                error, location
            )))
        }
    }
}
