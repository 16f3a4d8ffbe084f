use thiserror::Error;

/// Validation outcomes the engine reports to its callers.
///
/// Every kind except `CorruptDocument` and `Storage` describes a condition a
/// user can cause (and fix); those two mark defects in the stored data or
/// its transport and are surfaced separately by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("schema is malformed: {0}")]
    MalformedSchema(String),

    #[error("category list is empty")]
    EmptyCategoryList,

    #[error("categories do not match the collection schema: {0}")]
    StructuralMismatch(String),

    #[error("schema edit leaves existing categories out of range: {}", .paths.join(", "))]
    SchemaEditIncompatible { paths: Vec<String> },

    #[error("duplicate header column '{0}'")]
    DuplicateHeaderColumn(String),

    #[error("header column {0} is empty")]
    EmptyHeaderField(usize),

    #[error("header column '{0}' is missing a subcategory name after '.'")]
    DanglingSubcategoryName(String),

    #[error("header column '{child}' has no parent column '{parent}'")]
    MissingParentCategory { child: String, parent: String },

    #[error("row {row} has {cells} cells but the header has {columns} columns")]
    RowColumnCountMismatch {
        row: usize,
        cells: usize,
        columns: usize,
    },

    #[error("header categories do not match the collection: missing [{}], extra [{}]", .missing.join(", "), .extra.join(", "))]
    CategorySetMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("collection '{0}' not found")]
    CollectionNotFound(String),

    /// A stored document whose shape is not even a category tree. Logged
    /// and surfaced as an internal defect, never as a validation outcome.
    #[error("stored document is corrupt: {0}")]
    CorruptDocument(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(error: std::io::Error) -> Self {
        CatalogError::Storage(error.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(error: serde_json::Error) -> Self {
        CatalogError::Storage(error.to_string())
    }
}
