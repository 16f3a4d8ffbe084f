// Public modules
pub mod document;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod paths;
pub mod reconcile;
pub mod sorting;
pub mod spreadsheet;
pub mod store;
pub mod validation;

// Re-export commonly used types for convenience
pub use document::{check_artwork_document, check_collection_document};
pub use errors::CatalogError;
pub use filtering::{
    compile_advanced_filter, compile_quick_filter, compile_topmost_filter, matches_artwork,
    FilterExpr, SearchParams,
};
pub use models::{find_child, Artwork, Collection, SchemaNode, ValueNode};
pub use paths::{flatten_paths, flatten_value_paths, max_depth, node_at_path, schema_from_paths};
pub use reconcile::{reconcile, reconcile_artworks};
pub use sorting::{normalize_sort_key, sort_by_path, SortDirection};
pub use spreadsheet::{fill_row, normalize_header_cell, parse_rows, validate_header};
pub use store::Store;
pub use validation::{
    check_schema_edit, fits_within_schema, matches_schema, validate_create, well_formed_schema,
};
