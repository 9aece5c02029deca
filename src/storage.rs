//! Ingestion and export of record files.

/// JSON export of enriched documents.
pub mod export;
/// JSON ingestion of extracted record files.
pub mod records;

pub use export::{export_document, ExportError};
pub use records::{load_dir, load_file, LoadError};
