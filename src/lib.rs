//! Finding-aid post-processing
//!
//! Scanned finding aids are extracted upstream into flat, ordered record
//! lists. This crate restores the structure the flat form loses: it parses
//! printed reference tokens into hierarchy paths, rebuilds the archival tree,
//! fills inherited attributes down the ancestry, and normalizes free-text
//! date ranges into sortable partial-ISO endpoints. Every step is total;
//! problems surface as advisory flags on the output, never as failures.

pub mod domain;
pub use domain::{
    Config, Field, Flag, HierarchyPath, NormalizedDateRange, Record, ResolvedAttributes, Tree,
};

/// The end-to-end enrichment pipeline.
pub mod pipeline;
pub use pipeline::{Document, ProcessedDocument, ProcessedRecord};

/// Ingestion and export of record files.
pub mod storage;
