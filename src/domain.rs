//! Domain models for finding-aid post-processing.
//!
//! This module contains the core domain types: extracted records, reference
//! parsing, hierarchy reconstruction, attribute inheritance, date-range
//! normalization, and configuration.

mod config;
pub use config::Config;

/// Date-range normalization and sortable date keys.
pub mod dates;
pub use dates::{DateKey, NormalizedDateRange, PartialDate};

/// Attribute inheritance over the reconstructed hierarchy.
pub mod inherit;
pub use inherit::{ResolvedAttributes, ResolvedValue};

/// Extracted records, fields, and data-quality flags.
pub mod record;
pub use record::{ExtractedField, Field, Flag, Record};

/// Reference token parsing and hierarchy paths.
pub mod reference;
pub use reference::{HierarchyPath, ParsedReference, TokenKind};

/// Hierarchy reconstruction from ordered record sequences.
pub mod tree;
pub use tree::{Node, Tree};
