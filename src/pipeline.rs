//! The end-to-end enrichment pipeline.
//!
//! One document flows through four stages in a fixed order: reference
//! parsing, tree building, attribute inheritance, and date normalization.
//! The pipeline is total over its input: every record comes out enriched,
//! and every data-quality concern is reported as an advisory [`Flag`] on the
//! record rather than an error.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::{
    dates::{self, DateKey},
    inherit, Config, Flag, Record, ResolvedAttributes, TokenKind, Tree,
};

/// One ingested document: a named, ordered record list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Name of the source document, used in logs and output paths.
    pub name: String,
    /// The records, in page order. `order_index` matches the position here.
    pub records: Vec<Record>,
}

/// One record after enrichment.
///
/// Carries the source record unmodified (confidence metadata included)
/// alongside everything the pipeline derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    /// The source record, passed through unmodified.
    #[serde(flatten)]
    pub record: Record,

    /// The normalized hierarchy path, segments joined with `/`.
    pub path: String,
    /// Number of path segments.
    pub depth: usize,
    /// `order_index` of the parent record, or `None` for roots.
    pub parent: Option<usize>,
    /// True when any path segment was resolved heuristically.
    pub fuzzy: bool,

    /// Resolved inheritable attributes.
    pub attributes: ResolvedAttributes,

    /// Partial-ISO start of the normalized date range.
    pub date_start: Option<String>,
    /// Partial-ISO end of the normalized date range.
    pub date_end: Option<String>,
    /// Sortable key for the start (missing units floored).
    pub date_start_sortable: Option<i64>,
    /// Sortable key for the end (missing units ceiled).
    pub date_end_sortable: Option<i64>,
    /// True when the start is known to the day.
    pub date_start_complete: bool,
    /// True when the end is known to the day.
    pub date_end_complete: bool,
    /// Single-date sort key kept for consumers of the original columns.
    pub date_key: DateKey,

    /// Advisory data-quality flags, in raise order.
    pub flags: Vec<Flag>,
}

/// One document after enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    /// Name of the source document.
    pub name: String,
    /// The reconstructed hierarchy.
    pub tree: Tree,
    /// The enriched records, in `order_index` order.
    pub records: Vec<ProcessedRecord>,
}

impl ProcessedDocument {
    /// The number of records carrying at least one flag.
    #[must_use]
    pub fn flagged(&self) -> usize {
        self.records.iter().filter(|r| !r.flags.is_empty()).count()
    }
}

/// Runs the full pipeline over one document.
#[must_use]
#[instrument(skip(document, config), fields(document = %document.name, records = document.records.len()))]
pub fn process_document(document: &Document, config: &Config) -> ProcessedDocument {
    let tree = Tree::build(&document.records);
    let attributes = inherit::resolve(&tree, &document.records);

    let records = document
        .records
        .iter()
        .zip(tree.iter())
        .zip(attributes)
        .map(|((record, node), attributes)| {
            let range = dates::normalize(
                record.date_start_raw.as_deref(),
                record.date_end_raw.as_deref(),
                config,
            );
            let date_key = dates::date_key(record.date_start_raw.as_deref(), config);

            let mut flags = Vec::new();
            if node.token() == TokenKind::Synthetic {
                flags.push(Flag::UnparseableReference);
            } else if node.fuzzy() {
                flags.push(Flag::AmbiguousReferenceToken);
            }
            if node.orphan() {
                flags.push(Flag::OrphanPath);
            }
            if range.is_empty() && has_date_text(record, config) {
                flags.push(Flag::UnparseableDate);
            }
            if range.swapped {
                flags.push(Flag::InvertedDateRange);
            }

            let parent = node
                .parent()
                .and_then(|idx| tree.node(idx))
                .map(crate::domain::Node::order_index);

            ProcessedRecord {
                record: record.clone(),
                path: node.path().to_string(),
                depth: node.depth(),
                parent,
                fuzzy: node.fuzzy(),
                attributes,
                date_start: range.start_formatted(),
                date_end: range.end_formatted(),
                date_start_sortable: range.start_sortable(),
                date_end_sortable: range.end_sortable(),
                date_start_complete: range.start_complete(),
                date_end_complete: range.end_complete(),
                date_key,
                flags,
            }
        })
        .collect::<Vec<_>>();

    let flagged = records.iter().filter(|r| !r.flags.is_empty()).count();
    info!(records = records.len(), flagged, "document processed");

    ProcessedDocument {
        name: document.name.clone(),
        tree,
        records,
    }
}

/// Runs the pipeline over many documents in parallel.
///
/// Documents are independent, so they are processed on the rayon pool;
/// results come back in input order.
#[must_use]
pub fn process_documents(documents: &[Document], config: &Config) -> Vec<ProcessedDocument> {
    documents
        .par_iter()
        .map(|document| process_document(document, config))
        .collect()
}

/// True when either raw date column carries text that was meant as a date
/// rather than an explicit no-date marker.
fn has_date_text(record: &Record, config: &Config) -> bool {
    [&record.date_start_raw, &record.date_end_raw]
        .into_iter()
        .flatten()
        .any(|raw| {
            let raw = raw.trim();
            !raw.is_empty() && !config.is_open_range_marker(raw)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExtractedField;

    fn document(refs: &[&str]) -> Document {
        Document {
            name: "test".to_string(),
            records: refs
                .iter()
                .enumerate()
                .map(|(i, r)| Record::new(i, *r))
                .collect(),
        }
    }

    #[test]
    fn enriches_every_record() {
        let mut doc = document(&["6.", "(1)", "(2)", "7."]);
        doc.records[0].series = ExtractedField::new("Letters");
        doc.records[1].date_start_raw = Some("14-15 Oct 1839".to_string());

        let processed = process_document(&doc, &Config::default());

        assert_eq!(processed.records.len(), 4);
        let paths: Vec<&str> = processed.records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["6", "6/1", "6/2", "7"]);

        let child = &processed.records[1];
        assert_eq!(child.parent, Some(0));
        assert_eq!(child.depth, 2);
        assert_eq!(child.attributes.series.value.as_deref(), Some("Letters"));
        assert!(child.attributes.series.inherited);
        assert_eq!(child.date_start.as_deref(), Some("1839-10-14"));
        assert_eq!(child.date_end.as_deref(), Some("1839-10-15"));
        assert!(child.flags.is_empty());
    }

    #[test]
    fn unparseable_reference_is_flagged_not_fatal() {
        let processed = process_document(&document(&["6.", "scribble"]), &Config::default());

        let bad = &processed.records[1];
        assert!(bad.flags.contains(&Flag::UnparseableReference));
        assert_eq!(bad.parent, None);
        assert_eq!(processed.flagged(), 1);
    }

    #[test]
    fn orphan_and_fuzzy_flags() {
        let processed = process_document(&document(&["2.", "2/3/1", "106.?"]), &Config::default());

        assert!(processed.records[1].flags.contains(&Flag::OrphanPath));
        assert!(processed.records[2]
            .flags
            .contains(&Flag::AmbiguousReferenceToken));
    }

    #[test]
    fn date_flags() {
        let mut doc = document(&["1.", "2.", "3.", "4."]);
        doc.records[0].date_start_raw = Some("1915-1910".to_string());
        doc.records[1].date_start_raw = Some("sometime later".to_string());
        doc.records[2].date_start_raw = Some("n.d.".to_string());
        doc.records[3].date_start_raw = Some("1910".to_string());

        let processed = process_document(&doc, &Config::default());

        assert!(processed.records[0].flags.contains(&Flag::InvertedDateRange));
        assert_eq!(processed.records[0].date_start.as_deref(), Some("1910"));
        assert!(processed.records[1].flags.contains(&Flag::UnparseableDate));
        // An explicit no-date marker is absence, not a parse failure.
        assert!(processed.records[2].flags.is_empty());
        assert!(processed.records[3].flags.is_empty());
    }

    #[test]
    fn sortable_keys_order_partial_and_complete_dates() {
        let mut doc = document(&["1.", "2."]);
        doc.records[0].date_start_raw = Some("1910".to_string());
        doc.records[1].date_start_raw = Some("3 Mar 1910".to_string());

        let processed = process_document(&doc, &Config::default());
        let year = &processed.records[0];
        let day = &processed.records[1];

        assert!(year.date_start_sortable < day.date_start_sortable);
        assert!(year.date_end_sortable > day.date_end_sortable);
        assert!(!year.date_start_complete);
        assert!(day.date_start_complete);
    }

    #[test]
    fn confidence_metadata_passes_through() {
        let mut doc = document(&["1."]);
        doc.records[0].unit = ExtractedField {
            value: Some("MS 42".to_string()),
            confidence: Some(0.83),
        };

        let processed = process_document(&doc, &Config::default());
        let confidence = processed.records[0].record.unit.confidence;
        assert_eq!(confidence, Some(0.83));
    }

    #[test]
    fn parallel_processing_preserves_input_order() {
        let docs: Vec<Document> = (0..8)
            .map(|i| Document {
                name: format!("doc-{i}"),
                records: vec![Record::new(0, "1.")],
            })
            .collect();

        let processed = process_documents(&docs, &Config::default());
        let names: Vec<&str> = processed.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            ["doc-0", "doc-1", "doc-2", "doc-3", "doc-4", "doc-5", "doc-6", "doc-7"]
        );
    }
}
