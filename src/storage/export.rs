//! JSON export of enriched documents.
//!
//! The export format is the ingestion format plus the derived columns: the
//! source fields (confidence metadata included) come through unmodified, with
//! the normalized path, resolved attributes, date endpoints, and advisory
//! flags alongside.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use tracing::{debug, instrument};

use crate::pipeline::ProcessedDocument;

/// Errors raised while exporting enriched documents.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The output file could not be written.
    #[error("failed to write export file")]
    Io(#[from] std::io::Error),

    /// The enriched records could not be serialized.
    #[error("failed to serialize enriched records")]
    Json(#[from] serde_json::Error),
}

/// Writes one enriched document to `<dir>/<name>.json`.
///
/// # Errors
///
/// Returns an error if the file cannot be written or the records cannot be
/// serialized.
#[instrument(skip(document), fields(document = %document.name))]
pub fn export_document(document: &ProcessedDocument, dir: &Path) -> Result<(), ExportError> {
    let path = dir.join(format!("{}.json", document.name));
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, &document.records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    debug!(path = %path.display(), records = document.records.len(), "exported document");
    Ok(())
}
