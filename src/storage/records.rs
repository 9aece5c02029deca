//! JSON ingestion of extracted record files.
//!
//! The upstream extraction stage emits one JSON file per finding aid: an
//! array of row objects in page order. Rows carry no position of their own;
//! `order_index` is assigned here, at ingestion, and is the sole ordering
//! key for everything downstream.

use std::{fs::File, io::BufReader, path::Path};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    domain::{ExtractedField, Record},
    pipeline::Document,
};

/// Errors raised while loading record files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read records file")]
    Io(#[from] std::io::Error),

    /// The file content is not a valid record array.
    #[error("failed to parse records file")]
    Json(#[from] serde_json::Error),
}

/// One row as the extraction stage emits it: no position field, and every
/// column optional.
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    reference: String,
    #[serde(default)]
    unit: ExtractedField,
    #[serde(default)]
    group: ExtractedField,
    #[serde(default)]
    group_notes: ExtractedField,
    #[serde(default)]
    series: ExtractedField,
    #[serde(default)]
    series_notes: ExtractedField,
    #[serde(default)]
    date_start: Option<String>,
    #[serde(default)]
    date_end: Option<String>,
}

impl Row {
    fn into_record(self, order_index: usize) -> Record {
        Record {
            order_index,
            reference_raw: self.reference,
            unit: self.unit,
            group: self.group,
            group_notes: self.group_notes,
            series: self.series,
            series_notes: self.series_notes,
            date_start_raw: self.date_start,
            date_end_raw: self.date_end,
        }
    }
}

/// Loads one document from a JSON record file.
///
/// The document is named after the file stem.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid record
/// array.
#[instrument]
pub fn load_file(path: &Path) -> Result<Document, LoadError> {
    let reader = BufReader::new(File::open(path)?);
    let rows: Vec<Row> = serde_json::from_reader(reader)?;

    let name = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(order_index, row)| row.into_record(order_index))
        .collect::<Vec<_>>();

    debug!(document = %name, records = records.len(), "loaded record file");

    Ok(Document { name, records })
}

/// Loads every `.json` record file in a directory, in file-name order.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or any record file fails
/// to load.
#[instrument]
pub fn load_dir(dir: &Path) -> Result<Vec<Document>, LoadError> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths.iter().map(|path| load_file(path)).collect()
}
