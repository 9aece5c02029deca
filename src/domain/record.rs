use serde::{Deserialize, Serialize};

/// A field value extracted upstream, together with the extraction confidence
/// reported by the model.
///
/// Confidence is opaque passthrough metadata: it is carried from input to
/// output unmodified and never reinterpreted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    /// The extracted text, if any.
    pub value: Option<String>,
    /// The extraction confidence, if the upstream stage reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ExtractedField {
    /// Creates a field holding the given value, with no confidence annotation.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            confidence: None,
        }
    }

    /// Whether this field carries a meaningful value.
    ///
    /// Blank strings and the literal `nan` (an artifact of upstream tabular
    /// round-trips) count as unset.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.value.as_deref().is_some_and(|s| {
            let s = s.trim();
            !s.is_empty() && !s.eq_ignore_ascii_case("nan")
        })
    }

    /// Returns the trimmed value if the field is set.
    #[must_use]
    pub fn as_set(&self) -> Option<&str> {
        if self.is_set() {
            self.value.as_deref().map(str::trim)
        } else {
            None
        }
    }
}

/// One archival entry, as extracted from a scanned finding aid.
///
/// Records are immutable once ingested; the pipeline only derives new data
/// from them, it never mutates the source fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Position of the record in the source document. Assigned once at
    /// ingestion; the sole ordering key for all forward-fill logic.
    pub order_index: usize,

    /// The raw printed locator string for the item (e.g. `6.(1)`). May be
    /// empty when the page carried no visible reference.
    #[serde(default)]
    pub reference_raw: String,

    /// Archival unit the item belongs to.
    #[serde(default)]
    pub unit: ExtractedField,
    /// Group (top-level numbering) the item belongs to.
    #[serde(default)]
    pub group: ExtractedField,
    /// Free-text notes attached to the group.
    #[serde(default)]
    pub group_notes: ExtractedField,
    /// Series the item belongs to.
    #[serde(default)]
    pub series: ExtractedField,
    /// Free-text notes attached to the series.
    #[serde(default)]
    pub series_notes: ExtractedField,

    /// Raw text of the start of the item's date range, if printed.
    #[serde(default)]
    pub date_start_raw: Option<String>,
    /// Raw text of the end of the item's date range, if printed.
    #[serde(default)]
    pub date_end_raw: Option<String>,
}

impl Record {
    /// Creates a record with the given position and reference token, all
    /// other fields unset.
    #[must_use]
    pub fn new(order_index: usize, reference_raw: impl Into<String>) -> Self {
        Self {
            order_index,
            reference_raw: reference_raw.into(),
            unit: ExtractedField::default(),
            group: ExtractedField::default(),
            group_notes: ExtractedField::default(),
            series: ExtractedField::default(),
            series_notes: ExtractedField::default(),
            date_start_raw: None,
            date_end_raw: None,
        }
    }

    /// Returns the extracted field for the given inheritable attribute.
    #[must_use]
    pub const fn field(&self, field: Field) -> &ExtractedField {
        match field {
            Field::Unit => &self.unit,
            Field::Group => &self.group,
            Field::GroupNotes => &self.group_notes,
            Field::Series => &self.series,
            Field::SeriesNotes => &self.series_notes,
        }
    }
}

/// The inheritable attributes of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Archival unit.
    Unit,
    /// Group.
    Group,
    /// Group notes.
    GroupNotes,
    /// Series.
    Series,
    /// Series notes.
    SeriesNotes,
}

impl Field {
    /// All inheritable fields, in column order.
    pub const ALL: [Self; 5] = [
        Self::Unit,
        Self::Group,
        Self::GroupNotes,
        Self::Series,
        Self::SeriesNotes,
    ];

    /// The column name of the field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Group => "group",
            Self::GroupNotes => "group_notes",
            Self::Series => "series",
            Self::SeriesNotes => "series_notes",
        }
    }
}

/// Advisory data-quality flags raised by the pipeline.
///
/// Flags are carried on the output records for human review; none of them
/// aborts processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// The reference token matched no grammar; a synthetic single-segment
    /// path was assigned.
    UnparseableReference,
    /// The record's path does not extend the open stack context; it was
    /// treated as a new root.
    OrphanPath,
    /// Fuzzy markers (`?`, letter suffixes, salvaged digits) were resolved
    /// heuristically.
    AmbiguousReferenceToken,
    /// The raw date text yielded no recoverable calendar unit.
    UnparseableDate,
    /// The resolved end preceded the resolved start; the pair was swapped.
    InvertedDateRange,
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UnparseableReference => "unparseable reference",
            Self::OrphanPath => "orphan path",
            Self::AmbiguousReferenceToken => "ambiguous reference token",
            Self::UnparseableDate => "unparseable date",
            Self::InvertedDateRange => "inverted date range",
        };
        f.write_str(s)
    }
}
