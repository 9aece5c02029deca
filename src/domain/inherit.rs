//! Attribute inheritance.
//!
//! Finding aids print shared descriptions (unit, group, series, and their
//! notes) once on an ancestor entry; the flat extraction loses that scoping.
//! The resolver restores it with a forward-only fill keyed by tree ancestry:
//! an unset field inherits from the nearest ancestor whose *own* record
//! defines it. Two rows that are document-adjacent but belong to different
//! subtrees never inherit from each other.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{
    record::{Field, Record},
    reference::{HierarchyPath, TokenKind},
    tree::Tree,
};

/// One resolved field value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedValue {
    /// The effective value, whether own or inherited. `None` when neither the
    /// record nor any ancestor defines the field.
    pub value: Option<String>,
    /// True when the value did not originate on this record.
    pub inherited: bool,
    /// `order_index` of the record that contributed the value.
    pub source: Option<usize>,
}

/// The resolved values of every inheritable field, for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAttributes {
    /// Resolved unit.
    pub unit: ResolvedValue,
    /// Resolved group.
    pub group: ResolvedValue,
    /// Resolved group notes.
    pub group_notes: ResolvedValue,
    /// Resolved series.
    pub series: ResolvedValue,
    /// Resolved series notes.
    pub series_notes: ResolvedValue,
}

impl ResolvedAttributes {
    /// The resolved value for the given field.
    #[must_use]
    pub const fn get(&self, field: Field) -> &ResolvedValue {
        match field {
            Field::Unit => &self.unit,
            Field::Group => &self.group,
            Field::GroupNotes => &self.group_notes,
            Field::Series => &self.series,
            Field::SeriesNotes => &self.series_notes,
        }
    }

    const fn get_mut(&mut self, field: Field) -> &mut ResolvedValue {
        match field {
            Field::Unit => &mut self.unit,
            Field::Group => &mut self.group,
            Field::GroupNotes => &mut self.group_notes,
            Field::Series => &mut self.series,
            Field::SeriesNotes => &mut self.series_notes,
        }
    }
}

/// Resolves inherited attributes for every record.
///
/// `records` must be the same slice the tree was built from; the result is
/// indexed in parallel with it. The fill is forward-only: a record's resolved
/// value never depends on a record with a larger `order_index`.
#[must_use]
#[instrument(skip(tree, records), fields(records = records.len()))]
pub fn resolve(tree: &Tree, records: &[Record]) -> Vec<ResolvedAttributes> {
    let mut resolved: Vec<ResolvedAttributes> = vec![ResolvedAttributes::default(); records.len()];

    for field in Field::ALL {
        // Donor values keyed by path, populated only from rows that define
        // the field themselves. Purely inherited rows never become donors.
        let mut donors: HashMap<HierarchyPath, (String, usize)> = HashMap::new();

        for (idx, record) in records.iter().enumerate() {
            let Some(node) = tree.node(idx) else {
                continue;
            };

            let slot = resolved[idx].get_mut(field);

            if let Some(own) = record.field(field).as_set() {
                slot.value = Some(own.to_string());
                slot.inherited = false;
                slot.source = Some(record.order_index);
                // A synthetic path is a placeholder, not a real position: its
                // segment may collide with a genuine root number, so it must
                // never donate to that subtree.
                if node.token() != TokenKind::Synthetic {
                    donors.insert(node.path().clone(), (own.to_string(), record.order_index));
                }
                continue;
            }

            // Walk up the ancestor chain until a donor is found.
            let mut cursor = node.path().parent();
            while let Some(path) = cursor {
                if let Some((value, source)) = donors.get(&path) {
                    slot.value = Some(value.clone());
                    slot.inherited = true;
                    slot.source = Some(*source);
                    break;
                }
                cursor = path.parent();
            }
        }
    }

    resolved
}
