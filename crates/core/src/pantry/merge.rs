//! Pantry reconciliation.
//!
//! Merges newly added or scanned items into a user's existing pantry. An
//! incoming item is "the same" as a stored one when the names match
//! case-insensitively and the unit and category match exactly. Matches are
//! combined in place; everything else is appended.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::expiry::later_of;
use super::item::{NewPantryItem, PantryItem};

/// Why a batch could not be merged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// Summing into an existing entry left no finite quantity.
    #[error("quantity of {name} is too large")]
    QuantityOverflow {
        /// Name of the stored entry.
        name: String,
    },
}

/// Counts produced by [`merge_items`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// Items appended as new entries.
    pub inserted: usize,
    /// Incoming items folded into an existing entry.
    pub updated: usize,
}

impl MergeOutcome {
    /// Human-readable summary returned to clients.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} items added and {} items updated in your pantry.",
            self.inserted, self.updated
        )
    }
}

/// Merge `incoming` into `pantry`.
///
/// For a matching entry: quantities are summed, the longer notes win, and the
/// later expiry date is kept. Items appended earlier in the same batch take
/// part in matching, so duplicates within one request collapse into a single
/// entry. New entries are stamped with `now`.
///
/// # Errors
///
/// Returns [`MergeError::QuantityOverflow`] if a summed quantity is not
/// finite. `pantry` is left untouched in that case.
pub fn merge_items(
    pantry: &mut Vec<PantryItem>,
    incoming: impl IntoIterator<Item = NewPantryItem>,
    now: DateTime<Utc>,
) -> Result<MergeOutcome, MergeError> {
    let mut merged = pantry.clone();
    let mut outcome = MergeOutcome::default();

    for item in incoming {
        if let Some(existing) = merged.iter_mut().find(|p| p.matches(&item)) {
            combine(existing, item)?;
            outcome.updated += 1;
        } else {
            merged.push(PantryItem::from_new(item, now));
            outcome.inserted += 1;
        }
    }

    *pantry = merged;
    Ok(outcome)
}

fn combine(existing: &mut PantryItem, item: NewPantryItem) -> Result<(), MergeError> {
    let quantity = existing.quantity + item.quantity;
    if !quantity.is_finite() {
        return Err(MergeError::QuantityOverflow {
            name: existing.name.clone(),
        });
    }
    existing.quantity = quantity;

    if item.notes.chars().count() > existing.notes.chars().count() {
        existing.notes = item.notes;
    }

    existing.expiry_date = later_of(existing.expiry_date, item.expiry_date);
    Ok(())
}
