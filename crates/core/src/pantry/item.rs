//! Pantry item types.
//!
//! [`PantryItem`] is the stored form (a sub-document of the owning user).
//! [`IncomingItem`] is the loosely-typed shape clients send when adding or
//! scanning items; [`IncomingItem::validate`] turns it into a [`NewPantryItem`]
//! with defaults applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::expiry::parse_expiry;
use crate::types::PantryItemId;

/// Unit used when the client does not supply one.
pub const DEFAULT_UNIT: &str = "pcs";

/// Category used when the client does not supply one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Quantity used when the client does not supply one.
pub const DEFAULT_QUANTITY: f64 = 1.0;

/// Errors produced while validating incoming items.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ItemError {
    /// The item has no name, or the name is blank.
    #[error("item {index}: name is required")]
    MissingName {
        /// Position of the item in the request.
        index: usize,
    },
    /// The quantity is negative or not a finite number.
    #[error("item {index}: quantity must be a non-negative number")]
    InvalidQuantity {
        /// Position of the item in the request.
        index: usize,
    },
}

/// A stored pantry item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryItem {
    /// Sub-document ID, unique within the owning pantry.
    pub id: PantryItemId,
    /// Display name as first entered.
    pub name: String,
    /// Amount on hand, in `unit`.
    pub quantity: f64,
    /// Unit of measure (`pcs`, `g`, `kg`, `ml`, `l`, ...).
    pub unit: String,
    /// Best-before date, if known.
    pub expiry_date: Option<DateTime<Utc>>,
    /// Grouping used for matching and low-stock thresholds.
    pub category: String,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// When the item first entered the pantry.
    pub added_at: DateTime<Utc>,
}

impl PantryItem {
    /// Build a stored item from a validated new item.
    #[must_use]
    pub fn from_new(item: NewPantryItem, added_at: DateTime<Utc>) -> Self {
        Self {
            id: PantryItemId::generate(),
            name: item.name,
            quantity: item.quantity,
            unit: item.unit,
            expiry_date: item.expiry_date,
            category: item.category,
            notes: item.notes,
            added_at,
        }
    }

    /// Whether `other` refers to the same pantry entry as `self`.
    ///
    /// Names compare case-insensitively; unit and category compare exactly.
    #[must_use]
    pub fn matches(&self, other: &NewPantryItem) -> bool {
        self.unit == other.unit
            && self.category == other.category
            && self.name.to_lowercase() == other.name.to_lowercase()
    }
}

/// A validated item ready to be merged into a pantry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPantryItem {
    /// Trimmed, non-empty name.
    pub name: String,
    /// Non-negative quantity.
    pub quantity: f64,
    /// Unit of measure.
    pub unit: String,
    /// Parsed expiry date; unparseable input is `None`.
    pub expiry_date: Option<DateTime<Utc>>,
    /// Category.
    pub category: String,
    /// Notes (possibly empty).
    pub notes: String,
}

impl NewPantryItem {
    /// Create a new item with default quantity, unit and category.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: DEFAULT_QUANTITY,
            unit: DEFAULT_UNIT.to_owned(),
            expiry_date: None,
            category: DEFAULT_CATEGORY.to_owned(),
            notes: String::new(),
        }
    }
}

/// An item as sent by a client when adding to the pantry.
///
/// Every field is optional on the wire; see [`IncomingItem::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingItem {
    /// Item name (required after validation).
    pub name: Option<String>,
    /// Quantity, defaults to 1.
    pub quantity: Option<f64>,
    /// Unit, defaults to `pcs`.
    pub unit: Option<String>,
    /// Expiry date as RFC 3339 or `YYYY-MM-DD`.
    pub expiry_date: Option<String>,
    /// Category, defaults to `general`.
    pub category: Option<String>,
    /// Notes.
    pub notes: Option<String>,
}

impl IncomingItem {
    /// Validate the item and apply defaults.
    ///
    /// `index` is the item's position in the request and is reported in
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::MissingName`] when the name is absent or blank and
    /// [`ItemError::InvalidQuantity`] when the quantity is negative or not
    /// finite.
    pub fn validate(self, index: usize) -> Result<NewPantryItem, ItemError> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(ItemError::MissingName { index })?
            .to_owned();

        let quantity = self.quantity.unwrap_or(DEFAULT_QUANTITY);
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(ItemError::InvalidQuantity { index });
        }

        Ok(NewPantryItem {
            name,
            quantity,
            unit: non_blank_or(self.unit, DEFAULT_UNIT),
            expiry_date: self.expiry_date.as_deref().and_then(parse_expiry),
            category: non_blank_or(self.category, DEFAULT_CATEGORY),
            notes: self.notes.map(|n| n.trim().to_owned()).unwrap_or_default(),
        })
    }
}

/// Validate a batch of incoming items, stopping at the first invalid one.
///
/// # Errors
///
/// Returns the first [`ItemError`] encountered.
pub fn validate_batch(items: Vec<IncomingItem>) -> Result<Vec<NewPantryItem>, ItemError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| item.validate(index))
        .collect()
}

fn non_blank_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}
