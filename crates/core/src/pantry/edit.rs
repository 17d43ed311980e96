//! In-place edits and removal of single pantry items.

use serde::Deserialize;

use super::expiry::parse_expiry;
use super::item::PantryItem;
use crate::types::PantryItemId;

/// Errors produced while validating an item edit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// A required field is absent or blank.
    #[error("{0} is required")]
    Missing(&'static str),
    /// The quantity is negative or not a finite number.
    #[error("quantity must be a non-negative number")]
    InvalidQuantity,
}

/// An edit to one pantry item, as sent by the client.
///
/// Name, quantity and unit are always replaced. Category, notes and expiry
/// are only replaced when supplied; an expiry that fails to parse leaves the
/// stored date alone, as do blank notes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEdit {
    /// ID of the item to edit.
    pub id: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New quantity.
    pub quantity: Option<f64>,
    /// New unit.
    pub unit: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New notes.
    pub notes: Option<String>,
    /// New expiry date.
    pub expiry_date: Option<String>,
}

/// A validated [`ItemEdit`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEdit {
    name: String,
    quantity: f64,
    unit: String,
    category: Option<String>,
    notes: Option<String>,
    expiry_date: Option<String>,
}

impl ItemEdit {
    /// Validate the required fields.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Missing`] for a blank name or unit or a missing
    /// quantity, and [`EditError::InvalidQuantity`] for a negative or
    /// non-finite quantity.
    pub fn validate(self) -> Result<ValidEdit, EditError> {
        let name = required(self.name, "name")?;
        let unit = required(self.unit, "unit")?;
        let quantity = self.quantity.ok_or(EditError::Missing("quantity"))?;
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(EditError::InvalidQuantity);
        }

        Ok(ValidEdit {
            name,
            quantity,
            unit,
            category: self.category.map(|c| c.trim().to_owned()).filter(|c| !c.is_empty()),
            notes: self.notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
            expiry_date: self.expiry_date,
        })
    }
}

impl ValidEdit {
    /// Apply the edit to `item`.
    pub fn apply(self, item: &mut PantryItem) {
        item.name = self.name;
        item.quantity = self.quantity;
        item.unit = self.unit;

        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(notes) = self.notes {
            item.notes = notes;
        }
        if let Some(expiry) = self.expiry_date.as_deref().and_then(parse_expiry) {
            item.expiry_date = Some(expiry);
        }
    }
}

/// Find an item by ID.
#[must_use]
pub fn find_item_mut(pantry: &mut [PantryItem], id: PantryItemId) -> Option<&mut PantryItem> {
    pantry.iter_mut().find(|item| item.id == id)
}

/// Remove an item by ID, returning it if it was present.
pub fn remove_item(pantry: &mut Vec<PantryItem>, id: PantryItemId) -> Option<PantryItem> {
    let position = pantry.iter().position(|item| item.id == id)?;
    Some(pantry.remove(position))
}

fn required(value: Option<String>, field: &'static str) -> Result<String, EditError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(EditError::Missing(field))
}
