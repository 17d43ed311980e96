//! Smart shopping list suggestions.
//!
//! Suggestions come from three sources, in priority order:
//!
//! 1. Low stock: the item's quantity is at or below the user's threshold for
//!    its category. Suggests twice the threshold.
//! 2. Expiring soon: the item expires within [`EXPIRING_WINDOW_DAYS`]. Suggests
//!    replacing the quantity on hand.
//! 3. Recipe ingredients the caller reports as missing. Suggests one unit.
//!
//! A name is suggested at most once and never when it is already on the
//! caller's list. Names compare case-insensitively.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::pantry::PantryItem;
use crate::profile::UserProfile;

/// Items expiring before `now` plus this many days are suggested.
pub const EXPIRING_WINDOW_DAYS: i64 = 3;

/// Unit used for recipe ingredient suggestions.
pub const RECIPE_UNIT: &str = "units";

/// Suggestion priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Why an item was suggested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionSource {
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
    #[serde(rename = "Recipe Ingredients")]
    RecipeIngredients,
}

/// One shopping list entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub purchased: bool,
    pub category: SuggestionSource,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_name: Option<String>,
}

/// Ingredients a recipe needs that the pantry lacks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeNeeds {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub missing: Vec<String>,
}

/// Build suggestions for `pantry`.
///
/// `existing` holds the names already on the user's list.
#[must_use]
pub fn suggest(
    pantry: &[PantryItem],
    profile: &UserProfile,
    recipes: &[RecipeNeeds],
    existing: &[String],
    now: DateTime<Utc>,
) -> Vec<ShoppingListItem> {
    let mut seen: HashSet<String> = existing.iter().map(|name| fold(name)).collect();
    let mut suggestions = Vec::new();

    for item in pantry {
        let Some(threshold) = profile.threshold_for(&item.category) else {
            continue;
        };
        if item.quantity <= threshold && seen.insert(fold(&item.name)) {
            suggestions.push(ShoppingListItem {
                id: format!("low-stock-{}", item.id),
                name: item.name.clone(),
                quantity: threshold * 2.0,
                unit: item.unit.clone(),
                purchased: false,
                category: SuggestionSource::LowStock,
                priority: Priority::High,
                recipe_id: None,
                recipe_name: None,
            });
        }
    }

    let horizon = now + Duration::days(EXPIRING_WINDOW_DAYS);
    for item in pantry {
        let expiring = item.expiry_date.is_some_and(|expiry| expiry < horizon);
        if expiring && seen.insert(fold(&item.name)) {
            suggestions.push(ShoppingListItem {
                id: format!("expiring-{}", item.id),
                name: item.name.clone(),
                quantity: item.quantity,
                unit: item.unit.clone(),
                purchased: false,
                category: SuggestionSource::ExpiringSoon,
                priority: Priority::Medium,
                recipe_id: None,
                recipe_name: None,
            });
        }
    }

    for recipe in recipes {
        for ingredient in &recipe.missing {
            let name = ingredient.trim();
            if name.is_empty() || !seen.insert(fold(name)) {
                continue;
            }
            suggestions.push(ShoppingListItem {
                id: format!("recipe-{}-{name}", recipe.id),
                name: name.to_owned(),
                quantity: 1.0,
                unit: RECIPE_UNIT.to_owned(),
                purchased: false,
                category: SuggestionSource::RecipeIngredients,
                priority: Priority::Low,
                recipe_id: Some(recipe.id.clone()),
                recipe_name: Some(recipe.title.clone()),
            });
        }
    }

    suggestions
}

fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}
