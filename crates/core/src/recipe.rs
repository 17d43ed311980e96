//! Recipes suggested by the language model.
//!
//! The model is asked for a bare JSON array but often wraps it in a Markdown
//! code fence or a sentence of preamble. [`parse_recipes`] tolerates both.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors produced while parsing model output.
#[derive(Debug, thiserror::Error)]
pub enum RecipeParseError {
    /// The output is not a JSON array of recipes.
    #[error("model output is not a recipe array: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A recipe suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub in_pantry: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

/// An ingredient line, either a bare name or a name with a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ingredient {
    Name(String),
    Measured { name: String, quantity: String },
}

impl Ingredient {
    /// The ingredient name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Measured { name, .. } => name,
        }
    }
}

/// Parse the model's reply into recipes.
///
/// # Errors
///
/// Returns [`RecipeParseError::InvalidJson`] if no JSON array of recipes can
/// be recovered from `raw`.
pub fn parse_recipes(raw: &str) -> Result<Vec<Recipe>, RecipeParseError> {
    let stripped = strip_code_fences(raw);
    match serde_json::from_str(&stripped) {
        Ok(recipes) => Ok(recipes),
        Err(err) => {
            let start = stripped.find('[');
            let end = stripped.rfind(']');
            match (start, end) {
                (Some(start), Some(end)) if start < end => stripped
                    .get(start..=end)
                    .map_or(Err(err.into()), |slice| {
                        serde_json::from_str(slice).map_err(Into::into)
                    }),
                _ => Err(err.into()),
            }
        }
    }
}

/// Remove Markdown code fence markers (```` ```json ```` and ```` ``` ````).
#[must_use]
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_owned()
}

/// Cache key for a set of pantry item names.
///
/// Names are trimmed, lowercased, deduplicated and sorted, so the same
/// pantry in a different order hits the same entry.
#[must_use]
pub fn ingredient_key<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| name.as_ref().trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join("\u{1f}")
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Int(n) => n.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const RECIPES: &str = r#"[
      {
        "id": "1",
        "title": "Tomato Rice",
        "description": "One pot.",
        "imageUrl": "https://picsum.photos/600/400?random=1",
        "ingredients": ["rice", "tomatoes"],
        "inPantry": ["rice"],
        "missing": ["tomatoes"],
        "estimatedTime": "25 minutes"
      },
      {
        "id": 2,
        "title": "Omelette",
        "ingredients": [{"name": "eggs", "quantity": "3"}],
        "inPantry": ["eggs"],
        "missing": []
      }
    ]"#;

    #[test]
    fn test_parse_bare_array() {
        let recipes = parse_recipes(RECIPES).unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].title, "Tomato Rice");
        assert_eq!(recipes[0].missing, vec!["tomatoes"]);
        assert_eq!(recipes[1].id, "2");
        assert_eq!(recipes[1].ingredients[0].name(), "eggs");
        assert!(recipes[1].estimated_time.is_none());
    }

    #[test]
    fn test_parse_fenced() {
        let raw = format!("```json\n{RECIPES}\n```");
        assert_eq!(parse_recipes(&raw).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_with_preamble() {
        let raw = format!("Here are three recipes you can make:\n{RECIPES}\nEnjoy!");
        assert_eq!(parse_recipes(&raw).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_prose_fails() {
        assert!(parse_recipes("Sorry, I can't help with that.").is_err());
        assert!(parse_recipes("[not json]").is_err());
    }

    #[test]
    fn test_ingredient_key_normalizes() {
        let a = ingredient_key(&["Rice", " eggs", "rice"]);
        let b = ingredient_key(&["EGGS", "rice", ""]);
        assert_eq!(a, b);
        assert_ne!(a, ingredient_key(&["eggs"]));
    }

    #[test]
    fn test_serializes_camel_case() {
        let recipes = parse_recipes(RECIPES).unwrap();
        let json = serde_json::to_value(&recipes[0]).unwrap();
        assert_eq!(json["inPantry"][0], "rice");
        assert_eq!(json["estimatedTime"], "25 minutes");
        assert_eq!(json["ingredients"][0], "rice");
    }
}
