//! Recipe service.
//!
//! Builds prompts from the caller's pantry, calls the language model and
//! parses its reply. Suggestions are cached per normalized ingredient set.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use pantry_manager_core::recipe::ingredient_key;
use pantry_manager_core::{Recipe, parse_recipes};

use crate::error::AppError;
use crate::llm::{LlmClient, LlmError};
use crate::state::RecipeCache;

/// Number of recipes requested per suggestion call.
pub const SUGGESTION_COUNT: usize = 3;

const SUGGEST_TEMPERATURE: f32 = 0.8;
const CHAT_TEMPERATURE: f32 = 0.7;

/// Errors from the recipe service.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// The language model call failed.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The model replied with something that is not a recipe array.
    #[error("model output is not a recipe array")]
    InvalidOutput {
        /// The reply as received.
        raw: String,
    },
}

impl From<RecipeError> for AppError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::Llm(e) => Self::Llm(e),
            RecipeError::InvalidOutput { raw } => Self::InvalidModelOutput { raw },
        }
    }
}

/// Recipe service.
pub struct RecipeService<'a> {
    llm: &'a LlmClient,
    cache: &'a RecipeCache,
}

impl<'a> RecipeService<'a> {
    /// Create a new recipe service.
    #[must_use]
    pub const fn new(llm: &'a LlmClient, cache: &'a RecipeCache) -> Self {
        Self { llm, cache }
    }

    /// Suggest recipes that use `pantry_items`.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Llm` if the model call fails and
    /// `RecipeError::InvalidOutput` if the reply cannot be parsed.
    #[instrument(skip(self, pantry_items), fields(items = pantry_items.len()))]
    pub async fn suggest(&self, pantry_items: &[String]) -> Result<Arc<Vec<Recipe>>, RecipeError> {
        let key = ingredient_key(pantry_items);

        if let Some(recipes) = self.cache.get(&key).await {
            tracing::debug!("Cache hit for recipe suggestions");
            return Ok(recipes);
        }

        let raw = self
            .llm
            .complete(
                suggestion_prompt(pantry_items),
                "Generate the recipes.".to_string(),
                SUGGEST_TEMPERATURE,
            )
            .await?;

        let recipes = match parse_recipes(&raw) {
            Ok(recipes) => Arc::new(recipes),
            Err(e) => {
                tracing::warn!(error = %e, "Could not parse recipe suggestions");
                return Err(RecipeError::InvalidOutput { raw });
            }
        };

        self.cache.insert(key, Arc::clone(&recipes)).await;
        Ok(recipes)
    }

    /// Answer a free-form cooking question with the pantry as context.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Llm` if the model call fails.
    #[instrument(skip_all, fields(items = pantry_items.len()))]
    pub async fn chat(
        &self,
        user_message: &str,
        pantry_items: &[String],
    ) -> Result<String, RecipeError> {
        let reply = self
            .llm
            .complete(
                chat_prompt(pantry_items),
                user_message.to_string(),
                CHAT_TEMPERATURE,
            )
            .await?;
        Ok(reply)
    }
}

fn suggestion_prompt(pantry_items: &[String]) -> String {
    format!(
        "You are a recipe generator. Suggest {SUGGESTION_COUNT} creative recipes using: {items}.
Reply with ONLY a JSON array of recipe objects in exactly this format, with no other text:
[
  {{
    \"id\": \"string\",
    \"title\": \"string\",
    \"description\": \"string\",
    \"imageUrl\": \"string\",
    \"ingredients\": [\"string\"],
    \"inPantry\": [\"string\"],
    \"missing\": [\"string\"],
    \"estimatedTime\": \"string\"
  }}
]
Use https://picsum.photos/600/400?random=1 (then ?random=2 and so on) as placeholder images.",
        items = pantry_items.join(", "),
    )
}

fn chat_prompt(pantry_items: &[String]) -> String {
    format!(
        "You are a friendly recipe assistant who can also just chat. Based on the user's \
         message, either suggest recipes or reply conversationally. The user has these pantry \
         items: {items}. Offer recipe ideas, meal plans or ingredient substitutes when asked. \
         Be creative but practical, and keep replies short.",
        items = pantry_items.join(", "),
    )
}
