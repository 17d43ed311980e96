//! Business logic services for the API.
//!
//! # Services
//!
//! - `recipes` - Recipe suggestions and recipe chat via the language model

pub mod recipes;

pub use recipes::{RecipeError, RecipeService};
