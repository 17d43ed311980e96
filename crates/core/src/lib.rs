//! Pantry Manager Core - Shared types and pantry domain logic.
//!
//! This crate is used by:
//! - `server` - The JSON HTTP API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. Everything that changes a pantry is a
//! function over plain values, so the server can run it inside a database
//! transaction and tests can run it without one.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails
//! - [`pantry`] - Pantry items, validation, edits and the merge routine
//! - [`lookup`] - The id, auth UID, email user lookup chain
//! - [`profile`] - Profile preferences and partial updates
//! - [`purchase`] - Store receipts imported by QR code
//! - [`recipe`] - Recipe suggestions parsed from model output
//! - [`shopping`] - Smart shopping list suggestions
//! - [`notifications`] - Expiry and low-stock notifications

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod lookup;
pub mod notifications;
pub mod pantry;
pub mod profile;
pub mod purchase;
pub mod recipe;
pub mod shopping;
pub mod types;

pub use lookup::{LookupChain, LookupError, LookupKey, LookupStep};
pub use notifications::{Notification, NotificationKind, notifications_for};
pub use pantry::{
    IncomingItem, ItemEdit, MergeError, MergeOutcome, NewPantryItem, PantryItem, merge_items,
};
pub use profile::{NotificationSettings, ProfileUpdate, UserProfile};
pub use purchase::{Purchase, PurchaseItem};
pub use recipe::{Recipe, RecipeParseError, parse_recipes};
pub use shopping::{Priority, RecipeNeeds, ShoppingListItem};
pub use types::*;
