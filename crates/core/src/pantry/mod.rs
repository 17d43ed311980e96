//! Pantry items and the operations that change a pantry.

pub mod edit;
pub mod expiry;
pub mod item;
pub mod merge;

pub use edit::{EditError, ItemEdit, ValidEdit, find_item_mut, remove_item};
pub use expiry::{later_of, parse_expiry};
pub use item::{
    DEFAULT_CATEGORY, DEFAULT_QUANTITY, DEFAULT_UNIT, IncomingItem, ItemError, NewPantryItem,
    PantryItem, validate_batch,
};
pub use merge::{MergeError, MergeOutcome, merge_items};
