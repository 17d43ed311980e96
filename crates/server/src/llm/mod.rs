//! Language model client for recipe suggestions and recipe chat.
//!
//! Talks to an Anthropic Messages-compatible endpoint, non-streaming. Each
//! call is a single system prompt plus one user turn; no conversation state
//! is kept server-side.

pub mod client;
pub mod error;
pub mod types;

pub use client::LlmClient;
pub use error::LlmError;
