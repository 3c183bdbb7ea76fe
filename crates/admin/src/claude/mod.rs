//! Claude API integration for product suggestions.
//!
//! The admin asks Claude which catalog products to recommend to the buyer
//! of a sale. [`LanguageModel`] is the seam between the suggestion logic
//! and the HTTP client so tests can script replies.

mod client;
mod error;
pub mod suggestions;
pub mod types;

use async_trait::async_trait;

pub use client::ClaudeClient;
pub use error::ClaudeError;
pub use suggestions::{MAX_SUGGESTIONS, Suggestion, suggest_products};

/// A single-turn text completion.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send one user prompt with a system prompt and return the reply text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ClaudeError>;
}
