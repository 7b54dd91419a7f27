//! Language model access.
//!
//! The rest of the crate only sees [`LanguageModel`]; the OpenRouter client
//! is one implementation of it and tests use in-process fakes.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::CompletionError;

pub mod openrouter;

pub use openrouter::OpenRouterModel;

#[async_trait]
pub trait LanguageModel: Send + Sync + Debug {
    /// Single-turn completion of `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    fn model(&self) -> &str;
}
