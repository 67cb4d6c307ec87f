//! Provider module for nutrisage
//!
//! This module contains the language-model provider abstraction and the
//! OpenAI-compatible implementation.

pub mod base;
pub mod openai;

pub use base::{CompletionResponse, FunctionCall, Message, Provider, TokenUsage, ToolCall};
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::Result;

/// Create a provider instance based on configuration
///
/// # Errors
///
/// Returns error if the provider type is unknown or initialization fails
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match config.provider_type.as_str() {
        "openai" => Ok(Box::new(OpenAiProvider::new(config.openai.clone())?)),
        other => Err(crate::error::NutrisageError::Provider(format!(
            "Unknown provider type: {}",
            other
        ))
        .into()),
    }
}
