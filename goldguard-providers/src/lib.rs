//! # goldguard-providers
//!
//! Provider adapters for goldguard:
//!
//! - [`AnthropicProvider`]: text generation via the Anthropic messages API
//! - [`OpenAiProvider`]: chat completions and embeddings via the OpenAI API
//! - [`HashEmbedProvider`]: offline deterministic embeddings, no credentials
//!
//! Every adapter degrades gracefully without credentials, returning marked
//! placeholder text or hash-derived vectors instead of failing, so the
//! evaluation pipeline can run end to end on a machine with no API keys.
//!
//! ## Quick Start
//!
//! ```ignore
//! use goldguard_core::Registry;
//! use goldguard_providers::register_defaults;
//!
//! let mut registry = Registry::with_builtins();
//! register_defaults(&mut registry)?;
//! ```

pub mod anthropic;
pub mod hash;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use hash::HashEmbedProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;

use goldguard_core::Registry;
use goldguard_core::error::ConfigError;

/// Register the three bundled providers: `anthropic`, `openai`, `hash-embed`.
pub fn register_defaults(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register_provider(Arc::new(AnthropicProvider::new()))?;
    registry.register_provider(Arc::new(OpenAiProvider::new()))?;
    registry.register_provider(Arc::new(HashEmbedProvider))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldguard_core::PluginKind;

    #[test]
    fn register_defaults_installs_all_three_providers() {
        let mut registry = Registry::with_builtins();
        register_defaults(&mut registry).unwrap();

        assert_eq!(
            registry.list(PluginKind::Provider),
            vec!["anthropic", "hash-embed", "openai"]
        );
    }

    #[test]
    fn default_semantic_provider_is_registered() {
        let mut registry = Registry::new();
        register_defaults(&mut registry).unwrap();

        assert!(registry.provider("hash-embed").is_ok());
    }
}
