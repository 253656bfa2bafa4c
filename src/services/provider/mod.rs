pub mod chat;
pub mod google;
mod http;
pub mod mock;

use std::sync::Arc;
use thiserror::Error;

use crate::model::settings::Settings;

pub use chat::ChatTranslator;
pub use google::GoogleTranslate;
pub use mock::{MockMode, MockTranslator};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider config error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("translation failed: {0}")]
    Translation(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// External machine translation. Calls block; errors are per call.
pub trait Translator: Send + Sync {
    /// `source_lang` and `target_lang` are bare language codes such as `en`.
    fn translate(&self, source_lang: &str, target_lang: &str, text: &str) -> ProviderResult<String>;

    fn name(&self) -> &str;
}

pub fn from_settings(settings: &Settings) -> ProviderResult<Arc<dyn Translator>> {
    match settings.provider.as_str() {
        "google" => Ok(Arc::new(GoogleTranslate::new()?)),
        "openai" | "deepseek" => Ok(Arc::new(ChatTranslator::new(
            &settings.provider,
            &settings.api_key,
            &settings.model,
        )?)),
        "mock" => Ok(Arc::new(MockTranslator::new(MockMode::Suffix))),
        other => Err(ProviderError::Config(format!("unsupported provider `{other}`"))),
    }
}
