use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_DOMAIN: &str = "mobile-app-language";
pub const DEFAULT_TRANSLATE_DELAY_MS: u64 = 1000;

fn default_data_dir() -> PathBuf {
    if let Some(local) = dirs::data_local_dir() {
        return local.join("PolyglotCore");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("PolyglotCore")
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_source_locale() -> String {
    "en_US".to_string()
}

fn default_provider() -> String {
    "google".to_string()
}

fn default_translate_delay_ms() -> u64 {
    DEFAULT_TRANSLATE_DELAY_MS
}

/// Runtime configuration shared by every component.
#[derive(Serialize, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Prefix of every catalog and draft document name.
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Ordered universe of target locales, e.g. `["en_US", "tr_TR"]`.
    #[serde(default)]
    pub accepted_locales: Vec<String>,

    /// Locale the source strings are written in.
    #[serde(default = "default_source_locale")]
    pub source_locale: String,

    /// One of `google`, `openai`, `deepseek`, `mock`.
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub model: String,

    /// Pause after every successful provider call.
    #[serde(default = "default_translate_delay_ms")]
    pub translate_delay_ms: u64,

    #[serde(default)]
    pub admin_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: default_data_dir(),
            domain: default_domain(),
            accepted_locales: Vec::new(),
            source_locale: default_source_locale(),
            provider: default_provider(),
            api_key: String::new(),
            model: String::new(),
            translate_delay_ms: default_translate_delay_ms(),
            admin_token: None,
        }
    }
}

impl Settings {
    pub fn is_accepted(&self, locale: &str) -> bool {
        self.accepted_locales.iter().any(|l| l == locale)
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("data_dir", &self.data_dir)
            .field("domain", &self.domain)
            .field("accepted_locales", &self.accepted_locales)
            .field("source_locale", &self.source_locale)
            .field("provider", &self.provider)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("translate_delay_ms", &self.translate_delay_ms)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Language part of a locale identifier: `tr_TR` → `tr`.
pub fn language_code(locale: &str) -> &str {
    locale.split('_').next().unwrap_or(locale)
}
