//! Deterministic translator for tests and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::{ProviderError, ProviderResult, Translator};

#[derive(Debug, Clone)]
pub enum MockMode {
    /// "hello" → "hello_tr"
    Suffix,

    /// (text, target_lang) → translation, falling back to `Suffix`.
    Mappings(HashMap<(String, String), String>),

    /// Every call fails with this message.
    Error(String),

    /// Calls for this target language fail, others behave like `Suffix`.
    FailFor(String),
}

pub struct MockTranslator {
    mode: MockMode,
    delay: Duration,
    calls: AtomicUsize,
    log: Mutex<Vec<(String, String, String)>>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, Duration::ZERO)
    }

    /// Simulates network latency on every call.
    pub fn with_delay(mode: MockMode, delay: Duration) -> Self {
        MockTranslator {
            mode,
            delay,
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(source_lang, target_lang, text)` of every call, in order.
    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.log.lock().clone()
    }
}

impl Translator for MockTranslator {
    fn translate(&self, source_lang: &str, target_lang: &str, text: &str) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push((
            source_lang.to_string(),
            target_lang.to_string(),
            text.to_string(),
        ));

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        match &self.mode {
            MockMode::Suffix => Ok(format!("{text}_{target_lang}")),
            MockMode::Mappings(map) => Ok(map
                .get(&(text.to_string(), target_lang.to_string()))
                .cloned()
                .unwrap_or_else(|| format!("{text}_{target_lang}"))),
            MockMode::Error(msg) => Err(ProviderError::Translation(msg.clone())),
            MockMode::FailFor(lang) if lang == target_lang => Err(ProviderError::Http {
                status: 503,
                message: format!("{lang} unavailable"),
            }),
            MockMode::FailFor(_) => Ok(format!("{text}_{target_lang}")),
        }
    }

    fn name(&self) -> &str {
        "Mock Translator"
    }
}
