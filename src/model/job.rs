use serde::{Deserialize, Serialize};

fn default_only_draft() -> bool {
    true
}

/// Persisted auto-translate configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AutoTranslateData {
    #[serde(default = "default_only_draft")]
    pub only_draft: bool,

    /// Empty means every accepted locale.
    #[serde(default)]
    pub selected_locales: Vec<String>,

    #[serde(default)]
    pub is_translating: bool,
}

impl Default for AutoTranslateData {
    fn default() -> Self {
        AutoTranslateData {
            only_draft: default_only_draft(),
            selected_locales: Vec::new(),
            is_translating: false,
        }
    }
}

/// Progress of the running job. Absent when no job has run or it was cleared.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TranslatingStatus {
    pub size_target_translates: usize,
    pub size_translated_translates: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum SizeReport {
    Active {
        translated_translates: usize,
        target_translates: usize,
    },
    Empty {},
}

/// Shape polled by the UI.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub is_translating: bool,
    pub size: SizeReport,
}

impl StatusReport {
    pub fn new(is_translating: bool, status: Option<TranslatingStatus>) -> Self {
        let size = match status {
            Some(s) => SizeReport::Active {
                translated_translates: s.size_translated_translates,
                target_translates: s.size_target_translates,
            },
            None => SizeReport::Empty {},
        };
        StatusReport {
            is_translating,
            size,
        }
    }
}
