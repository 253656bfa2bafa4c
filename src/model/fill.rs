use serde::Serialize;
use std::collections::HashMap;

/// Translation coverage of one source string across the accepted locales.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FillState {
    Empty,
    HalfFilled,
    Filled,
}

impl FillState {
    pub fn classify(filled_locales: &[String], accepted_locales: &[String]) -> Self {
        let filled = accepted_locales
            .iter()
            .filter(|l| filled_locales.contains(l))
            .count();

        if filled == 0 {
            FillState::Empty
        } else if filled == accepted_locales.len() {
            FillState::Filled
        } else {
            FillState::HalfFilled
        }
    }
}

/// Insertion-ordered map of source string → locales holding a translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillMap {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl FillMap {
    pub fn get(&self, source: &str) -> Option<&[String]> {
        self.index
            .get(source)
            .map(|&i| self.entries[i].1.as_slice())
    }

    /// True iff at least one locale holds a translation for `source`.
    pub fn is_committed(&self, source: &str) -> bool {
        self.get(source).is_some_and(|l| !l.is_empty())
    }

    pub fn push_locale(&mut self, source: &str, locale: &str) {
        let i = self.slot(source);
        self.entries[i].1.push(locale.to_string());
    }

    /// Adds `source` with no locales unless it is already present.
    pub fn insert_empty(&mut self, source: &str) {
        self.slot(source);
    }

    /// Replaces the locales of `source`, keeping its original position.
    pub fn set(&mut self, source: String, locales: Vec<String>) {
        let i = self.slot(&source);
        self.entries[i].1 = locales;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<(String, Vec<String>)> {
        self.entries
    }

    fn slot(&mut self, source: &str) -> usize {
        if let Some(&i) = self.index.get(source) {
            return i;
        }
        self.entries.push((source.to_string(), Vec::new()));
        let i = self.entries.len() - 1;
        self.index.insert(source.to_string(), i);
        i
    }
}
