pub mod po;

use tracing::{debug, warn};

use crate::error::CoreResult;
use crate::model::fill::FillMap;
use crate::services::context::Context;

/// Translations of one locale, keyed by source string.
///
/// Callers mutating a catalog hold `locks.catalog(locale)` from `load` to `save`.
pub struct Catalog {
    ctx: Context,
    locale: String,
    entries: Vec<(String, String)>,
}

impl Catalog {
    pub fn load(ctx: &Context, locale: &str) -> CoreResult<Self> {
        let entries = load_entries(ctx, locale)?;
        Ok(Catalog {
            ctx: ctx.clone(),
            locale: locale.to_string(),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn has(&self, source: &str) -> bool {
        self.position(source).is_some()
    }

    /// Target text, or `""` when untranslated.
    pub fn get(&self, source: &str) -> String {
        self.position(source)
            .map(|i| self.entries[i].1.clone())
            .unwrap_or_default()
    }

    /// No-op when `source` already exists or `target` is empty.
    pub fn add(&mut self, source: &str, target: &str) {
        if target.is_empty() || self.has(source) {
            return;
        }
        self.entries.push((source.to_string(), target.to_string()));
    }

    /// Replaces the pair for `source`. A `None` target keeps the previous one,
    /// a `new_source` renames the key, and an empty result removes the pair.
    pub fn edit(&mut self, source: &str, target: Option<&str>, new_source: Option<&str>) {
        let target = match target {
            Some(t) => t.to_string(),
            None => self.get(source),
        };

        self.delete(source);

        if !target.is_empty() {
            self.add(new_source.unwrap_or(source), &target);
        }
    }

    pub fn delete(&mut self, source: &str) {
        if let Some(i) = self.position(source) {
            self.entries.remove(i);
        }
    }

    /// Rewrites the whole document, or removes it once the catalog is empty.
    pub fn save(&self) -> CoreResult<()> {
        let name = document_name(&self.ctx, &self.locale);

        if self.entries.is_empty() {
            self.ctx.storage.delete(&name)?;
            debug!(locale = %self.locale, "catalog emptied, document removed");
            return Ok(());
        }

        let text = po::generate(&self.locale, &self.ctx.settings.domain, &self.entries);
        self.ctx.storage.write(&name, &text)?;
        debug!(locale = %self.locale, entries = self.entries.len(), "catalog saved");
        Ok(())
    }

    /// Source string → accepted locales holding a non-empty translation,
    /// in accepted-locale order.
    pub fn all_translates(ctx: &Context) -> CoreResult<FillMap> {
        let mut map = FillMap::default();

        for locale in ctx.accepted_locales() {
            for (source, _) in load_entries(ctx, locale)? {
                map.push_locale(&source, locale);
            }
        }

        Ok(map)
    }

    /// Removes every catalog document of the domain, accepted locale or not.
    pub fn delete_all(ctx: &Context) -> CoreResult<()> {
        let prefix = format!("{}-", ctx.settings.domain);

        for name in ctx.storage.list()? {
            let Some(locale) = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(".po"))
            else {
                continue;
            };
            let _guard = ctx.locks.catalog(locale);
            ctx.storage.delete(&name)?;
        }

        Ok(())
    }

    fn position(&self, source: &str) -> Option<usize> {
        self.entries.iter().position(|(s, _)| s == source)
    }
}

pub fn document_name(ctx: &Context, locale: &str) -> String {
    format!("{}-{}.po", ctx.settings.domain, locale)
}

fn load_entries(ctx: &Context, locale: &str) -> CoreResult<Vec<(String, String)>> {
    let name = document_name(ctx, locale);

    let Some(text) = ctx.storage.read(&name)? else {
        return Ok(Vec::new());
    };

    match po::parse(&text) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            warn!(document = %name, "unreadable catalog, treating as empty: {e}");
            Ok(Vec::new())
        }
    }
}
