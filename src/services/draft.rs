use tracing::{debug, warn};

use crate::error::CoreResult;
use crate::services::context::Context;

/// Source strings awaiting their first translation, in discovery order.
///
/// Callers mutating the draft set hold `locks.draft()` from `load` to `save`.
pub struct DraftStore {
    ctx: Context,
    data: Vec<String>,
}

impl DraftStore {
    pub fn load(ctx: &Context) -> CoreResult<Self> {
        Ok(DraftStore {
            ctx: ctx.clone(),
            data: Self::all(ctx)?,
        })
    }

    pub fn texts(&self) -> &[String] {
        &self.data
    }

    pub fn has(&self, source: &str) -> bool {
        self.data.iter().any(|s| s == source)
    }

    pub fn add(&mut self, source: &str) {
        if !self.has(source) {
            self.data.push(source.to_string());
        }
    }

    /// Renames in place. Collapses into the existing entry if `new_source` is
    /// already a draft.
    pub fn edit(&mut self, source: &str, new_source: &str) {
        let Some(i) = self.data.iter().position(|s| s == source) else {
            return;
        };

        if source != new_source && self.has(new_source) {
            self.data.remove(i);
        } else {
            self.data[i] = new_source.to_string();
        }
    }

    pub fn delete(&mut self, source: &str) {
        self.data.retain(|s| s != source);
    }

    /// Rewrites the document, or removes it when the set is empty.
    pub fn save(&self) -> CoreResult<()> {
        if self.data.is_empty() {
            return Self::delete_all(&self.ctx);
        }

        let json = serde_json::to_string_pretty(&self.data)?;
        self.ctx.storage.write(&document_name(&self.ctx), &json)?;
        debug!(drafts = self.data.len(), "draft set saved");
        Ok(())
    }

    pub fn all(ctx: &Context) -> CoreResult<Vec<String>> {
        let name = document_name(ctx);

        let Some(data) = ctx.storage.read(&name)? else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<String> = match serde_json::from_str(&data) {
            Ok(v) => v,
            Err(e) => {
                warn!(document = %name, "unreadable draft set, treating as empty: {e}");
                return Ok(Vec::new());
            }
        };

        let mut seen = std::collections::HashSet::new();
        entries.retain(|s| seen.insert(s.clone()));
        Ok(entries)
    }

    pub fn delete_all(ctx: &Context) -> CoreResult<()> {
        ctx.storage.delete(&document_name(ctx))
    }
}

pub fn document_name(ctx: &Context) -> String {
    format!("{}-draft.json", ctx.settings.domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::context::testing::context;
    use crate::services::storage::Storage;

    #[test]
    fn add_is_deduplicated() {
        let (ctx, _) = context(&["en_US"]);
        let mut draft = DraftStore::load(&ctx).unwrap();
        draft.add("Hello");
        draft.add("Hello");
        draft.add("Bye");
        assert_eq!(draft.texts(), &["Hello", "Bye"]);
    }

    #[test]
    fn edit_renames_in_place() {
        let (ctx, _) = context(&["en_US"]);
        let mut draft = DraftStore::load(&ctx).unwrap();
        draft.add("a");
        draft.add("b");
        draft.add("c");

        draft.edit("b", "B");
        assert_eq!(draft.texts(), &["a", "B", "c"]);

        draft.edit("missing", "x");
        assert_eq!(draft.texts(), &["a", "B", "c"]);

        draft.edit("a", "c");
        assert_eq!(draft.texts(), &["B", "c"]);
    }

    #[test]
    fn save_and_reload() {
        let (ctx, _) = context(&["en_US"]);
        let mut draft = DraftStore::load(&ctx).unwrap();
        draft.add("Hello");
        draft.add("Add to cart");
        draft.save().unwrap();

        assert_eq!(DraftStore::all(&ctx).unwrap(), vec!["Hello", "Add to cart"]);
    }

    #[test]
    fn saving_empty_set_removes_document() {
        let (ctx, storage) = context(&["en_US"]);
        let mut draft = DraftStore::load(&ctx).unwrap();
        draft.add("Hello");
        draft.save().unwrap();
        assert!(storage.read(&document_name(&ctx)).unwrap().is_some());

        draft.delete("Hello");
        draft.save().unwrap();
        assert!(storage.read(&document_name(&ctx)).unwrap().is_none());
    }

    #[test]
    fn corrupt_document_reads_as_empty() {
        let (ctx, storage) = context(&["en_US"]);
        storage.write(&document_name(&ctx), "{not json").unwrap();
        assert!(DraftStore::all(&ctx).unwrap().is_empty());
    }
}
