use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::model::edit::{sanitize_text, BatchRequest, EditBatch};
use crate::model::fill::{FillMap, FillState};
use crate::services::catalog::Catalog;
use crate::services::context::Context;
use crate::services::draft::DraftStore;

pub const ITEMS_PER_PAGE: usize = 16;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct LanguageItem {
    pub default_text: String,
    pub locales: Vec<String>,
    pub fill_state: FillState,
}

/// Applies admin edits to the catalogs and the draft set.
pub struct Coordinator {
    ctx: Context,
}

impl Coordinator {
    pub fn new(ctx: Context) -> Self {
        Coordinator { ctx }
    }

    pub fn apply(&self, request: &BatchRequest) -> CoreResult<()> {
        match request {
            BatchRequest::RemoveAll => self.remove_all(),
            BatchRequest::Apply(batch) => self.apply_batch(batch),
        }
    }

    pub fn remove_all(&self) -> CoreResult<()> {
        Catalog::delete_all(&self.ctx)?;
        let _guard = self.ctx.locks.draft();
        DraftStore::delete_all(&self.ctx)?;
        info!("all translations and drafts removed");
        Ok(())
    }

    /// Locales are processed in accepted order and each is saved before the
    /// next starts, so later locales see what earlier ones committed. There is
    /// no rollback across locales.
    pub fn apply_batch(&self, batch: &EditBatch) -> CoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        for locale in self.ctx.accepted_locales() {
            let _catalog_guard = self.ctx.locks.catalog(locale);
            let _draft_guard = self.ctx.locks.draft();

            let committed = Catalog::all_translates(&self.ctx)?;
            let mut catalog = Catalog::load(&self.ctx, locale)?;
            let mut draft = DraftStore::load(&self.ctx)?;

            apply_to_locale(locale, batch, &committed, &mut catalog, &mut draft);

            catalog.save()?;
            draft.save()?;
            debug!(%locale, catalog = catalog.len(), drafts = draft.texts().len(), "locale batch applied");
        }

        info!(
            removed = batch.removed_items.len(),
            changed = batch.changed_items.len(),
            "translation batch applied"
        );
        Ok(())
    }

    /// Drafts and committed strings ordered by ascending fill count.
    /// Pages start at 1; `0` is treated as the first page.
    pub fn language_items(&self, page: usize) -> CoreResult<Vec<LanguageItem>> {
        let page = page.max(1);

        let mut entries = merged_translates(&self.ctx, true)?.into_entries();
        entries.sort_by_key(|(_, locales)| locales.len());

        let accepted = self.ctx.accepted_locales();
        Ok(entries
            .into_iter()
            .skip((page - 1).saturating_mul(ITEMS_PER_PAGE))
            .take(ITEMS_PER_PAGE)
            .map(|(default_text, locales)| LanguageItem {
                fill_state: FillState::classify(&locales, accepted),
                default_text,
                locales,
            })
            .collect())
    }

    pub fn language_text(&self, locale: &str, source: &str) -> CoreResult<String> {
        if !self.ctx.settings.is_accepted(locale) {
            return Err(CoreError::validation(format!("unknown locale `{locale}`")));
        }
        Ok(Catalog::load(&self.ctx, locale)?.get(&sanitize_text(source)))
    }
}

/// Drafts with no filled locales, followed by committed strings. A committed
/// entry replaces a draft of the same text in place.
pub fn merged_translates(ctx: &Context, include_committed: bool) -> CoreResult<FillMap> {
    let mut merged = FillMap::default();
    for source in DraftStore::all(ctx)? {
        merged.insert_empty(&source);
    }
    if include_committed {
        for (source, locales) in Catalog::all_translates(ctx)?.into_entries() {
            merged.set(source, locales);
        }
    }
    Ok(merged)
}

/// One locale's pass over a batch, entirely in memory. `committed` is the
/// cross-locale fill map as persisted before this pass.
fn apply_to_locale(
    locale: &str,
    batch: &EditBatch,
    committed: &FillMap,
    catalog: &mut Catalog,
    draft: &mut DraftStore,
) {
    for source in &batch.removed_items {
        if draft.has(source) {
            draft.delete(source);
            continue;
        }
        if catalog.has(source) {
            catalog.delete(source);
        }
    }

    for (source, item) in &batch.changed_items {
        let is_draft = !item.has_targets() && !committed.is_committed(source);

        if is_draft {
            catalog.delete(source);
            match item.new_text() {
                Some(new_text) => draft.edit(source, new_text),
                None => draft.add(source),
            }
            continue;
        }

        if item.removes_target(locale) {
            catalog.delete(source);
            continue;
        }

        let is_new_translate = item.is_new() || !catalog.has(source);

        if is_new_translate {
            let Some(target) = item.target(locale) else {
                continue;
            };
            draft.delete(source);
            catalog.add(item.new_text().unwrap_or(source), target);
        } else {
            catalog.edit(source, item.target(locale), item.new_text());
        }
    }
}
