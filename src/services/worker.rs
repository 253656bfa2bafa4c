use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::CoreResult;
use crate::model::job::TranslatingStatus;
use crate::model::settings::language_code;
use crate::services::auto_translate::AutoTranslate;
use crate::services::catalog::Catalog;
use crate::services::context::Context;
use crate::services::coordinator::merged_translates;
use crate::services::draft::DraftStore;
use crate::services::provider::Translator;
use crate::services::scheduler::CancelToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerReport {
    /// Strings fully processed by this run.
    pub translated: usize,
    /// Progress target at the end of the run, including resumed work.
    pub target: usize,
    /// Provider calls that failed and were skipped.
    pub failures: usize,
    pub cancelled: bool,
}

/// Translates pending strings one locale at a time until done or stopped.
pub struct Worker {
    ctx: Context,
    job: AutoTranslate,
    translator: Arc<dyn Translator>,
    token: CancelToken,
}

impl Worker {
    pub fn new(ctx: Context, translator: Arc<dyn Translator>, token: CancelToken) -> Self {
        Worker {
            job: AutoTranslate::new(ctx.clone()),
            ctx,
            translator,
            token,
        }
    }

    /// Always leaves the job idle with its progress cleared, whatever the outcome.
    pub fn run(&self) -> CoreResult<WorkerReport> {
        let outcome = self.translate_pending();
        let finished = self.job.finish();

        let report = outcome?;
        finished?;

        info!(
            translated = report.translated,
            target = report.target,
            failures = report.failures,
            cancelled = report.cancelled,
            "auto-translate finished"
        );
        Ok(report)
    }

    fn translate_pending(&self) -> CoreResult<WorkerReport> {
        let data = self.job.get_data()?;

        let target_locales: Vec<String> = if data.selected_locales.is_empty() {
            self.ctx.accepted_locales().to_vec()
        } else {
            data.selected_locales.clone()
        };

        let pending: Vec<(String, Vec<String>)> = merged_translates(&self.ctx, !data.only_draft)?
            .into_entries()
            .into_iter()
            .filter(|(_, filled)| !target_locales.iter().all(|l| filled.contains(l)))
            .collect();

        let mut status = match self.job.get_status()? {
            Some(stored) => TranslatingStatus {
                size_target_translates: stored
                    .size_target_translates
                    .max(stored.size_translated_translates + pending.len()),
                size_translated_translates: stored.size_translated_translates,
            },
            None => TranslatingStatus {
                size_target_translates: pending.len(),
                size_translated_translates: 0,
            },
        };

        let mut report = WorkerReport {
            target: status.size_target_translates,
            ..WorkerReport::default()
        };

        if !self.should_continue()? {
            report.cancelled = true;
            return Ok(report);
        }
        self.job.set_status(Some(status))?;

        info!(
            pending = pending.len(),
            locales = target_locales.len(),
            only_draft = data.only_draft,
            "auto-translate pass begins"
        );

        let source_lang = language_code(&self.ctx.settings.source_locale);
        let delay = Duration::from_millis(self.ctx.settings.translate_delay_ms);

        'strings: for (source, filled) in &pending {
            if !self.should_continue()? {
                report.cancelled = true;
                break;
            }

            let remaining = target_locales.iter().filter(|l| !filled.contains(l));

            for locale in remaining {
                if !self.should_continue()? {
                    report.cancelled = true;
                    break 'strings;
                }

                let result = self
                    .translator
                    .translate(source_lang, language_code(locale), source);

                if !self.should_continue()? {
                    report.cancelled = true;
                    break 'strings;
                }

                match result {
                    Ok(text) if text.is_empty() => {
                        debug!(%locale, %source, "provider returned nothing, skipping");
                    }
                    Ok(text) => {
                        self.update_translate(locale, source, &text)?;
                        debug!(%locale, %source, "translated");

                        if !delay.is_zero() && self.token.sleep(delay) {
                            report.cancelled = true;
                            break 'strings;
                        }
                    }
                    Err(e) => {
                        report.failures += 1;
                        warn!(
                            %locale,
                            %source,
                            provider = self.translator.name(),
                            "translation failed, skipping: {e}"
                        );
                    }
                }
            }

            status.size_translated_translates =
                (status.size_translated_translates + 1).min(status.size_target_translates);
            report.translated += 1;
            self.job.set_status(Some(status))?;
        }

        Ok(report)
    }

    /// Commits `text` for `locale` and promotes `source` out of the draft set.
    pub fn update_translate(&self, locale: &str, source: &str, text: &str) -> CoreResult<()> {
        let _catalog_guard = self.ctx.locks.catalog(locale);
        let mut catalog = Catalog::load(&self.ctx, locale)?;
        catalog.edit(source, Some(text), None);
        catalog.save()?;

        let _draft_guard = self.ctx.locks.draft();
        let mut draft = DraftStore::load(&self.ctx)?;
        if draft.has(source) {
            draft.delete(source);
            draft.save()?;
        }
        Ok(())
    }

    fn should_continue(&self) -> CoreResult<bool> {
        Ok(!self.token.is_cancelled() && self.job.is_running()?)
    }
}
