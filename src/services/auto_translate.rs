use std::sync::Arc;
use std::thread::JoinHandle;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::{CoreError, CoreResult};
use crate::model::job::{AutoTranslateData, StatusReport, TranslatingStatus};
use crate::services::context::Context;
use crate::services::coordinator::merged_translates;
use crate::services::provider::Translator;
use crate::services::scheduler::JobScheduler;
use crate::services::worker::Worker;

pub const JOB_NAME: &str = "translate";
pub const DATA_DOCUMENT: &str = "auto-translate.json";
pub const STATUS_DOCUMENT: &str = "auto-translate-status.json";

/// Persisted state of the background translation job.
///
/// Every getter reads storage, so values written by the worker thread are
/// visible immediately.
#[derive(Clone)]
pub struct AutoTranslate {
    ctx: Context,
}

impl AutoTranslate {
    pub fn new(ctx: Context) -> Self {
        AutoTranslate { ctx }
    }

    pub fn get_data(&self) -> CoreResult<AutoTranslateData> {
        Ok(self.read_document(DATA_DOCUMENT)?.unwrap_or_default())
    }

    pub fn save_data(&self, data: &AutoTranslateData) -> CoreResult<()> {
        let _guard = self.ctx.locks.job();
        self.write_data(data)
    }

    pub fn is_running(&self) -> CoreResult<bool> {
        Ok(self.get_data()?.is_translating)
    }

    pub fn set_translating(&self, is_translating: bool) -> CoreResult<()> {
        let _guard = self.ctx.locks.job();
        let mut data = self.get_data()?;
        data.is_translating = is_translating;
        self.write_data(&data)
    }

    pub fn get_status(&self) -> CoreResult<Option<TranslatingStatus>> {
        self.read_document(STATUS_DOCUMENT)
    }

    /// `None` clears the progress record.
    pub fn set_status(&self, status: Option<TranslatingStatus>) -> CoreResult<()> {
        match status {
            Some(s) => {
                let json = serde_json::to_string_pretty(&s)?;
                self.ctx.storage.write(STATUS_DOCUMENT, &json)
            }
            None => self.ctx.storage.delete(STATUS_DOCUMENT),
        }
    }

    pub fn status_report(&self) -> CoreResult<StatusReport> {
        Ok(StatusReport::new(self.is_running()?, self.get_status()?))
    }

    /// Persists the job config and launches the worker thread.
    ///
    /// Empty `selected_locales` targets every accepted locale.
    pub fn start(
        &self,
        scheduler: &JobScheduler,
        translator: Arc<dyn Translator>,
        only_draft: bool,
        selected_locales: Vec<String>,
    ) -> CoreResult<JoinHandle<()>> {
        if let Some(unknown) = selected_locales
            .iter()
            .find(|l| !self.ctx.settings.is_accepted(l))
        {
            return Err(CoreError::validation(format!(
                "unknown locale `{unknown}` in selected_locales"
            )));
        }

        if merged_translates(&self.ctx, true)?.is_empty() {
            return Err(CoreError::validation("there is nothing to translate"));
        }

        let lease = scheduler.lease(JOB_NAME)?;

        self.save_data(&AutoTranslateData {
            only_draft,
            selected_locales,
            is_translating: true,
        })?;
        info!(only_draft, provider = translator.name(), "auto-translate started");

        let ctx = self.ctx.clone();
        lease.spawn(move |token| {
            if let Err(e) = Worker::new(ctx, translator, token).run() {
                warn!("auto-translate job failed: {e}");
            }
        })
    }

    /// Cancels the worker of this process, if any, and finalizes the job.
    pub fn stop(&self, scheduler: &JobScheduler) -> CoreResult<()> {
        scheduler.cancel(JOB_NAME);
        self.finish()?;
        info!("auto-translate stopped");
        Ok(())
    }

    /// Marks the job idle and clears its progress.
    pub fn finish(&self) -> CoreResult<()> {
        self.set_translating(false)?;
        self.set_status(None)
    }

    fn write_data(&self, data: &AutoTranslateData) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(data)?;
        self.ctx.storage.write(DATA_DOCUMENT, &json)
    }

    fn read_document<T: DeserializeOwned>(&self, name: &str) -> CoreResult<Option<T>> {
        let Some(text) = self.ctx.storage.read(name)? else {
            return Ok(None);
        };

        match serde_json::from_str(&text) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!(document = name, "unreadable job document, using defaults: {e}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::Catalog;
    use crate::services::context::testing;
    use crate::services::draft::DraftStore;
    use crate::services::provider::{MockMode, MockTranslator};
    use crate::services::storage::Storage;

    fn seed_draft(ctx: &Context, sources: &[&str]) {
        let mut draft = DraftStore::load(ctx).unwrap();
        for s in sources {
            draft.add(s);
        }
        draft.save().unwrap();
    }

    fn mock() -> Arc<dyn Translator> {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    }

    #[test]
    fn defaults_before_first_save() {
        let (ctx, _) = testing::context(&["en_US", "tr_TR"]);
        let job = AutoTranslate::new(ctx);

        assert_eq!(job.get_data().unwrap(), AutoTranslateData::default());
        assert!(!job.is_running().unwrap());
        assert_eq!(job.get_status().unwrap(), None);
        assert_eq!(
            job.status_report().unwrap(),
            StatusReport::new(false, None)
        );
    }

    #[test]
    fn status_record_round_trip_and_clear() {
        let (ctx, storage) = testing::context(&["en_US"]);
        let job = AutoTranslate::new(ctx);
        let status = TranslatingStatus {
            size_target_translates: 3,
            size_translated_translates: 1,
        };

        job.set_status(Some(status)).unwrap();
        assert_eq!(job.get_status().unwrap(), Some(status));

        job.set_status(None).unwrap();
        assert_eq!(job.get_status().unwrap(), None);
        assert!(storage.read(STATUS_DOCUMENT).unwrap().is_none());
    }

    #[test]
    fn corrupt_config_reads_as_defaults() {
        let (ctx, storage) = testing::context(&["en_US"]);
        storage.write(DATA_DOCUMENT, "{ nope").unwrap();
        let job = AutoTranslate::new(ctx);
        assert_eq!(job.get_data().unwrap(), AutoTranslateData::default());
    }

    #[test]
    fn start_runs_the_worker_to_completion() {
        let (ctx, _) = testing::context(&["en_US", "tr_TR"]);
        seed_draft(&ctx, &["Hello"]);
        let scheduler = JobScheduler::new();
        let job = AutoTranslate::new(ctx.clone());

        let handle = job.start(&scheduler, mock(), true, Vec::new()).unwrap();
        handle.join().unwrap();

        assert!(!job.is_running().unwrap());
        assert_eq!(job.get_status().unwrap(), None);
        assert!(!scheduler.is_active(JOB_NAME));
        assert_eq!(Catalog::load(&ctx, "tr_TR").unwrap().get("Hello"), "Hello_tr");
        assert!(DraftStore::all(&ctx).unwrap().is_empty());
    }

    #[test]
    fn start_rejects_unknown_locale_without_persisting() {
        let (ctx, storage) = testing::context(&["en_US", "tr_TR"]);
        seed_draft(&ctx, &["Hello"]);
        let scheduler = JobScheduler::new();
        let job = AutoTranslate::new(ctx);

        let err = job
            .start(&scheduler, mock(), true, vec!["de_DE".into()])
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(storage.read(DATA_DOCUMENT).unwrap().is_none());
        assert!(!scheduler.is_active(JOB_NAME));
    }

    #[test]
    fn start_rejects_when_nothing_to_translate() {
        let (ctx, _) = testing::context(&["en_US", "tr_TR"]);
        let scheduler = JobScheduler::new();
        let job = AutoTranslate::new(ctx);

        assert!(matches!(
            job.start(&scheduler, mock(), true, Vec::new()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn second_start_is_refused_while_active() {
        let (ctx, _) = testing::context(&["en_US", "tr_TR"]);
        seed_draft(&ctx, &["Hello"]);
        let scheduler = JobScheduler::new();
        let job = AutoTranslate::new(ctx);

        // Holding the lease stands in for a worker that is still running.
        let lease = scheduler.lease(JOB_NAME).unwrap();
        assert!(matches!(
            job.start(&scheduler, mock(), true, Vec::new()),
            Err(CoreError::JobAlreadyRunning(_))
        ));
        assert!(!job.is_running().unwrap());
        drop(lease);
    }

    #[test]
    fn stop_without_worker_clears_stale_state() {
        let (ctx, _) = testing::context(&["en_US"]);
        let job = AutoTranslate::new(ctx);
        job.save_data(&AutoTranslateData {
            is_translating: true,
            ..AutoTranslateData::default()
        })
        .unwrap();
        job.set_status(Some(TranslatingStatus {
            size_target_translates: 2,
            size_translated_translates: 1,
        }))
        .unwrap();

        job.stop(&JobScheduler::new()).unwrap();
        assert_eq!(job.status_report().unwrap(), StatusReport::new(false, None));
    }
}
