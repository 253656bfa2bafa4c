use std::sync::Arc;

use crate::model::settings::Settings;
use crate::services::locks::WriteLocks;
use crate::services::storage::Storage;

/// Handles shared by every component, passed in at construction.
#[derive(Clone)]
pub struct Context {
    pub storage: Arc<dyn Storage>,
    pub settings: Arc<Settings>,
    pub locks: Arc<WriteLocks>,
}

impl Context {
    pub fn new(storage: Arc<dyn Storage>, settings: Settings) -> Self {
        Context {
            storage,
            settings: Arc::new(settings),
            locks: Arc::new(WriteLocks::new()),
        }
    }

    pub fn accepted_locales(&self) -> &[String] {
        &self.settings.accepted_locales
    }
}
