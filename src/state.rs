use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;
use crate::uploads::UploadStore;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        let uploads = UploadStore::new(config.files.upload_dir.clone());
        Self {
            store,
            config: Arc::new(config),
            uploads,
        }
    }
}
