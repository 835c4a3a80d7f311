use crate::bolna::CallSource;
use crate::extract::Extractor;
use crate::msg91::Messenger;
use crate::store::CallStore;

use std::sync::Arc;

/// Shared handles for every entry point. Constructed once at startup and
/// passed by reference; nothing is looked up globally.
pub struct AppState {
    pub store: Arc<dyn CallStore>,
    pub source: Arc<dyn CallSource>,
    pub extractor: Arc<dyn Extractor>,
    pub messenger: Arc<dyn Messenger>,
}
