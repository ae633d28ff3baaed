use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{ActionSource, IncidentTracker};

/// Everything one run needs, built at start and dropped at exit.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub action_source: Arc<dyn ActionSource>,
    pub incident_tracker: Arc<dyn IncidentTracker>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        action_source: Arc<dyn ActionSource>,
        incident_tracker: Arc<dyn IncidentTracker>,
    ) -> Self {
        Self {
            config,
            action_source,
            incident_tracker,
        }
    }
}
