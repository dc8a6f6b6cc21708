use std::sync::Arc;

use crate::config::Config;
use crate::dashboard::DashboardHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dashboard: DashboardHandle,
}

impl AppState {
    pub fn new(config: Config, dashboard: DashboardHandle) -> Self {
        Self {
            config: Arc::new(config),
            dashboard,
        }
    }
}
