use std::sync::Arc;

use crate::{
    config::AppConfig,
    services::{HealthChecker, HealthMonitor, SyncService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sync: Arc<SyncService>,
    pub checker: Arc<HealthChecker>,
    pub monitor: Arc<HealthMonitor>,
}

#[allow(dead_code)]
fn _assert_state_bounds() {
    fn assert_bounds<T: Clone + Send + Sync + 'static>() {}
    assert_bounds::<AppState>();
}
