use std::sync::Arc;
use tokio::sync::watch;

use crate::dashboard::Dashboard;

use super::api::proxy::ProxyTarget;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub proxy: Arc<ProxyTarget>,
    /// Flips to `true` once the server starts shutting down.
    pub shutdown: watch::Receiver<bool>,
}
