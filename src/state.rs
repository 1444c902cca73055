//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{LinkService, QuotaService};
use crate::config::Config;
use crate::domain::repositories::Keyspaces;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub quota_service: Arc<QuotaService>,
    pub keyspaces: Keyspaces,
    /// Trust forwarding headers when identifying clients.
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires the services on top of `keyspaces` using the quota, expiry and
    /// domain settings from `config`.
    pub fn new(keyspaces: Keyspaces, config: &Config) -> Self {
        let quota_service = Arc::new(QuotaService::new(
            keyspaces.quotas.clone(),
            config.api_quota,
            config.quota_window(),
        ));

        let link_service = Arc::new(LinkService::new(
            keyspaces.clone(),
            quota_service.clone(),
            config.domain.clone(),
            config.default_expiry(),
        ));

        Self {
            link_service,
            quota_service,
            keyspaces,
            behind_proxy: config.behind_proxy,
        }
    }
}
