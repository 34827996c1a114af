// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of the client stack for one command invocation.

use std::sync::Arc;

use kitsu_client::{ApiClient, AuthService, CatalogService, DashboardService, SessionStore};
use kitsu_config::KitsuConfig;
use kitsu_core::{CredentialStore, KitsuError, Navigator};
use kitsu_telemetry::TelemetryChannel;

use crate::navigator::CliNavigator;

/// Everything a command needs, built once at startup and passed down.
pub struct App {
    pub config: KitsuConfig,
    pub credentials: Arc<dyn CredentialStore>,
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub dashboard: DashboardService,
    pub session: SessionStore,
    pub use_color: bool,
}

impl App {
    /// Build the stack with the on-disk credential store.
    pub fn new(config: KitsuConfig, location: &str, use_color: bool) -> Result<Self, KitsuError> {
        let credentials = kitsu_credentials::open_store(&config.credentials);
        Self::with_credentials(config, credentials, location, use_color)
    }

    pub fn with_credentials(
        config: KitsuConfig,
        credentials: Arc<dyn CredentialStore>,
        location: &str,
        use_color: bool,
    ) -> Result<Self, KitsuError> {
        let navigator: Arc<dyn Navigator> = Arc::new(CliNavigator::at(location, use_color));
        let client = Arc::new(ApiClient::new(
            &config.api,
            Arc::clone(&credentials),
            navigator,
        )?);
        let auth = AuthService::new(Arc::clone(&client));
        let session = SessionStore::for_service(&auth);

        Ok(Self {
            catalog: CatalogService::new(Arc::clone(&client)),
            dashboard: DashboardService::new(client),
            auth,
            session,
            credentials,
            config,
            use_color,
        })
    }

    /// A telemetry channel sharing this invocation's credentials.
    pub fn telemetry(&self) -> Result<TelemetryChannel, KitsuError> {
        TelemetryChannel::new(&self.config.telemetry, Arc::clone(&self.credentials))
    }
}
