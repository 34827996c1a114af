// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consumer-facing handle of the live telemetry channel.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use kitsu_config::model::TelemetryConfig;
use kitsu_core::{ChannelStatus, CredentialStore, KitsuError, TelemetrySnapshot};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::connection::{Connection, parse_base_url};

/// What a consumer sees: the subscribed job, its connection status and the
/// latest decoded snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelView {
    pub job_id: Option<String>,
    pub status: ChannelStatus,
    pub snapshot: Option<TelemetrySnapshot>,
    /// Bumped on every job change; tasks of older epochs cannot write.
    pub(crate) epoch: u64,
}

struct Active {
    job_id: Option<String>,
    epoch: u64,
    cancel: CancellationToken,
}

/// A live subscription to one job's telemetry stream.
///
/// Setting a job opens a connection in the background and keeps it open,
/// reconnecting after a fixed delay whenever it drops. Changing or clearing
/// the job, or dropping the channel, tears the connection down and cancels
/// any pending reconnect.
pub struct TelemetryChannel {
    ws_base_url: Url,
    reconnect_delay: Duration,
    credentials: Arc<dyn CredentialStore>,
    view: Arc<watch::Sender<ChannelView>>,
    active: Mutex<Active>,
}

impl std::fmt::Debug for TelemetryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryChannel")
            .field("ws_base_url", &self.ws_base_url.as_str())
            .field("view", &*self.view.borrow())
            .finish_non_exhaustive()
    }
}

impl TelemetryChannel {
    /// Fails only when the configured realtime base URL is unusable.
    pub fn new(
        config: &TelemetryConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, KitsuError> {
        let ws_base_url = parse_base_url(&config.ws_base_url)?;
        let (view, _) = watch::channel(ChannelView::default());
        Ok(Self {
            ws_base_url,
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            credentials,
            view: Arc::new(view),
            active: Mutex::new(Active {
                job_id: None,
                epoch: 0,
                cancel: CancellationToken::new(),
            }),
        })
    }

    /// Subscribe to `job_id`, or unsubscribe with `None`.
    ///
    /// Setting the job already subscribed to is a no-op. Otherwise the view
    /// is reset before this returns, so no snapshot of the previous job is
    /// ever visible under the new one. Must be called within a tokio runtime.
    pub fn set_job(&self, job_id: Option<String>) {
        let job_id = job_id.filter(|id| !id.is_empty());
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.job_id == job_id {
            return;
        }

        active.cancel.cancel();
        active.epoch += 1;
        active.cancel = CancellationToken::new();
        active.job_id = job_id.clone();

        let status = if job_id.is_some() {
            ChannelStatus::Connecting
        } else {
            ChannelStatus::Idle
        };
        self.view.send_replace(ChannelView {
            job_id: job_id.clone(),
            status,
            snapshot: None,
            epoch: active.epoch,
        });

        match job_id {
            Some(job_id) => {
                debug!(job_id = %job_id, epoch = active.epoch, "telemetry subscription opened");
                let connection = Connection {
                    job_id,
                    epoch: active.epoch,
                    ws_base_url: self.ws_base_url.clone(),
                    reconnect_delay: self.reconnect_delay,
                    credentials: Arc::clone(&self.credentials),
                    view: Arc::clone(&self.view),
                    cancel: active.cancel.clone(),
                };
                tokio::spawn(connection.run());
            }
            None => debug!("telemetry subscription cleared"),
        }
    }

    /// Same as `set_job(None)`.
    pub fn clear(&self) {
        self.set_job(None);
    }

    pub fn job_id(&self) -> Option<String> {
        self.view.borrow().job_id.clone()
    }

    pub fn status(&self) -> ChannelStatus {
        self.view.borrow().status
    }

    pub fn snapshot(&self) -> Option<TelemetrySnapshot> {
        self.view.borrow().snapshot.clone()
    }

    pub fn view(&self) -> ChannelView {
        self.view.borrow().clone()
    }

    /// A receiver notified on every status or snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<ChannelView> {
        self.view.subscribe()
    }
}

impl Drop for TelemetryChannel {
    fn drop(&mut self) {
        self.active
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel
            .cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitsu_credentials::MemoryCredentialStore;

    fn channel() -> TelemetryChannel {
        // Nothing listens on port 9; attempts fail and are retried slowly.
        let config = TelemetryConfig {
            ws_base_url: "ws://127.0.0.1:9".into(),
            reconnect_delay_ms: 60_000,
        };
        TelemetryChannel::new(&config, Arc::new(MemoryCredentialStore::new())).unwrap()
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        let config = TelemetryConfig {
            ws_base_url: "not a url".into(),
            reconnect_delay_ms: 1_000,
        };
        let err = TelemetryChannel::new(&config, Arc::new(MemoryCredentialStore::new()))
            .unwrap_err();
        assert!(matches!(err, KitsuError::Config(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn starts_idle() {
        let channel = channel();
        assert_eq!(channel.status(), ChannelStatus::Idle);
        assert!(channel.job_id().is_none());
        assert!(channel.snapshot().is_none());
    }

    #[tokio::test]
    async fn set_job_enters_connecting_synchronously() {
        let channel = channel();
        channel.set_job(Some("j1".into()));
        assert_eq!(channel.status(), ChannelStatus::Connecting);
        assert_eq!(channel.job_id().as_deref(), Some("j1"));
    }

    #[tokio::test]
    async fn empty_id_is_idle() {
        let channel = channel();
        channel.set_job(Some(String::new()));
        assert_eq!(channel.status(), ChannelStatus::Idle);
        assert!(channel.job_id().is_none());
    }

    #[tokio::test]
    async fn clear_returns_to_idle() {
        let channel = channel();
        channel.set_job(Some("j1".into()));
        channel.clear();
        let view = channel.view();
        assert_eq!(view.status, ChannelStatus::Idle);
        assert!(view.job_id.is_none());
        assert!(view.snapshot.is_none());
    }

    #[tokio::test]
    async fn same_job_does_not_restart() {
        let channel = channel();
        channel.set_job(Some("j1".into()));
        let epoch = channel.view().epoch;
        channel.set_job(Some("j1".into()));
        assert_eq!(channel.view().epoch, epoch);
    }
}
