// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-job connection task: connect, pump frames, wait, reconnect.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kitsu_core::{ChannelStatus, CredentialStore, KitsuError, TelemetrySnapshot};
use secrecy::ExposeSecret;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::channel::ChannelView;

/// Path segments of a job's event stream, below the realtime base URL.
const STREAM_SEGMENTS: [&str; 4] = ["dashboard", "parsers", "ws", "jobs"];

/// Parses the realtime base URL. It must be able to carry path segments.
pub fn parse_base_url(raw: &str) -> Result<Url, KitsuError> {
    let url = Url::parse(raw)
        .map_err(|e| KitsuError::Config(format!("invalid telemetry URL `{raw}`: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(KitsuError::Config(format!(
            "telemetry URL `{raw}` cannot carry a path"
        )));
    }
    Ok(url)
}

/// Stream URL for `job_id`, with the access token as a query parameter.
///
/// The job id is one path segment whatever it contains, and any query the
/// base URL already carries is kept.
pub fn job_stream_url(base: &Url, job_id: &str, token: Option<&str>) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(STREAM_SEGMENTS)
            .push(job_id);
    }
    if let Some(token) = token {
        url.query_pairs_mut().append_pair("token", token);
    }
    url
}

/// Everything one connection task needs. Owned by the task.
pub(crate) struct Connection {
    pub job_id: String,
    pub epoch: u64,
    pub ws_base_url: Url,
    pub reconnect_delay: Duration,
    pub credentials: Arc<dyn CredentialStore>,
    pub view: Arc<watch::Sender<ChannelView>>,
    pub cancel: CancellationToken,
}

impl Connection {
    /// Applies `f` to the shared view, unless this task has been superseded.
    fn update(&self, f: impl FnOnce(&mut ChannelView)) {
        self.view.send_if_modified(|view| {
            if view.epoch != self.epoch || self.cancel.is_cancelled() {
                return false;
            }
            f(view);
            true
        });
    }

    fn set_status(&self, status: ChannelStatus) {
        self.update(|view| view.status = status);
    }

    async fn url(&self) -> Url {
        let token = match self.credentials.access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(job_id = %self.job_id, error = %e, "could not read access token for telemetry");
                None
            }
        };
        job_stream_url(
            &self.ws_base_url,
            &self.job_id,
            token.as_ref().map(|t| t.expose_secret()),
        )
    }

    /// Decode one frame and replace the snapshot. Undecodable frames are
    /// dropped and the previous snapshot stays.
    fn apply(&self, payload: &str) {
        match serde_json::from_str::<TelemetrySnapshot>(payload) {
            Ok(snapshot) => {
                debug!(job_id = %self.job_id, progress = snapshot.progress, "telemetry update");
                self.update(|view| view.snapshot = Some(snapshot));
            }
            Err(e) => {
                warn!(job_id = %self.job_id, error = %e, "discarding undecodable telemetry frame");
            }
        }
    }

    /// Runs until cancelled. Retries forever with a fixed delay.
    pub async fn run(self) {
        loop {
            self.set_status(ChannelStatus::Connecting);
            let url = self.url().await;

            let attempt = tokio::select! {
                _ = self.cancel.cancelled() => return,
                attempt = tokio_tungstenite::connect_async(url.as_str()) => attempt,
            };

            match attempt {
                Ok((mut ws, _)) => {
                    info!(job_id = %self.job_id, "telemetry connected");
                    self.set_status(ChannelStatus::Connected);

                    loop {
                        let frame = tokio::select! {
                            biased;
                            _ = self.cancel.cancelled() => {
                                let _ = ws.close(None).await;
                                debug!(job_id = %self.job_id, "telemetry connection torn down");
                                return;
                            }
                            frame = ws.next() => frame,
                        };

                        match frame {
                            Some(Ok(Message::Text(text))) => self.apply(text.as_str()),
                            Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                                Ok(text) => self.apply(text),
                                Err(e) => {
                                    warn!(job_id = %self.job_id, error = %e, "discarding non-UTF-8 telemetry frame");
                                }
                            },
                            Some(Ok(Message::Close(_))) | None => {
                                info!(job_id = %self.job_id, "telemetry connection closed");
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                warn!(job_id = %self.job_id, error = %e, "telemetry connection failed");
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(job_id = %self.job_id, error = %e, "telemetry connect failed");
                }
            }

            self.set_status(ChannelStatus::Disconnected);
            debug!(job_id = %self.job_id, delay_ms = self.reconnect_delay.as_millis() as u64, "reconnect scheduled");

            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
    }
}
