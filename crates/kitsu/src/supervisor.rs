// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Supervision of long-running terminal views.
//!
//! A view runs as its own task. If it panics, the supervisor prints a
//! recovery notice and starts a fresh instance, up to a failure budget.
//! A clean exit resets the failure state.

use std::future::Future;

use kitsu_core::KitsuError;
use tokio::task::JoinError;
use tracing::{debug, error, warn};

#[derive(Debug)]
pub struct ViewSupervisor {
    max_failures: u32,
    failures: u32,
    last_failure: Option<String>,
}

impl ViewSupervisor {
    pub fn new(max_failures: u32) -> Self {
        Self {
            max_failures,
            failures: 0,
            last_failure: None,
        }
    }

    /// Forget earlier failures so the next run gets the full budget.
    pub fn reset(&mut self) {
        if self.failures > 0 {
            debug!(failures = self.failures, "view supervisor reset");
        }
        self.failures = 0;
        self.last_failure = None;
    }

    /// Runs `view` until an instance completes normally and returns how many
    /// crashed instances were replaced on the way.
    ///
    /// `view` is called with the attempt number (starting at 0) to build each
    /// instance.
    pub async fn run<F, Fut>(&mut self, mut view: F) -> Result<u32, KitsuError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut attempt = 0;
        loop {
            match tokio::spawn(view(attempt)).await {
                Ok(()) => {
                    let recovered = self.failures;
                    self.reset();
                    return Ok(recovered);
                }
                Err(e) if e.is_panic() => {
                    let message = panic_message(e);
                    self.failures += 1;
                    warn!(attempt, failures = self.failures, error = %message, "view crashed");
                    self.last_failure = Some(message);

                    if self.failures > self.max_failures {
                        error!(failures = self.failures, "view failure budget exhausted");
                        return Err(KitsuError::Internal(format!(
                            "view failed {} times, last: {}",
                            self.failures,
                            self.last_failure.as_deref().unwrap_or("unknown")
                        )));
                    }
                    eprintln!("Display error, restarting view...");
                    attempt += 1;
                }
                Err(e) => {
                    return Err(KitsuError::Internal(format!("view task cancelled: {e}")));
                }
            }
        }
    }
}

fn panic_message(e: JoinError) -> String {
    let payload = e.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
