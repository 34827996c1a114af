// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Kitsu integration tests.
//!
//! Provides fakes for the client's collaborators so request-pipeline and
//! telemetry tests run without a real backend.
//!
//! # Components
//!
//! - [`RecordingNavigator`] - Navigator that records forced redirects
//! - [`MockTelemetryServer`] - In-process WebSocket server that scripts job telemetry frames

pub mod mock_navigator;
pub mod mock_telemetry;

pub use mock_navigator::RecordingNavigator;
pub use mock_telemetry::{MockConnection, MockTelemetryServer};

/// JSON body of a successful login or refresh response.
pub fn token_body(access: &str, refresh: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "bearer",
    })
}

/// JSON body of a `/users/me` response.
pub fn user_body(username: &str) -> serde_json::Value {
    serde_json::json!({
        "id": format!("{username}-id"),
        "email": format!("{username}@kitsu.test"),
        "username": username,
        "is_active": true,
        "is_superuser": false,
    })
}

/// JSON telemetry frame for `job_id`.
pub fn telemetry_frame(job_id: &str, progress: f64, processed: u64) -> String {
    serde_json::json!({
        "job_id": job_id,
        "progress": progress,
        "stats": {"proc": processed, "create": processed / 2, "update": 0, "fail": 0, "skip": 0},
    })
    .to_string()
}
