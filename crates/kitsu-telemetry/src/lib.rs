// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live telemetry for parser jobs.
//!
//! A [`TelemetryChannel`] follows one job at a time over the backend's
//! WebSocket stream. Its state machine:
//!
//! ```text
//! Idle --set_job--> Connecting --handshake--> Connected
//!                       ^                        |
//!                       |                   close / error
//!                  fixed delay                   v
//!                       +-------------- Disconnected
//! ```
//!
//! Changing or clearing the job from any state returns to `Idle` (or a fresh
//! `Connecting` for the new job) immediately.

pub mod channel;
pub mod connection;

pub use channel::{ChannelView, TelemetryChannel};
pub use connection::{job_stream_url, parse_base_url};
