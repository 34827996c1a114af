// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Kitsu client.
//!
//! This crate provides the error type, the wire types shared by the request
//! pipeline and the telemetry channel, and the seams (credential storage and
//! navigation) that the rest of the workspace is built against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::KitsuError;
pub use traits::navigator::{Headless, redirect_to_login};
pub use traits::{CredentialStore, Navigator};
pub use types::{
    ChannelStatus, CredentialPair, JobStats, ParserJob, TelemetrySnapshot, UserRecord,
};
