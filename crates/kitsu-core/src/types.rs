// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the request pipeline, the session container, and
//! the telemetry channel.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The bearer access token and its longer-lived refresh token.
///
/// Only one pair is held at a time; storing a new pair replaces the old one.
#[derive(Debug)]
pub struct CredentialPair {
    pub access_token: SecretString,
    /// `None` means "keep whatever refresh token is already stored".
    pub refresh_token: Option<SecretString>,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: refresh_token.map(SecretString::from),
        }
    }

    /// Returns the value to put after `Bearer ` in an authorization header.
    pub fn bearer(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// A registered platform user as returned by `/users/me` and `/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Per-job item counters reported by the ingestion workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    pub proc: u64,
    pub create: u64,
    pub update: u64,
    pub fail: u64,
    pub skip: u64,
}

/// Latest known progress of one backend job, as pushed over the live channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub job_id: String,
    /// Percentage in `0..=100`.
    pub progress: f64,
    pub stats: JobStats,
}

/// Connection status of a live telemetry channel.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    /// No job identifier supplied.
    #[default]
    Idle,
    /// A connection attempt is in flight.
    Connecting,
    /// The handshake completed; frames are being decoded.
    Connected,
    /// The connection closed or failed; a reconnect is scheduled.
    Disconnected,
}

/// A content-ingestion ("parser") job as stored by the dashboard API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserJob {
    pub id: String,
    pub parser_name: String,
    pub job_type: String,
    pub status: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub items_processed: u64,
    #[serde(default)]
    pub items_created: u64,
    #[serde(default)]
    pub items_updated: u64,
    #[serde(default)]
    pub items_failed: u64,
    #[serde(default)]
    pub items_skipped: u64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    pub created_at: String,
}

impl ParserJob {
    /// Counters stored on the job row, in telemetry shape.
    pub fn stats(&self) -> JobStats {
        JobStats {
            proc: self.items_processed,
            create: self.items_created,
            update: self.items_updated,
            fail: self.items_failed,
            skip: self.items_skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn telemetry_snapshot_decodes_wire_shape() {
        let json = r#"{"job_id":"j-1","progress":42,"stats":{"proc":10,"create":4,"update":3,"fail":1,"skip":2}}"#;
        let snapshot: TelemetrySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.job_id, "j-1");
        assert_eq!(snapshot.progress, 42.0);
        assert_eq!(snapshot.stats.proc, 10);
        assert_eq!(snapshot.stats.skip, 2);
    }

    #[test]
    fn telemetry_snapshot_rejects_missing_stats() {
        let json = r#"{"job_id":"j-1","progress":42}"#;
        assert!(serde_json::from_str::<TelemetrySnapshot>(json).is_err());
    }

    #[test]
    fn channel_status_strings() {
        assert_eq!(ChannelStatus::Connecting.to_string(), "connecting");
        assert_eq!(
            ChannelStatus::from_str("disconnected").unwrap(),
            ChannelStatus::Disconnected
        );
        assert_eq!(ChannelStatus::default(), ChannelStatus::Idle);
    }

    #[test]
    fn user_record_optional_fields_default() {
        let json = r#"{"id":"u1","email":"a@b.io","username":"aya"}"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert!(!user.is_superuser);
        assert!(user.full_name.is_none());
    }

    #[test]
    fn parser_job_stats_mirror_item_counters() {
        let json = r#"{
            "id": "5b0c", "parser_name": "shikimori", "job_type": "full_sync",
            "status": "running", "progress": 30,
            "items_processed": 9, "items_created": 5, "items_failed": 1,
            "created_at": "2026-01-01T00:00:00"
        }"#;
        let job: ParserJob = serde_json::from_str(json).unwrap();
        let stats = job.stats();
        assert_eq!(stats.proc, 9);
        assert_eq!(stats.create, 5);
        assert_eq!(stats.update, 0);
        assert_eq!(stats.skip, 0);
    }

    #[test]
    fn credential_pair_debug_redacts() {
        let pair = CredentialPair::new("access-secret", Some("refresh-secret".into()));
        let debug = format!("{pair:?}");
        assert!(!debug.contains("access-secret"));
        assert!(!debug.contains("refresh-secret"));
        assert_eq!(pair.bearer(), "access-secret");
    }
}
