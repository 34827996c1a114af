// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parser job dashboard endpoints.

use std::sync::Arc;

use kitsu_core::{JobStats, KitsuError, ParserJob, TelemetrySnapshot};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiClient, ApiRequest};

pub const JOBS_PATH: &str = "/dashboard/parsers/jobs";
pub const TRIGGER_PATH: &str = "/dashboard/parsers/jobs/trigger";

/// Jobs per page of the job list.
pub const PAGE_SIZE: u32 = 20;

/// Acknowledgement of a dispatched job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredJob {
    pub job_id: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct DashboardService {
    client: Arc<ApiClient>,
}

impl DashboardService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// One page of jobs, newest first. Pages start at 1.
    pub async fn list_jobs(&self, page: u32) -> Result<Vec<ParserJob>, KitsuError> {
        let skip = u64::from(page.saturating_sub(1)) * u64::from(PAGE_SIZE);
        let request = ApiRequest::get(JOBS_PATH)
            .query("skip", skip)
            .query("limit", PAGE_SIZE);
        self.client.send_json(request).await
    }

    pub async fn get_job(&self, job_id: &str) -> Result<ParserJob, KitsuError> {
        if job_id.is_empty() {
            return Err(KitsuError::Validation("job id is required".into()));
        }
        self.client
            .send_json(ApiRequest::get(JOBS_PATH).segment(job_id))
            .await
    }

    pub async fn trigger_job(&self, parser_name: &str, job_type: &str) -> Result<TriggeredJob, KitsuError> {
        if parser_name.is_empty() || job_type.is_empty() {
            return Err(KitsuError::Validation(
                "parser name and job type are required".into(),
            ));
        }
        let body = serde_json::json!({ "parser_name": parser_name, "job_type": job_type });
        let triggered: TriggeredJob = self.client.post_json(TRIGGER_PATH, body).await?;
        info!(job_id = %triggered.job_id, parser = parser_name, job_type, "job triggered");
        Ok(triggered)
    }
}

/// A stored job with live telemetry laid over it.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDisplay {
    pub job: ParserJob,
    pub progress: f64,
    pub stats: JobStats,
    /// Whether `progress` and `stats` came from the live channel.
    pub live: bool,
}

impl JobDisplay {
    /// Live values win when a snapshot for the same job is present.
    pub fn merge(job: ParserJob, telemetry: Option<&TelemetrySnapshot>) -> Self {
        match telemetry.filter(|t| t.job_id == job.id) {
            Some(t) => Self {
                progress: t.progress,
                stats: t.stats,
                live: true,
                job,
            },
            None => Self {
                progress: job.progress,
                stats: job.stats(),
                live: false,
                job,
            },
        }
    }
}
