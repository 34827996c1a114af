// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parser job dashboard endpoints against a mock backend.

use std::sync::Arc;

use kitsu_client::{ApiClient, DashboardService};
use kitsu_config::model::ApiConfig;
use kitsu_core::{CredentialStore, Navigator};
use kitsu_credentials::MemoryCredentialStore;
use kitsu_test_utils::RecordingNavigator;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(base_url: String) -> DashboardService {
    let config = ApiConfig {
        base_url,
        timeout_secs: 5,
        ..ApiConfig::default()
    };
    let client = ApiClient::new(
        &config,
        Arc::new(MemoryCredentialStore::new()) as Arc<dyn CredentialStore>,
        Arc::new(RecordingNavigator::at("/dashboard")) as Arc<dyn Navigator>,
    )
    .unwrap();
    DashboardService::new(Arc::new(client))
}

fn job(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id, "parser_name": "shikimori", "job_type": "full_sync",
        "status": status, "progress": 100, "created_at": "2026-01-01T00:00:00"
    })
}

#[tokio::test]
async fn list_jobs_pages_by_twenty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard/parsers/jobs"))
        .and(query_param("skip", "40"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([job("j1", "completed")])))
        .expect(1)
        .mount(&server)
        .await;

    let jobs = service(server.uri()).list_jobs(3).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, "completed");
}

#[tokio::test]
async fn huge_page_numbers_do_not_overflow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard/parsers/jobs"))
        .and(query_param("skip", "85899345880"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let jobs = service(server.uri()).list_jobs(u32::MAX).await.unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn job_id_is_sent_as_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/parsers/jobs/a%2Fb"))
        .and(query_param("tenant", "a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("a/b", "running")))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = service(format!("{}/api/v1?tenant=a", server.uri()));
    let job = dashboard.get_job("a/b").await.unwrap();
    assert_eq!(job.id, "a/b");
}

#[tokio::test]
async fn trigger_job_posts_parser_and_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dashboard/parsers/jobs/trigger"))
        .and(body_json(serde_json::json!({"parser_name": "shikimori", "job_type": "full_sync"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"job_id": "j9", "status": "pending"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let triggered = service(server.uri())
        .trigger_job("shikimori", "full_sync")
        .await
        .unwrap();
    assert_eq!(triggered.job_id, "j9");
    assert_eq!(triggered.status, "pending");
}
