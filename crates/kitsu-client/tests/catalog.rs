// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anime catalog endpoints against a mock backend.

use std::sync::Arc;

use kitsu_client::{AnimeQuery, ApiClient, CatalogService};
use kitsu_config::model::ApiConfig;
use kitsu_core::{CredentialPair, CredentialStore, Navigator};
use kitsu_credentials::MemoryCredentialStore;
use kitsu_test_utils::RecordingNavigator;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(base_url: String, store: Arc<MemoryCredentialStore>) -> CatalogService {
    let config = ApiConfig {
        base_url,
        timeout_secs: 5,
        ..ApiConfig::default()
    };
    let client = ApiClient::new(
        &config,
        store as Arc<dyn CredentialStore>,
        Arc::new(RecordingNavigator::at("/anime")) as Arc<dyn Navigator>,
    )
    .unwrap();
    CatalogService::new(Arc::new(client))
}

fn anonymous(server: &MockServer) -> CatalogService {
    service(server.uri(), Arc::new(MemoryCredentialStore::new()))
}

fn anime(slug: &str) -> serde_json::Value {
    serde_json::json!({
        "id": format!("id-{slug}"),
        "slug": slug,
        "title": slug.to_uppercase(),
        "kind": "tv",
        "status": "released",
        "score": 9.1,
        "episodes_total": 28,
        "year": 2023,
        "genres": ["Adventure", "Drama"],
    })
}

#[tokio::test]
async fn list_sends_filters_and_reads_page_meta() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "20"))
        .and(query_param("genre", "Drama"))
        .and(query_param("min_score", "8"))
        .and(query_param_is_missing("q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [anime("frieren"), anime("mushishi")],
            "meta": {"page": 2, "per_page": 20, "total": 42, "total_pages": 3},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = AnimeQuery {
        page: Some(2),
        genre: Some("Drama".into()),
        min_score: Some(8.0),
        ..AnimeQuery::default()
    };
    let page = anonymous(&server).list(&query).await.unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].slug, "frieren");
    assert_eq!(page.data[0].genres, vec!["Adventure", "Drama"]);
    assert_eq!(page.meta.total, 42);
    assert!(page.has_next());
}

#[tokio::test]
async fn invalid_filters_never_reach_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let query = AnimeQuery {
        limit: Some(500),
        ..AnimeQuery::default()
    };
    let err = anonymous(&server).list(&query).await.unwrap_err();
    assert!(matches!(err, kitsu_core::KitsuError::Validation(_)));
}

#[tokio::test]
async fn show_unwraps_data_and_encodes_slug() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime/fate%2Fzero"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": anime("fate/zero")})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let title = anonymous(&server).get("fate/zero").await.unwrap();
    assert_eq!(title.slug, "fate/zero");
    assert_eq!(title.episodes_total, Some(28));
}

#[tokio::test]
async fn missing_title_is_a_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime/nope"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"detail": "Anime not found"})),
        )
        .mount(&server)
        .await;

    let err = anonymous(&server).get("nope").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn genres_are_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime/genres"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!(["Action", "Comedy"])),
        )
        .mount(&server)
        .await;

    let genres = anonymous(&server).genres().await.unwrap();
    assert_eq!(genres, vec!["Action", "Comedy"]);
}

#[tokio::test]
async fn episodes_are_listed_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime/id-frieren/episodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "e1", "episode": 1, "season": 1, "title": "The Journey's End"},
            {"id": "e2", "episode": 2, "season": 1},
        ])))
        .mount(&server)
        .await;

    let episodes = anonymous(&server).episodes("id-frieren").await.unwrap();
    assert_eq!(episodes.len(), 2);
    assert_eq!(episodes[0].title.as_deref(), Some("The Journey's End"));
    assert_eq!(episodes[1].episode, 2);
}

#[tokio::test]
async fn title_without_episode_list_yields_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime/id-movie/episodes"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let episodes = anonymous(&server).episodes("id-movie").await.unwrap();
    assert!(episodes.is_empty());
}

#[tokio::test]
async fn episode_server_errors_are_not_hidden() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime/id-frieren/episodes"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = anonymous(&server).episodes("id-frieren").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn signed_in_browsing_carries_the_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime/genres"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["Drama"])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store
        .store(CredentialPair::new("a1", Some("r1".into())))
        .await
        .unwrap();
    let genres = service(server.uri(), store).genres().await.unwrap();
    assert_eq!(genres, vec!["Drama"]);
}
