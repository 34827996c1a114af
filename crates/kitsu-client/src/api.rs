// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated request pipeline for the Kitsu API.
//!
//! Every request is decorated with the stored access token. A 401 triggers
//! exactly one renewal through `POST /auth/refresh-token` followed by exactly
//! one retry of the original request. If renewal is impossible the stored
//! credentials are wiped and the UI is sent to the login entry point; the
//! caller then sees the original 401.

use std::sync::Arc;
use std::time::Duration;

use kitsu_config::model::{ApiConfig, RenewalPolicy};
use kitsu_core::{CredentialPair, CredentialStore, KitsuError, Navigator, redirect_to_login};
use reqwest::{Method, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Path of the renewal endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// Body of an outbound request.
#[derive(Debug, Clone, Default)]
pub enum ApiBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// A replayable description of an API call.
///
/// The request is rebuilt from this descriptor on every attempt, so the retry
/// after a renewal is byte-for-byte the original call with a new bearer.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Fixed part of the path, relative to the API base URL.
    pub path: String,
    /// Caller-supplied path segments appended after `path`, each encoded
    /// as a single segment.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: ApiBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            body: ApiBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Appends one path segment, such as a resource id.
    pub fn segment(mut self, raw: impl Into<String>) -> Self {
        self.segments.push(raw.into());
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = ApiBody::Json(body);
        self
    }

    pub fn form<K: ToString, V: ToString>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self {
        self.body = ApiBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }
}

/// A request in flight through the pipeline.
///
/// `retried` is the single-use marker: once set, a further 401 is returned to
/// the caller instead of triggering another renewal.
pub struct PendingRequest {
    pub request: ApiRequest,
    pub retried: bool,
    /// Bearer that replaces the stored token, set after a renewal.
    authorization: Option<SecretString>,
}

impl PendingRequest {
    fn new(request: ApiRequest) -> Self {
        Self {
            request,
            retried: false,
            authorization: None,
        }
    }
}

/// Token endpoint response (`/auth/login/access-token` and `/auth/refresh-token`).
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("token_type", &self.token_type)
            .finish()
    }
}

impl TokenResponse {
    pub fn into_pair(self) -> CredentialPair {
        CredentialPair::new(self.access_token, self.refresh_token)
    }
}

/// HTTP client that attaches credentials and renews them on 401.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    login_path: String,
    policy: RenewalPolicy,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    /// Held for the duration of a renewal under [`RenewalPolicy::SingleFlight`].
    renewal: Mutex<()>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Builds a client for the API described by `config`.
    pub fn new(
        config: &ApiConfig,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, KitsuError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("kitsu/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KitsuError::Config(format!("failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| KitsuError::Config(format!("invalid API URL `{}`: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(KitsuError::Config(format!(
                "API URL `{}` cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self {
            http,
            base_url,
            login_path: config.login_path.clone(),
            policy: config.renewal_policy,
            credentials,
            navigator,
            renewal: Mutex::new(()),
        })
    }

    /// The credential store this client reads and renews.
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// The navigator used for forced redirects.
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Location of the unauthenticated entry screen.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Base URL plus the literal segments of `path`, then each of `segments`
    /// encoded as one segment. A query on the base URL is kept.
    fn url(&self, path: &str, segments: &[String]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut parts) = url.path_segments_mut() {
            parts
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()))
                .extend(segments);
        }
        url
    }

    /// Sends `request` through the pipeline and returns the successful response.
    pub async fn execute(&self, request: ApiRequest) -> Result<Response, KitsuError> {
        let mut pending = PendingRequest::new(request);

        loop {
            let (bearer, outcome) = self.dispatch(&pending).await?;
            let err = match outcome {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if !err.is_unauthorized() || pending.retried {
                if pending.retried {
                    debug!(path = %pending.request.path, "retried request rejected again");
                }
                return Err(err);
            }

            pending.retried = true;
            match self.renew(bearer.as_ref()).await {
                Ok(access) => {
                    debug!(path = %pending.request.path, "retrying with renewed token");
                    pending.authorization = Some(access);
                }
                Err(reason) => {
                    warn!(error = %reason, "session renewal failed");
                    self.end_session().await;
                    return Err(err);
                }
            }
        }
    }

    /// Sends `request` and decodes the JSON response body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, KitsuError> {
        let response = self.execute(request).await?;
        decode_json(response).await
    }

    /// Sends `request` and discards the response body.
    pub async fn send_empty(&self, request: ApiRequest) -> Result<(), KitsuError> {
        self.execute(request).await.map(|_| ())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, KitsuError> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, KitsuError> {
        self.send_json(ApiRequest::post(path).json(body)).await
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T, KitsuError> {
        self.send_json(ApiRequest::post(path).form(fields.iter().copied()))
            .await
    }

    /// One attempt: decorate, send, classify.
    ///
    /// Returns the bearer that was attached so a single-flight renewal can
    /// tell whether another request already replaced it. Credential store
    /// failures abort the pipeline (outer `Err`).
    async fn dispatch(
        &self,
        pending: &PendingRequest,
    ) -> Result<(Option<SecretString>, Result<Response, KitsuError>), KitsuError> {
        let bearer = match &pending.authorization {
            Some(token) => Some(SecretString::from(token.expose_secret().to_owned())),
            None => self.credentials.access_token().await?,
        };

        let request = &pending.request;
        let url = self.url(&request.path, &request.segments);
        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            ApiBody::Empty => builder,
            ApiBody::Json(value) => builder.json(value),
            ApiBody::Form(fields) => builder.form(fields),
        };
        if let Some(token) = &bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Ok((bearer, Err(transport_error(e)))),
        };

        let status = response.status();
        debug!(method = %request.method, path = %request.path, status = %status, retried = pending.retried, "api response");

        if status.is_success() {
            Ok((bearer, Ok(response)))
        } else {
            Ok((bearer, Err(http_error(response).await)))
        }
    }

    /// Obtain a fresh access token according to the configured policy.
    async fn renew(&self, failed_with: Option<&SecretString>) -> Result<SecretString, KitsuError> {
        match self.policy {
            RenewalPolicy::Independent => self.refresh().await,
            RenewalPolicy::SingleFlight => {
                let _guard = self.renewal.lock().await;
                let current = self.credentials.access_token().await?;
                if let (Some(current), Some(used)) = (current, failed_with)
                    && current.expose_secret() != used.expose_secret()
                {
                    debug!("token already renewed by a concurrent request");
                    return Ok(current);
                }
                self.refresh().await
            }
        }
    }

    /// The renewal round-trip. Sent undecorated and outside the 401 path.
    async fn refresh(&self) -> Result<SecretString, KitsuError> {
        let refresh_token = self
            .credentials
            .refresh_token()
            .await?
            .ok_or_else(|| KitsuError::Auth("no refresh token stored".into()))?;

        let response = self
            .http
            .post(self.url(REFRESH_PATH, &[]))
            .json(&serde_json::json!({ "refresh_token": refresh_token.expose_secret() }))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err = http_error(response).await;
            return Err(KitsuError::Auth(format!("refresh rejected: {err}")));
        }

        let tokens: TokenResponse = decode_json(response).await?;
        let access = SecretString::from(tokens.access_token.clone());
        self.credentials.store(tokens.into_pair()).await?;
        info!("session renewed");
        Ok(access)
    }

    /// Irrecoverable renewal failure: forget the session and go to login.
    async fn end_session(&self) {
        if let Err(e) = self.credentials.clear().await {
            warn!(error = %e, "failed to clear credentials");
        }
        redirect_to_login(self.navigator.as_ref(), &self.login_path);
    }
}

/// Decode a successful response body as JSON.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, KitsuError> {
    let body = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&body).map_err(|e| KitsuError::Decode {
        message: format!("failed to parse API response: {e}"),
        source: Some(Box::new(e)),
    })
}

fn transport_error(e: reqwest::Error) -> KitsuError {
    KitsuError::Transport {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Turn a non-2xx response into [`KitsuError::Http`], preferring the
/// backend's `detail` field as the message.
async fn http_error(response: Response) -> KitsuError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    KitsuError::Http {
        status: status.as_u16(),
        message: error_detail(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string()),
    }
}

/// Extract a human-readable message from an error body.
///
/// Understands `{"detail": "..."}` and validation lists
/// `{"detail": [{"msg": "..."}]}`; otherwise returns the raw body.
fn error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return Some(trimmed.to_string());
    };
    match value.get("detail") {
        Some(serde_json::Value::String(detail)) => Some(detail.clone()),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_extracted() {
        assert_eq!(
            error_detail(r#"{"detail":"Incorrect email or password"}"#).as_deref(),
            Some("Incorrect email or password")
        );
    }

    #[test]
    fn validation_list_is_joined() {
        let body = r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email"},{"msg":"field required"}]}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some("value is not a valid email; field required")
        );
    }

    #[test]
    fn plain_and_empty_bodies() {
        assert_eq!(error_detail("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_detail("   "), None);
    }

    #[test]
    fn request_builder_collects_parts() {
        let req = ApiRequest::get("/dashboard/parsers/jobs")
            .query("skip", 20)
            .query("limit", 20);
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.query.len(), 2);
        assert!(matches!(req.body, ApiBody::Empty));

        let req = ApiRequest::post("/auth/login/access-token")
            .form([("username", "aya@kitsu.test"), ("password", "pw")]);
        match req.body {
            ApiBody::Form(fields) => assert_eq!(fields[0].0, "username"),
            other => panic!("expected form body, got {other:?}"),
        }
    }

    fn client_at(base_url: &str) -> ApiClient {
        let config = ApiConfig {
            base_url: base_url.into(),
            ..ApiConfig::default()
        };
        ApiClient::new(
            &config,
            Arc::new(kitsu_credentials::MemoryCredentialStore::new()),
            Arc::new(kitsu_test_utils::RecordingNavigator::headless()),
        )
        .unwrap()
    }

    #[test]
    fn urls_extend_the_base_path() {
        let client = client_at("http://localhost:8000/api/v1/");
        assert_eq!(
            client.url(REFRESH_PATH, &[]).as_str(),
            "http://localhost:8000/api/v1/auth/refresh-token"
        );
        let client = client_at("https://kitsu.example");
        assert_eq!(
            client.url("/users/me", &[]).as_str(),
            "https://kitsu.example/users/me"
        );
    }

    #[test]
    fn segments_are_encoded_whole() {
        let client = client_at("http://localhost:8000/api/v1?tenant=a");
        let url = client.url("/dashboard/parsers/jobs", &["a/b c?".to_string()]);
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/dashboard/parsers/jobs/a%2Fb%20c%3F?tenant=a"
        );
    }

    #[test]
    fn unusable_base_url_is_a_config_error() {
        let config = ApiConfig {
            base_url: "localhost:8000".into(),
            ..ApiConfig::default()
        };
        let err = ApiClient::new(
            &config,
            Arc::new(kitsu_credentials::MemoryCredentialStore::new()),
            Arc::new(kitsu_test_utils::RecordingNavigator::headless()),
        )
        .unwrap_err();
        assert!(matches!(err, KitsuError::Config(_)), "got: {err:?}");
    }

    #[test]
    fn token_response_debug_redacts() {
        let tokens: TokenResponse = serde_json::from_str(
            r#"{"access_token":"secret-a","refresh_token":"secret-r","token_type":"bearer"}"#,
        )
        .unwrap();
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("secret-a"));
        assert!(!debug.contains("secret-r"));
    }
}
