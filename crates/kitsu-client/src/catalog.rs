// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Public anime catalog endpoints.
//!
//! Browsing works with or without a session; when one exists the request
//! pipeline still decorates and renews as usual.

use std::sync::Arc;

use kitsu_core::KitsuError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{ApiClient, ApiRequest};

pub const ANIME_PATH: &str = "/anime";
pub const GENRES_PATH: &str = "/anime/genres";

/// Titles per page when the caller does not say.
pub const DEFAULT_PER_PAGE: u32 = 20;
/// Largest page size the catalog accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// One catalog title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub title_jp: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    /// `tv`, `movie`, `ova`, ...
    #[serde(default)]
    pub kind: Option<String>,
    /// `ongoing`, `released`, `announced`, ...
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub episodes_total: Option<u32>,
    #[serde(default)]
    pub episodes_aired: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub studios: Vec<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub next_episode_at: Option<String>,
}

/// One episode of a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub episode: u32,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// A page of results with its position in the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn has_next(&self) -> bool {
        self.meta.page < self.meta.total_pages
    }
}

#[derive(Deserialize)]
struct DataResponse<T> {
    data: T,
}

/// The episode list comes either bare or wrapped in `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum EpisodeList {
    Bare(Vec<Episode>),
    Wrapped { data: Vec<Episode> },
}

/// Filters for the catalog listing. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimeQuery {
    /// Starts at 1; `None` and 0 both mean the first page.
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Free-text search.
    pub q: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub min_score: Option<f64>,
}

impl AnimeQuery {
    pub fn validate(&self) -> Result<(), KitsuError> {
        if let Some(limit) = self.limit
            && !(1..=MAX_PER_PAGE).contains(&limit)
        {
            return Err(KitsuError::Validation(format!(
                "limit must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        if let Some(score) = self.min_score
            && !(0.0..=10.0).contains(&score)
        {
            return Err(KitsuError::Validation(
                "min score must be between 0 and 10".into(),
            ));
        }
        Ok(())
    }

    fn to_request(&self) -> ApiRequest {
        let mut request = ApiRequest::get(ANIME_PATH)
            .query("page", self.page.unwrap_or(1).max(1))
            .query("limit", self.limit.unwrap_or(DEFAULT_PER_PAGE));
        let text_filters = [
            ("q", &self.q),
            ("kind", &self.kind),
            ("status", &self.status),
            ("genre", &self.genre),
        ];
        for (key, value) in text_filters {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                request = request.query(key, value);
            }
        }
        if let Some(year) = self.year {
            request = request.query("year", year);
        }
        if let Some(score) = self.min_score {
            request = request.query("min_score", score);
        }
        request
    }
}

#[derive(Debug, Clone)]
pub struct CatalogService {
    client: Arc<ApiClient>,
}

impl CatalogService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// One page of titles matching `query`.
    pub async fn list(&self, query: &AnimeQuery) -> Result<PaginatedResponse<Anime>, KitsuError> {
        query.validate()?;
        self.client.send_json(query.to_request()).await
    }

    /// A title by its slug.
    pub async fn get(&self, slug: &str) -> Result<Anime, KitsuError> {
        if slug.is_empty() {
            return Err(KitsuError::Validation("slug is required".into()));
        }
        let wrapped: DataResponse<Anime> = self
            .client
            .send_json(ApiRequest::get(ANIME_PATH).segment(slug))
            .await?;
        Ok(wrapped.data)
    }

    /// Every genre used in the catalog.
    pub async fn genres(&self) -> Result<Vec<String>, KitsuError> {
        self.client.get_json(GENRES_PATH).await
    }

    /// Episodes of the title with id `anime_id`. A title the backend has no
    /// episode list for yields an empty list.
    pub async fn episodes(&self, anime_id: &str) -> Result<Vec<Episode>, KitsuError> {
        if anime_id.is_empty() {
            return Err(KitsuError::Validation("anime id is required".into()));
        }
        let request = ApiRequest::get(ANIME_PATH).segment(anime_id).segment("episodes");
        match self.client.send_json::<EpisodeList>(request).await {
            Ok(EpisodeList::Bare(episodes) | EpisodeList::Wrapped { data: episodes }) => {
                Ok(episodes)
            }
            Err(e) if e.status() == Some(404) => {
                debug!(anime_id, "no episode list");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_of(request: &ApiRequest) -> Vec<(&str, &str)> {
        request
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn default_query_asks_for_first_page() {
        let request = AnimeQuery::default().to_request();
        assert_eq!(request.path, ANIME_PATH);
        assert_eq!(query_of(&request), vec![("page", "1"), ("limit", "20")]);
    }

    #[test]
    fn only_set_filters_are_sent() {
        let query = AnimeQuery {
            page: Some(0),
            q: Some("frieren".into()),
            genre: Some(String::new()),
            year: Some(2023),
            min_score: Some(8.5),
            ..AnimeQuery::default()
        };
        let request = query.to_request();
        assert_eq!(
            query_of(&request),
            vec![
                ("page", "1"),
                ("limit", "20"),
                ("q", "frieren"),
                ("year", "2023"),
                ("min_score", "8.5"),
            ]
        );
    }

    #[test]
    fn out_of_range_filters_are_rejected() {
        let query = AnimeQuery {
            limit: Some(0),
            ..AnimeQuery::default()
        };
        assert!(query.validate().is_err());
        let query = AnimeQuery {
            min_score: Some(11.0),
            ..AnimeQuery::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn sparse_anime_decodes() {
        let anime: Anime =
            serde_json::from_str(r#"{"id":"a1","slug":"frieren","title":"Frieren"}"#).unwrap();
        assert!(anime.genres.is_empty());
        assert_eq!(anime.score, None);
    }

    #[test]
    fn episode_list_accepts_both_shapes() {
        let bare: EpisodeList = serde_json::from_str(r#"[{"id":"e1","episode":1}]"#).unwrap();
        assert!(matches!(bare, EpisodeList::Bare(ref e) if e.len() == 1));
        let wrapped: EpisodeList =
            serde_json::from_str(r#"{"data":[{"id":"e1","episode":1,"season":1}]}"#).unwrap();
        assert!(matches!(wrapped, EpisodeList::Wrapped { ref data } if data[0].season == Some(1)));
    }

    #[test]
    fn last_page_has_no_next() {
        let page = PaginatedResponse::<Anime> {
            data: Vec::new(),
            meta: PageMeta {
                page: 3,
                per_page: 20,
                total: 55,
                total_pages: 3,
            },
        };
        assert!(!page.has_next());
    }
}
