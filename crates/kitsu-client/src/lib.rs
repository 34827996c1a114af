// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP side of the Kitsu client.
//!
//! [`ApiClient`] is the authenticated request pipeline: it attaches the stored
//! bearer token and renews the session once when the backend answers 401.
//! [`AuthService`], [`CatalogService`] and [`DashboardService`] are thin typed
//! layers over it, and [`SessionStore`] is the shared "who is logged in"
//! container.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod session;

pub use api::{ApiBody, ApiClient, ApiRequest, PendingRequest, REFRESH_PATH, TokenResponse};
pub use auth::{AuthService, LoginCredentials, RegisterCredentials, ResetPassword};
pub use catalog::{Anime, AnimeQuery, CatalogService, Episode, PageMeta, PaginatedResponse};
pub use dashboard::{DashboardService, JobDisplay, TriggeredJob};
pub use session::{SessionState, SessionStore};
