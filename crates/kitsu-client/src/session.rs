// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide session state.
//!
//! One [`SessionStore`] is built at startup and shared by every surface that
//! needs to know who is logged in. Readers subscribe to changes instead of
//! polling.

use std::sync::Arc;

use kitsu_core::{CredentialStore, Navigator, UserRecord, redirect_to_login};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::auth::AuthService;

/// Who is logged in, as far as this process knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserRecord>,
    pub is_logged_in: bool,
    /// True until the first [`SessionStore::hydrate`] completes.
    pub is_loading: bool,
}

impl SessionState {
    fn loading() -> Self {
        Self {
            user: None,
            is_logged_in: false,
            is_loading: true,
        }
    }

    fn logged_out() -> Self {
        Self {
            user: None,
            is_logged_in: false,
            is_loading: false,
        }
    }

    fn logged_in(user: UserRecord) -> Self {
        Self {
            user: Some(user),
            is_logged_in: true,
            is_loading: false,
        }
    }
}

/// Observable session container.
pub struct SessionStore {
    state: watch::Sender<SessionState>,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::loading());
        Self {
            state,
            credentials,
            navigator,
            login_path: login_path.into(),
        }
    }

    /// A store sharing the credential store, navigator and login path of
    /// `auth`'s client.
    pub fn for_service(auth: &AuthService) -> Self {
        let client = auth.client();
        Self::new(
            Arc::clone(client.credentials()),
            Arc::clone(client.navigator()),
            client.login_path(),
        )
    }

    /// Resolves the initial state from the credential store.
    ///
    /// Without an access token the session is logged out and no request is
    /// made. Otherwise `/users/me` decides; any failure clears credentials.
    pub async fn hydrate(&self, auth: &AuthService) {
        let token = match self.credentials.access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "credential store unreadable, starting logged out");
                None
            }
        };

        if token.is_none() {
            debug!("no stored session");
            self.state.send_replace(SessionState::logged_out());
            return;
        }

        match auth.current_user().await {
            Ok(user) => {
                info!(username = %user.username, "session restored");
                self.state.send_replace(SessionState::logged_in(user));
            }
            Err(e) => {
                warn!(error = %e, "stored session rejected");
                if let Err(e) = self.credentials.clear().await {
                    warn!(error = %e, "failed to clear credentials");
                }
                self.state.send_replace(SessionState::logged_out());
            }
        }
    }

    /// Records a freshly authenticated user.
    pub fn login(&self, user: UserRecord) {
        self.state.send_replace(SessionState::logged_in(user));
    }

    /// Forgets the session and sends the UI to the login entry point.
    ///
    /// Safe to call repeatedly; never fails.
    pub async fn logout(&self) {
        if let Err(e) = self.credentials.clear().await {
            warn!(error = %e, "failed to clear credentials");
        }
        let was_logged_in = self.state.borrow().is_logged_in;
        self.state.send_replace(SessionState::logged_out());
        if was_logged_in {
            info!("logged out");
        }
        redirect_to_login(self.navigator.as_ref(), &self.login_path);
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}
