// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Navigation seam used for forced redirects to the login entry point.

/// The UI's navigation surface as seen by the client core.
pub trait Navigator: Send + Sync {
    /// Current location path, or `None` when there is no navigable UI
    /// (background tasks, scripts).
    fn location(&self) -> Option<String>;

    /// Move the UI to `path`.
    fn redirect(&self, path: &str);
}

/// Navigator for contexts with no UI; never redirects.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl Navigator for Headless {
    fn location(&self) -> Option<String> {
        None
    }

    fn redirect(&self, _path: &str) {}
}

/// Redirects to `login_path` unless the context is headless or already
/// somewhere under the login entry point. Returns whether a redirect happened.
pub fn redirect_to_login(navigator: &dyn Navigator, login_path: &str) -> bool {
    match navigator.location() {
        Some(current) if !current.starts_with(login_path) => {
            tracing::info!(from = %current, to = %login_path, "redirecting to login");
            navigator.redirect(login_path);
            true
        }
        _ => false,
    }
}
