// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Navigator that records redirects for assertion in tests.

use std::sync::Mutex;

use kitsu_core::Navigator;

/// A navigator positioned at a fixed location that records every redirect.
///
/// A redirect also moves the navigator, like a browser would.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    location: Mutex<Option<String>>,
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// A navigable context currently showing `path`.
    pub fn at(path: &str) -> Self {
        Self {
            location: Mutex::new(Some(path.to_string())),
            redirects: Mutex::new(Vec::new()),
        }
    }

    /// A context without navigable UI.
    pub fn headless() -> Self {
        Self::default()
    }

    /// All redirect targets, in order.
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().expect("navigator lock poisoned").clone()
    }

    /// Number of redirects performed.
    pub fn redirect_count(&self) -> usize {
        self.redirects.lock().expect("navigator lock poisoned").len()
    }
}

impl Navigator for RecordingNavigator {
    fn location(&self) -> Option<String> {
        self.location.lock().expect("navigator lock poisoned").clone()
    }

    fn redirect(&self, path: &str) {
        self.redirects
            .lock()
            .expect("navigator lock poisoned")
            .push(path.to_string());
        *self.location.lock().expect("navigator lock poisoned") = Some(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_moves_location() {
        let nav = RecordingNavigator::at("/dashboard");
        nav.redirect("/login");
        assert_eq!(nav.location().as_deref(), Some("/login"));
        assert_eq!(nav.redirects(), vec!["/login".to_string()]);
    }

    #[test]
    fn headless_has_no_location() {
        assert!(RecordingNavigator::headless().location().is_none());
    }
}
