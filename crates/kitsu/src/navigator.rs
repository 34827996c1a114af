// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal stand-in for the UI's navigation surface.
//!
//! The CLI has no pages, so each command declares the logical location it
//! represents. A forced redirect to the login entry point becomes a notice
//! telling the operator how to sign in again.

use std::sync::Mutex;

use kitsu_core::Navigator;

/// Logical location of commands that operate on an existing session.
pub const DASHBOARD: &str = "/dashboard";
/// Logical location of the public catalog commands.
pub const CATALOG: &str = "/anime";

#[derive(Debug)]
pub struct CliNavigator {
    location: Mutex<String>,
    use_color: bool,
}

impl CliNavigator {
    pub fn at(location: &str, use_color: bool) -> Self {
        Self {
            location: Mutex::new(location.to_string()),
            use_color,
        }
    }
}

impl Navigator for CliNavigator {
    fn location(&self) -> Option<String> {
        self.location.lock().ok().map(|l| l.clone())
    }

    fn redirect(&self, path: &str) {
        if let Ok(mut location) = self.location.lock() {
            *location = path.to_string();
        }
        let notice = "Session ended. Run `kitsu login` to sign in again.";
        if self.use_color {
            use colored::Colorize;
            eprintln!("{}", notice.yellow());
        } else {
            eprintln!("{notice}");
        }
    }
}
