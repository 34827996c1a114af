// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod account;
pub mod anime;
pub mod jobs;

use crate::context::App;

/// Print a success line, with a green check when colors are on.
pub(crate) fn print_ok(app: &App, message: &str) {
    if app.use_color {
        use colored::Colorize;
        println!("{} {message}", "✓".green());
    } else {
        println!("[OK] {message}");
    }
}
