// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the client core and its collaborators.

pub mod credentials;
pub mod navigator;

pub use credentials::CredentialStore;
pub use navigator::Navigator;
