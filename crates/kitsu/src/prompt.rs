// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password acquisition via TTY prompt or the KITSU_PASSWORD environment variable.

use kitsu_core::KitsuError;
use secrecy::SecretString;

/// Environment variable consulted before prompting.
pub const PASSWORD_ENV_VAR: &str = "KITSU_PASSWORD";

/// Password from `KITSU_PASSWORD`, or an interactive prompt.
pub fn read_password(label: &str) -> Result<SecretString, KitsuError> {
    if let Ok(password) = std::env::var(PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok(SecretString::from(password));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("{label}: ");
        let password = rpassword::read_password()
            .map_err(|e| KitsuError::Internal(format!("failed to read password: {e}")))?;
        return Ok(SecretString::from(password));
    }

    Err(KitsuError::Validation(format!(
        "no password provided. Set {PASSWORD_ENV_VAR} or run interactively."
    )))
}

/// New password entered twice. The environment variable counts as both.
pub fn read_new_password() -> Result<(SecretString, SecretString), KitsuError> {
    if let Ok(password) = std::env::var(PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok((
            SecretString::from(password.clone()),
            SecretString::from(password),
        ));
    }

    let first = read_password("New password")?;
    let second = read_password("Confirm password")?;
    Ok((first, second))
}
