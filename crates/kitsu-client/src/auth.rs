// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account endpoints: login, registration, password reset, email verification.
//!
//! Input is validated before anything is sent; a rejected form never reaches
//! the network.

use std::sync::Arc;

use kitsu_core::{KitsuError, UserRecord};
use reqwest::Response;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};

use crate::api::{ApiClient, ApiRequest, TokenResponse};

pub const LOGIN_PATH: &str = "/auth/login/access-token";
pub const REGISTER_PATH: &str = "/auth/register";
pub const CURRENT_USER_PATH: &str = "/users/me";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";
pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

/// Email and password as typed on the login form.
#[derive(Debug)]
pub struct LoginCredentials {
    pub email: String,
    pub password: SecretString,
}

impl LoginCredentials {
    pub fn validate(&self) -> Result<(), KitsuError> {
        validate_email(&self.email)?;
        if self.password.expose_secret().is_empty() {
            return Err(KitsuError::Validation("password is required".into()));
        }
        Ok(())
    }
}

/// New account details.
#[derive(Debug)]
pub struct RegisterCredentials {
    pub email: String,
    pub username: String,
    pub password: SecretString,
    pub full_name: Option<String>,
}

impl RegisterCredentials {
    pub fn validate(&self) -> Result<(), KitsuError> {
        validate_email(&self.email)?;
        if self.username.trim().chars().count() < MIN_USERNAME_LEN {
            return Err(KitsuError::Validation(format!(
                "username must be at least {MIN_USERNAME_LEN} characters"
            )));
        }
        validate_new_password(&self.password)
    }
}

/// A password reset as opened from the emailed link.
#[derive(Debug)]
pub struct ResetPassword {
    pub user_id: String,
    pub token: String,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

impl ResetPassword {
    pub fn validate(&self) -> Result<(), KitsuError> {
        if self.user_id.is_empty() || self.token.is_empty() {
            return Err(KitsuError::Validation(
                "invalid reset link: token or user id missing".into(),
            ));
        }
        validate_new_password(&self.new_password)?;
        if self.new_password.expose_secret() != self.confirm_password.expose_secret() {
            return Err(KitsuError::Validation("passwords do not match".into()));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Account operations over an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// Exchanges email and password for a token pair and persists it.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(), KitsuError> {
        credentials.validate()?;

        let request = ApiRequest::post(LOGIN_PATH).form([
            ("username", credentials.email.as_str()),
            ("password", credentials.password.expose_secret()),
        ]);
        let tokens: TokenResponse = self.client.send_json(request).await?;
        self.client.credentials().store(tokens.into_pair()).await?;
        info!(email = %credentials.email, "logged in");
        Ok(())
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, credentials: &RegisterCredentials) -> Result<UserRecord, KitsuError> {
        credentials.validate()?;

        let mut body = serde_json::json!({
            "email": credentials.email,
            "username": credentials.username,
            "password": credentials.password.expose_secret(),
        });
        if let Some(full_name) = &credentials.full_name {
            body["full_name"] = serde_json::Value::String(full_name.clone());
        }
        let user: UserRecord = self.client.post_json(REGISTER_PATH, body).await?;
        info!(username = %user.username, "account registered");
        Ok(user)
    }

    /// The user owning the stored access token.
    pub async fn current_user(&self) -> Result<UserRecord, KitsuError> {
        self.client.get_json(CURRENT_USER_PATH).await
    }

    /// Asks the backend to email a reset link. Returns the backend's message.
    pub async fn forgot_password(&self, email: &str) -> Result<String, KitsuError> {
        validate_email(email)?;
        let response = self
            .client
            .execute(ApiRequest::post(FORGOT_PASSWORD_PATH).json(serde_json::json!({ "email": email })))
            .await?;
        Ok(message_or(response, "If that address is registered, a reset link has been sent").await)
    }

    pub async fn reset_password(&self, reset: &ResetPassword) -> Result<String, KitsuError> {
        reset.validate()?;
        let body = serde_json::json!({
            "user_id": reset.user_id,
            "token": reset.token,
            "new_password": reset.new_password.expose_secret(),
        });
        let response = self
            .client
            .execute(ApiRequest::post(RESET_PASSWORD_PATH).json(body))
            .await?;
        Ok(message_or(response, "Password has been reset").await)
    }

    pub async fn verify_email(&self, token: &str, uid: &str) -> Result<String, KitsuError> {
        if token.is_empty() || uid.is_empty() {
            return Err(KitsuError::Validation(
                "invalid verification link: token or uid missing".into(),
            ));
        }
        let request = ApiRequest::get(VERIFY_EMAIL_PATH)
            .query("token", token)
            .query("uid", uid);
        let response = self.client.execute(request).await?;
        Ok(message_or(response, "Email verified").await)
    }
}

/// The `message` field of a 2xx body, or `fallback` when there is none.
async fn message_or(response: Response, fallback: &str) -> String {
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "could not read response body");
            return fallback.to_string();
        }
    };
    serde_json::from_slice::<MessageResponse>(&body)
        .ok()
        .and_then(|m| m.message)
        .unwrap_or_else(|| fallback.to_string())
}

/// Syntactic check only: one `@`, a non-empty local part, a dotted domain.
pub fn validate_email(email: &str) -> Result<(), KitsuError> {
    let invalid = || KitsuError::Validation(format!("invalid email address: {email:?}"));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

fn validate_new_password(password: &SecretString) -> Result<(), KitsuError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        return Err(KitsuError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn email_syntax() {
        assert!(validate_email("aya@kitsu.test").is_ok());
        assert!(validate_email("a.b+c@mail.example.org").is_ok());
        for bad in ["", "aya", "@kitsu.test", "aya@", "aya@kitsu", "aya@.test", "a y@kitsu.test", "a@b@c.io"] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn login_requires_password() {
        let creds = LoginCredentials {
            email: "aya@kitsu.test".into(),
            password: secret(""),
        };
        assert!(matches!(creds.validate(), Err(KitsuError::Validation(_))));
    }

    #[test]
    fn register_enforces_lengths() {
        let mut creds = RegisterCredentials {
            email: "aya@kitsu.test".into(),
            username: "ay".into(),
            password: secret("longenough"),
            full_name: None,
        };
        assert!(creds.validate().is_err());
        creds.username = "aya".into();
        assert!(creds.validate().is_ok());
        creds.password = secret("short");
        assert!(creds.validate().is_err());
    }

    #[test]
    fn reset_requires_link_and_matching_passwords() {
        let mut reset = ResetPassword {
            user_id: "u1".into(),
            token: "tok".into(),
            new_password: secret("password1"),
            confirm_password: secret("password2"),
        };
        let err = reset.validate().unwrap_err();
        assert!(err.to_string().contains("do not match"));

        reset.confirm_password = secret("password1");
        assert!(reset.validate().is_ok());

        reset.token.clear();
        assert!(reset.validate().is_err());
    }
}
