// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kitsu login`, `logout`, `whoami`, `register` and the password/email flows.

use kitsu_client::{LoginCredentials, RegisterCredentials, ResetPassword};
use kitsu_core::{KitsuError, UserRecord};
use secrecy::ExposeSecret;

use crate::commands::print_ok;
use crate::context::App;
use crate::prompt;

pub async fn login(app: &App, email: String) -> Result<(), KitsuError> {
    let password = prompt::read_password("Password")?;
    app.auth
        .login(&LoginCredentials { email, password })
        .await?;

    let user = app.auth.current_user().await?;
    print_ok(app, &format!("Logged in as {}", describe(&user)));
    app.session.login(user);
    Ok(())
}

pub async fn logout(app: &App) -> Result<(), KitsuError> {
    app.session.logout().await;
    print_ok(app, "Logged out");
    Ok(())
}

pub async fn whoami(app: &App, json: bool) -> Result<(), KitsuError> {
    app.session.hydrate(&app.auth).await;
    let Some(user) = app.session.snapshot().user else {
        return Err(KitsuError::Auth("not logged in".into()));
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&user).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!("{}", describe(&user));
        if let Some(name) = &user.full_name {
            println!("  Name:      {name}");
        }
        println!("  Active:    {}", if user.is_active { "yes" } else { "no" });
        if user.is_superuser {
            println!("  Role:      superuser");
        }
    }
    Ok(())
}

pub async fn register(
    app: &App,
    email: String,
    username: String,
    full_name: Option<String>,
) -> Result<(), KitsuError> {
    let (password, confirm) = prompt::read_new_password()?;
    if password.expose_secret() != confirm.expose_secret() {
        return Err(KitsuError::Validation("passwords do not match".into()));
    }

    let user = app
        .auth
        .register(&RegisterCredentials {
            email,
            username,
            password,
            full_name,
        })
        .await?;
    print_ok(
        app,
        &format!("Registered {}. Check your inbox to verify the address.", describe(&user)),
    );
    Ok(())
}

pub async fn forgot_password(app: &App, email: &str) -> Result<(), KitsuError> {
    let message = app.auth.forgot_password(email).await?;
    print_ok(app, &message);
    Ok(())
}

pub async fn reset_password(app: &App, user_id: String, token: String) -> Result<(), KitsuError> {
    let (new_password, confirm_password) = prompt::read_new_password()?;
    let message = app
        .auth
        .reset_password(&ResetPassword {
            user_id,
            token,
            new_password,
            confirm_password,
        })
        .await?;
    print_ok(app, &message);
    Ok(())
}

pub async fn verify_email(app: &App, token: &str, uid: &str) -> Result<(), KitsuError> {
    let message = app.auth.verify_email(token, uid).await?;
    print_ok(app, &message);
    Ok(())
}

fn describe(user: &UserRecord) -> String {
    format!("{} <{}>", user.username, user.email)
}
