// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kitsu - command-line client for the Kitsu platform.
//!
//! This is the binary entry point: account management against the Kitsu API,
//! catalog browsing and live monitoring of parser jobs.

mod commands;
mod context;
mod navigator;
mod prompt;
mod signal;
mod supervisor;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kitsu_client::AnimeQuery;
use kitsu_config::KitsuConfig;
use kitsu_core::KitsuError;

use crate::context::App;
use crate::navigator::{CATALOG, DASHBOARD};

/// Kitsu - command-line client for the Kitsu platform.
#[derive(Parser, Debug)]
#[command(name = "kitsu", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session.
    Login {
        /// Account email.
        email: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Create a new account.
    Register {
        email: String,
        username: String,
        /// Display name.
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Request a password reset email.
    ForgotPassword { email: String },
    /// Set a new password from a reset link.
    ResetPassword {
        /// `uid` parameter of the reset link.
        #[arg(long)]
        uid: String,
        /// `token` parameter of the reset link.
        #[arg(long)]
        token: String,
    },
    /// Confirm an email address from a verification link.
    VerifyEmail {
        #[arg(long)]
        token: String,
        #[arg(long)]
        uid: String,
    },
    /// Browse the anime catalog.
    Anime {
        #[command(subcommand)]
        action: AnimeCommand,
    },
    /// Inspect and run parser jobs.
    Jobs {
        #[command(subcommand)]
        action: JobsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AnimeCommand {
    /// List titles, with optional filters.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Titles per page (1-100).
        #[arg(long, default_value_t = kitsu_client::catalog::DEFAULT_PER_PAGE)]
        limit: u32,
        /// Free-text search.
        #[arg(long, short = 'q', visible_alias = "search")]
        query: Option<String>,
        /// `tv`, `movie`, `ova`, ...
        #[arg(long)]
        kind: Option<String>,
        /// `ongoing`, `released`, `announced`, ...
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        min_score: Option<f64>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one title.
    Show {
        slug: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List every genre in the catalog.
    Genres {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List a title's episodes.
    Episodes {
        /// Title id (not the slug).
        id: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum JobsCommand {
    /// List jobs, newest first.
    List {
        /// Page number (20 jobs per page).
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one job.
    Show {
        id: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Dispatch a parser job.
    Trigger {
        /// Parser to run, e.g. `shikimori`.
        parser: String,
        /// Job type, e.g. `full_sync`.
        #[arg(long, default_value = "full_sync")]
        job_type: String,
    },
    /// Follow a running job's live progress.
    Watch { id: String },
}

impl Commands {
    /// Logical location the command represents, for forced redirects.
    fn location(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "/login",
            Commands::Register { .. } => "/register",
            Commands::ForgotPassword { .. } => "/forgot-password",
            Commands::ResetPassword { .. } => "/reset-password",
            Commands::VerifyEmail { .. } => "/verify-email",
            Commands::Logout | Commands::Whoami { .. } => "/profile",
            Commands::Anime { .. } => CATALOG,
            Commands::Jobs { .. } => DASHBOARD,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => kitsu_config::load_and_validate_path(path),
        None => kitsu_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            kitsu_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.client.log_level);

    let use_color = !cli.plain && std::io::stdout().is_terminal();
    if let Err(e) = run(cli.command, config, use_color).await {
        if use_color {
            use colored::Colorize;
            eprintln!("{} {e}", "error:".red().bold());
        } else {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: KitsuConfig, use_color: bool) -> Result<(), KitsuError> {
    let location = match command {
        Commands::Login { .. } => config.api.login_path.clone(),
        _ => command.location().to_string(),
    };
    let app = App::new(config, &location, use_color)?;

    match command {
        Commands::Login { email } => commands::account::login(&app, email).await,
        Commands::Logout => commands::account::logout(&app).await,
        Commands::Whoami { json } => commands::account::whoami(&app, json).await,
        Commands::Register {
            email,
            username,
            full_name,
        } => commands::account::register(&app, email, username, full_name).await,
        Commands::ForgotPassword { email } => commands::account::forgot_password(&app, &email).await,
        Commands::ResetPassword { uid, token } => {
            commands::account::reset_password(&app, uid, token).await
        }
        Commands::VerifyEmail { token, uid } => {
            commands::account::verify_email(&app, &token, &uid).await
        }
        Commands::Anime { action } => match action {
            AnimeCommand::List {
                page,
                limit,
                query,
                kind,
                status,
                genre,
                year,
                min_score,
                json,
            } => {
                let query = AnimeQuery {
                    page: Some(page),
                    limit: Some(limit),
                    q: query,
                    kind,
                    status,
                    genre,
                    year,
                    min_score,
                };
                commands::anime::list(&app, query, json).await
            }
            AnimeCommand::Show { slug, json } => commands::anime::show(&app, &slug, json).await,
            AnimeCommand::Genres { json } => commands::anime::genres(&app, json).await,
            AnimeCommand::Episodes { id, json } => {
                commands::anime::episodes(&app, &id, json).await
            }
        },
        Commands::Jobs { action } => match action {
            JobsCommand::List { page, json } => commands::jobs::list(&app, page, json).await,
            JobsCommand::Show { id, json } => commands::jobs::show(&app, &id, json).await,
            JobsCommand::Trigger { parser, job_type } => {
                commands::jobs::trigger(&app, &parser, &job_type).await
            }
            JobsCommand::Watch { id } => commands::jobs::watch(&app, &id).await,
        },
    }
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kitsu={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
