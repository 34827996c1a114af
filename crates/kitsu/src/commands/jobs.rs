// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kitsu jobs` subcommands: list, show, trigger and the live watch view.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use kitsu_client::{DashboardService, JobDisplay};
use kitsu_core::{ChannelStatus, JobStats, KitsuError, ParserJob};
use kitsu_telemetry::ChannelView;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::commands::print_ok;
use crate::context::App;
use crate::signal::install_signal_handler;
use crate::supervisor::ViewSupervisor;

/// How many times a crashed watch view is restarted before giving up.
const MAX_VIEW_RESTARTS: u32 = 3;

pub async fn list(app: &App, page: u32, json: bool) -> Result<(), KitsuError> {
    let jobs = app.dashboard.list_jobs(page.max(1)).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&jobs).unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    if jobs.is_empty() {
        println!("No jobs on page {page}.");
        return Ok(());
    }

    println!(
        "  {:<8}  {:<14}  {:<12}  {:<10}  {:>5}  {}",
        "ID", "PARSER", "TYPE", "STATUS", "PROG", "CREATED"
    );
    for job in &jobs {
        println!(
            "  {:<8}  {:<14}  {:<12}  {}  {:>4.0}%  {}",
            short_id(&job.id),
            job.parser_name,
            job.job_type,
            status_cell(&job.status, app.use_color),
            job.progress,
            format_timestamp(&job.created_at),
        );
    }
    Ok(())
}

pub async fn show(app: &App, job_id: &str, json: bool) -> Result<(), KitsuError> {
    let job = app.dashboard.get_job(job_id).await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&job).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        print_job(&JobDisplay::merge(job, None), app.use_color);
    }
    Ok(())
}

pub async fn trigger(app: &App, parser_name: &str, job_type: &str) -> Result<(), KitsuError> {
    let triggered = app.dashboard.trigger_job(parser_name, job_type).await?;
    print_ok(
        app,
        &format!(
            "Triggered {parser_name} {job_type}: job {} ({})",
            triggered.job_id, triggered.status
        ),
    );
    println!("  Follow it with: kitsu jobs watch {}", triggered.job_id);
    Ok(())
}

/// Follow a job's live telemetry until it finishes or the user interrupts.
pub async fn watch(app: &App, job_id: &str) -> Result<(), KitsuError> {
    let job = app.dashboard.get_job(job_id).await?;
    if is_finished(&job.status) {
        print_job(&JobDisplay::merge(job, None), app.use_color);
        return Ok(());
    }

    let channel = app.telemetry()?;
    channel.set_job(Some(job.id.clone()));
    let updates = channel.subscribe();
    let interrupted = install_signal_handler();
    let mut supervisor = ViewSupervisor::new(MAX_VIEW_RESTARTS);

    let result = supervisor
        .run(|attempt| {
            if attempt > 0 {
                debug!(attempt, "restarting watch view");
            }
            render(
                job.clone(),
                app.dashboard.clone(),
                updates.clone(),
                interrupted.clone(),
            )
        })
        .await;

    // Stops any in-flight render and the connection task.
    interrupted.cancel();
    channel.clear();

    let recovered = result?;
    if recovered > 0 {
        debug!(recovered, "watch view recovered from display errors");
    }
    Ok(())
}

/// One instance of the live view. Returns when the job reaches 100% or a
/// terminal status, the channel goes away, or `stop` fires.
///
/// Every drop of the live connection re-reads the job, since a job that ends
/// without reaching 100% never sends a final frame.
async fn render(
    mut job: ParserJob,
    dashboard: DashboardService,
    mut updates: watch::Receiver<ChannelView>,
    stop: CancellationToken,
) {
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template("{prefix} {spinner} [{bar:40}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_prefix(job.parser_name.clone());
    bar.enable_steady_tick(Duration::from_millis(120));

    let mut last_status = None;
    loop {
        let view = updates.borrow_and_update().clone();

        if view.status == ChannelStatus::Disconnected
            && last_status != Some(ChannelStatus::Disconnected)
        {
            match dashboard.get_job(&job.id).await {
                Ok(latest) if is_finished(&latest.status) => {
                    bar.finish_with_message(format!(
                        "{} | {}",
                        latest.status,
                        stats_line(&latest.stats())
                    ));
                    return;
                }
                Ok(latest) => job = latest,
                Err(e) => debug!(job_id = %job.id, error = %e, "could not re-read job"),
            }
        }
        last_status = Some(view.status);

        let display = JobDisplay::merge(job.clone(), view.snapshot.as_ref());
        bar.set_position(display.progress.clamp(0.0, 100.0) as u64);
        bar.set_message(status_line(view.status, &display.stats));

        if display.live && display.progress >= 100.0 {
            bar.finish_with_message(format!("done | {}", stats_line(&display.stats)));
            return;
        }

        tokio::select! {
            _ = stop.cancelled() => {
                bar.abandon();
                return;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    bar.abandon();
                    return;
                }
            }
        }
    }
}

fn print_job(display: &JobDisplay, use_color: bool) {
    let job = &display.job;
    println!();
    println!("  job {}", job.id);
    println!("  {}", "-".repeat(40));
    println!("    Parser:    {} ({})", job.parser_name, job.job_type);
    println!("    Status:    {}", status_cell(&job.status, use_color));
    println!("    Progress:  {:.0}%", display.progress);
    println!("    Items:     {}", stats_line(&display.stats));
    println!("    Created:   {}", format_timestamp(&job.created_at));
    if let Some(started) = &job.started_at {
        println!("    Started:   {}", format_timestamp(started));
    }
    if let Some(completed) = &job.completed_at {
        println!("    Completed: {}", format_timestamp(completed));
    }
    if let Some(secs) = job.duration_seconds {
        println!("    Duration:  {}", format_duration(secs));
    }
    if let Some(error) = &job.error_message {
        if use_color {
            use colored::Colorize;
            println!("    Error:     {}", error.red());
        } else {
            println!("    Error:     {error}");
        }
    }
    println!();
}

fn is_finished(status: &str) -> bool {
    matches!(status, "completed" | "failed" | "cancelled")
}

fn status_cell(status: &str, use_color: bool) -> String {
    let padded = format!("{status:<10}");
    if !use_color {
        return padded;
    }
    use colored::Colorize;
    match status {
        "completed" => padded.green().to_string(),
        "failed" => padded.red().to_string(),
        "running" => padded.cyan().to_string(),
        _ => padded.yellow().to_string(),
    }
}

fn status_line(status: ChannelStatus, stats: &JobStats) -> String {
    format!("{status} | {}", stats_line(stats))
}

fn stats_line(stats: &JobStats) -> String {
    format!(
        "processed {} · created {} · updated {} · failed {} · skipped {}",
        stats.proc, stats.create, stats.update, stats.fail, stats.skip
    )
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Human-readable duration, e.g. `1h 2m 5s`.
fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Backend timestamps come as RFC 3339 or as naive ISO 8601 in UTC.
fn format_timestamp(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}
