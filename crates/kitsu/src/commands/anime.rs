// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kitsu anime` subcommands: browse the public catalog.

use kitsu_client::{Anime, AnimeQuery};
use kitsu_core::KitsuError;
use serde::Serialize;

use crate::context::App;

pub async fn list(app: &App, query: AnimeQuery, json: bool) -> Result<(), KitsuError> {
    let page = app.catalog.list(&query).await?;

    if json {
        print_json(&page);
        return Ok(());
    }

    if page.data.is_empty() {
        println!("No titles on page {}.", page.meta.page);
        return Ok(());
    }

    println!(
        "  {:<28}  {:<6}  {:<10}  {:>4}  {:>5}  {:>7}",
        "SLUG", "KIND", "STATUS", "YEAR", "SCORE", "EPS"
    );
    for anime in &page.data {
        println!(
            "  {:<28}  {:<6}  {:<10}  {:>4}  {:>5}  {:>7}",
            anime.slug,
            anime.kind.as_deref().unwrap_or("-"),
            anime.status.as_deref().unwrap_or("-"),
            anime.year.map_or_else(|| "-".to_string(), |y| y.to_string()),
            score_cell(anime.score),
            episode_count(anime),
        );
    }
    println!(
        "\n  Page {} of {} ({} titles)",
        page.meta.page, page.meta.total_pages, page.meta.total
    );
    if page.has_next() {
        println!("  Next: --page {}", page.meta.page + 1);
    }
    Ok(())
}

pub async fn show(app: &App, slug: &str, json: bool) -> Result<(), KitsuError> {
    let anime = app.catalog.get(slug).await?;
    if json {
        print_json(&anime);
        return Ok(());
    }

    if app.use_color {
        use colored::Colorize;
        println!("\n  {}", anime.title.bold());
    } else {
        println!("\n  {}", anime.title);
    }
    let alt: Vec<&str> = [anime.title_en.as_deref(), anime.title_jp.as_deref()]
        .into_iter()
        .flatten()
        .filter(|t| *t != anime.title)
        .collect();
    if !alt.is_empty() {
        println!("  {}", alt.join(" / "));
    }
    println!();
    println!("    Id:       {}", anime.id);
    if let Some(kind) = &anime.kind {
        println!("    Kind:     {kind}");
    }
    if let Some(status) = &anime.status {
        println!("    Status:   {status}");
    }
    if let Some(year) = anime.year {
        println!("    Year:     {year}");
    }
    println!("    Score:    {}", score_cell(anime.score));
    println!("    Episodes: {}", episode_count(&anime));
    if !anime.genres.is_empty() {
        println!("    Genres:   {}", anime.genres.join(", "));
    }
    if !anime.studios.is_empty() {
        println!("    Studios:  {}", anime.studios.join(", "));
    }
    if let Some(rating) = &anime.rating {
        println!("    Rating:   {rating}");
    }
    if let Some(next) = &anime.next_episode_at {
        println!("    Next ep:  {next}");
    }
    if let Some(description) = anime.description.as_deref().filter(|d| !d.is_empty()) {
        println!("\n  {description}");
    }
    println!();
    Ok(())
}

pub async fn genres(app: &App, json: bool) -> Result<(), KitsuError> {
    let genres = app.catalog.genres().await?;
    if json {
        print_json(&genres);
    } else {
        for genre in &genres {
            println!("  {genre}");
        }
    }
    Ok(())
}

pub async fn episodes(app: &App, anime_id: &str, json: bool) -> Result<(), KitsuError> {
    let episodes = app.catalog.episodes(anime_id).await?;
    if json {
        print_json(&episodes);
        return Ok(());
    }
    if episodes.is_empty() {
        println!("No episodes listed.");
        return Ok(());
    }
    for ep in &episodes {
        let number = match ep.season {
            Some(season) => format!("S{season:02}E{:02}", ep.episode),
            None => format!("E{:02}", ep.episode),
        };
        println!("  {number:<8}  {}", ep.title.as_deref().unwrap_or(""));
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
    );
}

fn score_cell(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{s:.1}"))
}

/// `aired/total`, or whichever of the two is known.
fn episode_count(anime: &Anime) -> String {
    match (anime.episodes_aired, anime.episodes_total) {
        (Some(aired), Some(total)) if aired < total => format!("{aired}/{total}"),
        (_, Some(total)) => total.to_string(),
        (Some(aired), None) => format!("{aired}/?"),
        (None, None) => "?".to_string(),
    }
}
