//! Plain-text terminal report for a picked anime.

use crate::api::AnimeRecord;
use std::fmt::Write;

const LABEL_WIDTH: usize = 18;

/// Render the report for `anime`, with its cover URL if one was found
pub fn render(anime: &AnimeRecord, cover_url: Option<&str>) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = write_report(&mut out, anime, cover_url);
    out
}

fn write_report(out: &mut String, anime: &AnimeRecord, cover_url: Option<&str>) -> std::fmt::Result {
    let title = match anime.english_name() {
        Some(english) => format!("{} ({english})", anime.name()),
        None => anime.name().to_string(),
    };
    let rule = "═".repeat(title.chars().count() + 4);
    writeln!(out, "{rule}")?;
    writeln!(out, "  {title}")?;
    writeln!(out, "{rule}")?;

    if let Some(url) = cover_url {
        writeln!(out, "Cover: {url}")?;
    }

    if let Some(description) = anime.description() {
        writeln!(out)?;
        writeln!(out, "Description")?;
        for line in clean_description(description).lines() {
            writeln!(out, "  {line}")?;
        }
    }

    let info = info_rows(anime);
    if !info.is_empty() {
        writeln!(out)?;
        writeln!(out, "Info")?;
        for (label, value) in info {
            writeln!(out, "  {label:<LABEL_WIDTH$}{value}")?;
        }
    }

    let links = anime.links();
    if !links.is_empty() {
        let rows: Vec<[String; 3]> = links
            .into_iter()
            .map(|link| {
                let audio = match link.audio {
                    Some(audio) if !audio.is_empty() => audio.join(", "),
                    _ => "N/A".to_string(),
                };
                [link.name, audio, link.url]
            })
            .collect();

        writeln!(out)?;
        writeln!(out, "Watch Links")?;
        write_table(out, ["Platform", "Audio", "URL"], &rows)?;
    }

    let mut databases = Vec::new();
    if let Some(id) = anime.my_anime_list_id() {
        databases.push(["MyAnimeList".to_string(), format!("https://myanimelist.net/anime/{id}")]);
    }
    if let Some(id) = anime.ani_list_id() {
        databases.push(["AniList".to_string(), format!("https://anilist.co/anime/{id}")]);
    }
    if !databases.is_empty() {
        writeln!(out)?;
        writeln!(out, "Anime Database Links")?;
        write_table(out, ["Site", "URL"], &databases)?;
    }

    if let Some(trailer) = anime.trailer() {
        writeln!(out)?;
        writeln!(out, "Trailer: https://youtu.be/{trailer}")?;
    }

    Ok(())
}

fn info_rows(anime: &AnimeRecord) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();

    if let Some(episodes) = anime.display("episodes") {
        rows.push(("Episodes", episodes));
    }
    if let Some(duration) = anime.display("episode_duration") {
        rows.push(("Episode Duration", format!("{duration} min")));
    }
    if let Some(date) = anime.display("release_date") {
        rows.push(("Release Date", date));
    }
    if let Some(rating) = anime.display("tv_rating") {
        rows.push(("Rating", rating));
    }
    if let Some(source) = anime.display("source") {
        rows.push(("Source", source));
    }

    let genres = anime.list("genres");
    if !genres.is_empty() {
        rows.push(("Genres", genres.join(", ")));
    }
    let tags = anime.list("tags");
    if !tags.is_empty() {
        rows.push(("Tags", tags.join(", ")));
    }

    let mut scores = Vec::new();
    if let Some(score) = anime.display("ani_list_score") {
        scores.push(format!("AniList: {score}"));
    }
    if let Some(score) = anime.display("my_anime_list_score") {
        scores.push(format!("MyAnimeList: {score}"));
    }
    if !scores.is_empty() {
        rows.push(("Scores", scores.join(" | ")));
    }

    rows
}

fn write_table<const N: usize>(
    out: &mut String,
    header: [&str; N],
    rows: &[[String; N]],
) -> std::fmt::Result {
    let mut widths = header.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    for row in std::iter::once(header.as_slice()).chain(rows.iter().map(|r| r.as_slice())) {
        let mut line = String::from(" ");
        for (cell, width) in row.iter().zip(widths) {
            write!(line, " {cell:<width$}")?;
        }
        writeln!(out, "{}", line.trim_end())?;
    }

    Ok(())
}

/// Turn the API's HTML description into plain text
pub fn clean_description(description: &str) -> String {
    let text = description
        .replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("<br>", "\n");
    html_escape::decode_html_entities(&text).into_owned()
}
