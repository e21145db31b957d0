use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use track_sync_core::{PlaylistRunSummary, PlaylistStatus, SyncStatistics};

/// Failures listed under a summary before the rest is elided
const MAX_LISTED_FAILURES: usize = 20;

fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn header(title: &str) -> Cell {
    Cell::new(title)
        .fg(comfy_table::Color::Cyan)
        .add_attribute(comfy_table::Attribute::Bold)
}

/// Counter table, one row per counter
pub fn counters_table(title: &str, counters: &BTreeMap<&'static str, usize>) -> Table {
    let mut table = styled_table();
    table.set_header(vec![header(title), header("Tracks")]);
    for (name, count) in counters {
        table.add_row(vec![Cell::new(name), Cell::new(count)]);
    }
    table
}

/// One row per playlist of the run
pub fn playlists_table(summary: &PlaylistRunSummary) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        header("Playlist"),
        header("Status"),
        header("Tracks"),
        header("Matched"),
        header("Present"),
        header("Not found"),
        header("No match"),
        header("Failed"),
    ]);

    for result in &summary.results {
        let status = match result.status {
            PlaylistStatus::Synced if result.created => "✓ created".green().to_string(),
            PlaylistStatus::Synced => "✓ synced".green().to_string(),
            PlaylistStatus::Skipped => "- exists".yellow().to_string(),
            PlaylistStatus::Failed => "✗ failed".red().to_string(),
        };
        let stats = &result.stats;
        table.add_row(vec![
            Cell::new(&result.name),
            Cell::new(status),
            Cell::new(stats.total),
            Cell::new(stats.matched),
            Cell::new(stats.already_present),
            Cell::new(stats.not_found),
            Cell::new(stats.skipped_no_match),
            Cell::new(stats.failed),
        ]);
    }
    table
}

/// Tracks that failed, capped at a screenful
pub fn failure_lines(stats: &SyncStatistics) -> Vec<String> {
    let failures: Vec<_> = stats.failures().collect();
    let mut lines: Vec<String> = failures
        .iter()
        .take(MAX_LISTED_FAILURES)
        .map(|f| format!("  {} {}: {}", "✗".red(), f.track, f.detail.as_deref().unwrap_or("unknown error")))
        .collect();
    if failures.len() > MAX_LISTED_FAILURES {
        lines.push(format!("  ... and {} more (see the run log)", failures.len() - MAX_LISTED_FAILURES));
    }
    lines
}
