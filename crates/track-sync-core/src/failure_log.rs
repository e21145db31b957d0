//! Recover failed playlists from earlier run logs
//!
//! Two signatures are recognized and their results unioned:
//!
//! * an explicit `Error syncing playlist: NAME` line;
//! * an `ERROR` line mentioning `timeout`, `Connection` or `aborted` after a
//!   `Syncing playlist: NAME (N tracks)` announcement, which is charged to the
//!   most recently announced playlist.
//!
//! Works on plain text and on the JSON lines the structured logger writes.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn explicit_error_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Error syncing playlist[:\t ]+([^:\n]+)").expect("valid pattern"))
}

fn announcement_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Syncing playlist: (.+?) \(\d+ tracks\)").expect("valid pattern"))
}

fn transient_error_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"ERROR.*?(?:timeout|Connection|aborted)").expect("valid pattern"))
}

/// Names of playlists that failed according to `log_text`
pub fn extract_failed_playlist_names(log_text: &str) -> BTreeSet<String> {
    let mut failed: BTreeSet<String> = explicit_error_re()
        .captures_iter(log_text)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let mut current: Option<&str> = None;
    for line in log_text.lines() {
        if let Some(caps) = announcement_re().captures(line) {
            current = caps.get(1).map(|name| name.as_str());
        }
        if let Some(name) = current {
            if transient_error_re().is_match(line) {
                failed.insert(name.to_string());
            }
        }
    }

    failed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_error_attributed_to_announced_playlist() {
        let log = "\
INFO Syncing playlist: Rock Hits (42 tracks)
ERROR: Connection timeout
INFO Syncing playlist: Jazz (10 tracks)
INFO Playlist 'Jazz' completed";
        assert_eq!(extract_failed_playlist_names(log), names(&["Rock Hits"]));
    }

    #[test]
    fn test_explicit_error_marker() {
        let log = "\
2026-10-19T10:00:00Z ERROR track_sync_core::report: Error syncing playlist: Road Trip: playlist p1 not found
2026-10-19T10:00:01Z ERROR track_sync_core::report: Error syncing playlist Chill";
        assert_eq!(extract_failed_playlist_names(log), names(&["Road Trip", "Chill"]));
    }

    #[test]
    fn test_error_before_any_announcement_is_ignored() {
        let log = "\
ERROR: Connection refused while authenticating
INFO Syncing playlist: Jazz (10 tracks)
INFO done";
        assert!(extract_failed_playlist_names(log).is_empty());
    }

    #[test]
    fn test_multiple_playlists_and_union() {
        let log = "\
INFO Syncing playlist: A (1 tracks)
ERROR Failed to sync X - Y: search failed: qobuz request failed: operation timeout
INFO Syncing playlist: B (2 tracks)
INFO Syncing playlist: C (3 tracks)
ERROR request aborted by peer
ERROR Error syncing playlist: D: boom";
        assert_eq!(extract_failed_playlist_names(log), names(&["A", "C", "D"]));
    }

    #[test]
    fn test_non_transient_and_lowercase_errors_are_ignored() {
        let log = "\
INFO Syncing playlist: A (1 tracks)
ERROR Failed to sync X - Y: write rejected by target
error: connection timeout
WARN Connection slow";
        assert!(extract_failed_playlist_names(log).is_empty());
    }

    #[test]
    fn test_json_log_lines() {
        let log = r#"{"timestamp":"2026-10-19T10:00:00Z","level":"INFO","fields":{"message":"Syncing playlist: Road Trip (12 tracks)"}}
{"timestamp":"2026-10-19T10:00:05Z","level":"ERROR","fields":{"message":"Failed to sync A - B: search failed: Connection reset"}}"#;
        assert_eq!(extract_failed_playlist_names(log), names(&["Road Trip"]));
    }

    #[test]
    fn test_names_with_parentheses() {
        let log = "\
INFO Syncing playlist: Mix (2024) (5 tracks)
ERROR aborted";
        assert_eq!(extract_failed_playlist_names(log), names(&["Mix (2024)"]));
    }

    #[test]
    fn test_empty_log() {
        assert!(extract_failed_playlist_names("").is_empty());
    }
}
