//! Cross-catalog track matching
//!
//! Picks the catalog candidate that most likely is the same recording as a
//! source track. A shared ISRC decides immediately. Otherwise every candidate
//! gets a weighted composite of title, artist and duration similarity and the
//! best one is accepted only above `min_score`.
//!
//! ```text
//! composite = (wt * title + wa * artist + wd * duration) / (wt + wa + wd)
//! ```
//!
//! Text is compared after normalization: case folded, featuring credits and
//! version tags ("Remastered 2011", "- Live", "[Radio Edit]") removed and
//! punctuation collapsed. Similarity is the larger of Jaro-Winkler and a
//! slightly discounted token overlap, so reordered words still score well.
//!
//! Numbers left in the normalized titles must agree: "Song 2" and "Song 3"
//! are different recordings however close the strings are.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use track_sync_config::MatchingConfig;
use track_sync_models::{Candidate, TrackDescriptor};

/// Version markers stripped from titles before comparison
const VERSION_WORDS: &str =
    r"remaster(?:ed)?|live|edit|version|mix|mono|stereo|acoustic|demo|explicit|clean|deluxe|bonus|instrumental";

/// Duration score used when either side has no duration
const UNKNOWN_DURATION_SCORE: f64 = 0.5;

fn featuring_bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s*[\(\[]\s*(?:feat\.?|ft\.?|featuring|with)\s[^\)\]]*[\)\]]")
            .expect("valid featuring pattern")
    })
}

fn featuring_tail_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s+(?:feat\.?|ft\.?|featuring)\s.*$").expect("valid featuring pattern")
    })
}

fn version_bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)\s*[\(\[][^\)\]]*\b(?:{})\b[^\)\]]*[\)\]]", VERSION_WORDS))
            .expect("valid version pattern")
    })
}

fn version_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)\s+-\s+.*\b(?:{})\b.*$", VERSION_WORDS))
            .expect("valid version pattern")
    })
}

fn artist_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s*(?:,|&|;|\bx\b|\band\b|\bfeat\.?|\bft\.?|\bfeaturing\b|\bwith\b)\s*")
            .expect("valid artist separator pattern")
    })
}

/// Lowercase, drop apostrophes, turn other punctuation into spaces, collapse whitespace
pub fn normalize_string(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_leading_the(s: &str) -> &str {
    s.strip_prefix("the ").unwrap_or(s)
}

/// Title with featuring credits and version tags removed, normalized
pub fn normalize_title(title: &str) -> String {
    let cleaned = featuring_bracket_re().replace_all(title, "");
    let cleaned = version_bracket_re().replace_all(&cleaned, "");
    let cleaned = version_suffix_re().replace(&cleaned, "");
    let cleaned = featuring_tail_re().replace(&cleaned, "");

    let normalized = normalize_string(&cleaned);
    if normalized.is_empty() {
        // Title was nothing but a tag, keep what we had
        normalize_string(title)
    } else {
        normalized
    }
}

/// Individual artists of a credit string, normalized
pub fn split_artists(artist: &str) -> Vec<String> {
    artist_separator_re()
        .split(artist)
        .map(|part| normalize_string(part))
        .map(|part| strip_leading_the(&part).to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Word-set Jaccard similarity, insensitive to word order
pub fn token_similarity(s1: &str, s2: &str) -> f64 {
    let tokens1: HashSet<&str> = s1.split_whitespace().collect();
    let tokens2: HashSet<&str> = s2.split_whitespace().collect();

    if tokens1.is_empty() && tokens2.is_empty() {
        return 1.0;
    }
    if tokens1.is_empty() || tokens2.is_empty() {
        return 0.0;
    }

    let intersection = tokens1.intersection(&tokens2).count();
    let union = tokens1.union(&tokens2).count();
    intersection as f64 / union as f64
}

/// Numeric words of a normalized title, without leading zeros, sorted
fn title_numbers(normalized: &str) -> Vec<&str> {
    let mut numbers: Vec<&str> = normalized
        .split_whitespace()
        .filter(|word| word.chars().all(|c| c.is_ascii_digit()))
        .map(|word| match word.trim_start_matches('0') {
            "" => "0",
            trimmed => trimmed,
        })
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

/// Similarity of two already-normalized strings, 0.0 to 1.0
pub fn text_similarity(s1: &str, s2: &str) -> f64 {
    if s1 == s2 {
        return 1.0;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }
    let jw = strsim::jaro_winkler(s1, s2);
    jw.max(token_similarity(s1, s2) * 0.95)
}

/// Artist credit similarity
///
/// The primary artists carry most of the weight; the rest measures how many
/// source artists appear anywhere in the candidate credit. The whole-string
/// comparison wins when it is higher, which covers band names containing "and".
pub fn artist_similarity(source: &str, candidate: &str) -> f64 {
    let whole = text_similarity(
        strip_leading_the(&normalize_string(source)),
        strip_leading_the(&normalize_string(candidate)),
    );

    let source_artists = split_artists(source);
    let candidate_artists = split_artists(candidate);
    if source_artists.is_empty() || candidate_artists.is_empty() {
        return whole;
    }

    let primary = text_similarity(&source_artists[0], &candidate_artists[0]);
    let overlap = source_artists
        .iter()
        .map(|s| {
            candidate_artists
                .iter()
                .map(|c| text_similarity(s, c))
                .fold(0.0_f64, f64::max)
        })
        .sum::<f64>()
        / source_artists.len() as f64;

    whole.max(primary * 0.7 + overlap * 0.3)
}

/// Per-field breakdown of one candidate's score
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    pub isrc_match: bool,
    pub title: f64,
    pub artist: f64,
    /// `None` when the duration difference excludes the candidate
    pub duration: Option<f64>,
    /// Weighted composite, 0.0 for excluded candidates
    pub total: f64,
    /// Duration out of range, artist too far off, or title numbers disagree
    pub excluded: bool,
}

impl MatchScore {
    pub fn summary(&self) -> String {
        let duration = self
            .duration
            .map(|d| format!("{:.0}%", d * 100.0))
            .unwrap_or_else(|| "out of range".to_string());
        format!(
            "total:{:.3} [title:{:.0}%, artist:{:.0}%, duration:{}{}]",
            self.total,
            self.title * 100.0,
            self.artist * 100.0,
            duration,
            if self.isrc_match { ", isrc" } else { "" }
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchScorer {
    config: MatchingConfig,
}

impl MatchScorer {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    fn duration_score(&self, source_ms: u64, candidate_ms: u64) -> Option<f64> {
        if source_ms == 0 || candidate_ms == 0 {
            return Some(UNKNOWN_DURATION_SCORE);
        }
        let diff = source_ms.abs_diff(candidate_ms);
        let tolerance = self.config.duration_tolerance_ms;
        let max_delta = self.config.max_duration_delta_ms;

        if diff <= tolerance {
            Some(1.0)
        } else if diff > max_delta {
            None
        } else {
            // Linear decay from 1.0 at the tolerance to 0.0 at the max delta
            Some(1.0 - (diff - tolerance) as f64 / (max_delta - tolerance) as f64)
        }
    }

    /// Score one candidate against the source track
    pub fn score(&self, source: &TrackDescriptor, candidate: &Candidate) -> MatchScore {
        let isrc_match = match (source.normalized_isrc(), candidate.track.normalized_isrc()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };

        let source_title = normalize_title(&source.title);
        let candidate_title = normalize_title(&candidate.track.title);
        let title = text_similarity(&source_title, &candidate_title);
        let artist = artist_similarity(&source.artist, &candidate.track.artist);
        let duration = self.duration_score(source.duration_ms, candidate.track.duration_ms);

        let excluded = duration.is_none()
            || artist < self.config.min_artist_similarity
            || title_numbers(&source_title) != title_numbers(&candidate_title);
        let total = match duration {
            Some(duration) if !excluded => {
                let c = &self.config;
                let weight_sum = (c.title_weight + c.artist_weight + c.duration_weight).max(f64::EPSILON);
                (c.title_weight * title + c.artist_weight * artist + c.duration_weight * duration)
                    / weight_sum
            }
            _ => 0.0,
        };

        MatchScore {
            isrc_match,
            title,
            artist,
            duration,
            total,
            excluded,
        }
    }

    /// Best candidate for `source`, or `None` when nothing clears `min_score`
    ///
    /// An ISRC match wins over any fuzzy score. Among equal composite scores
    /// the earliest candidate is kept.
    pub fn find_best_match<'a>(
        &self,
        source: &TrackDescriptor,
        candidates: &'a [Candidate],
    ) -> Option<&'a Candidate> {
        if let Some(isrc) = source.normalized_isrc() {
            if let Some(candidate) = candidates
                .iter()
                .find(|c| c.track.normalized_isrc().as_deref() == Some(isrc.as_str()))
            {
                return Some(candidate);
            }
        }

        let mut best: Option<(&Candidate, f64)> = None;
        for candidate in candidates {
            let score = self.score(source, candidate);
            if score.excluded {
                continue;
            }
            if best.map_or(true, |(_, best_total)| score.total > best_total) {
                best = Some((candidate, score.total));
            }
        }

        best.filter(|(_, total)| *total >= self.config.min_score)
            .map(|(candidate, _)| candidate)
    }
}

/// [`MatchScorer::find_best_match`] with the default weights and thresholds
pub fn find_best_match<'a>(
    source: &TrackDescriptor,
    candidates: &'a [Candidate],
) -> Option<&'a Candidate> {
    MatchScorer::default().find_best_match(source, candidates)
}
