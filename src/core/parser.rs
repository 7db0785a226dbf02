//! Filename parser module.
//!
//! Turns release-style filename stems such as
//! `Godzilla.vs.Kong.2021.1080p.WEBRip.x264-RARBG` into a [`MediaInfo`]
//! and generates canonical names from it:
//! - Series: `Show Name - S01E02`
//! - Movies: `Movie Name (2021)`
//! - Anything else: `Clean Title`
//!
//! Pattern order is significant. The two canonical forms are tried first,
//! so a generated name always parses back to itself. Series patterns come
//! next, then movie patterns; within each list the first accepted match
//! wins.

use crate::models::media::MediaInfo;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

/// Canonical series name as produced by [`generate_filename`].
const CANONICAL_SERIES_PATTERN: &str = r"^(.+) - S(\d+)E(\d+)$";

/// Canonical movie name as produced by [`generate_filename`].
const CANONICAL_MOVIE_PATTERN: &str = r"^(.+) \((\d{4})\)$";

/// Series patterns: title tokens followed by season/episode markers.
const SERIES_PATTERNS: &[&str] = &[
    // Show.Name.S01E02
    r"^((?:[A-Za-z0-9.]+[. ])*?)S(\d{1,2})E(\d{1,2})",
    // Show.Name.1x02
    r"^((?:[A-Za-z0-9.]+[. ])*?)(\d{1,2})x(\d{1,2})",
    // Show Name - S01E02 - Episode Title
    r"^(.+?)\s+-\s+S(\d{1,3})E(\d{1,3})",
];

/// Movie patterns: title tokens followed by a release year.
const MOVIE_PATTERNS: &[&str] = &[
    // Movie.Name.2024.1080p, Movie Name [2024]
    r"^((?:[A-Za-z0-9.]+[. ])*?)(?:[\[(]?(\d{4})[\])]?)",
    // Movie.Name.(2024)
    r"^((?:[A-Za-z0-9.]+[. ])*?)\((\d{4})\)",
    // Anything followed by a year between separators
    r"^(.*?)[.\s](\d{4})[.\s]",
    // Title (year) with any separator
    r"^(.*?)[_\-.\s]\((\d{4})\)",
    // Title [year]
    r"^(.*?)[.\s]\[(\d{4})\]",
    // Release group tags: Movie.2020.720p.WEBRip-[YTS.MX]
    r"^(.*?)\.(\d{4})\..*?\[?(?:YTS|YIFY|RARBG).*?\]?.*?$",
    // Quality/source tags after the year
    r"^(.*?)\.(\d{4})\.(?:.*?(?:WEBRip|BluRay|HDRip|DVDRip|BRRip)).*?$",
    // Distributor/network tags after the year
    r"^(.*?)\.(\d{4})\.(?:.*?(?:Lifetime|Netflix|Disney|HBO|Amazon)).*?$",
    // Year not directly followed by a p/i resolution suffix
    r"^(.*?)[.\s](\d{4})[.\s](?:[^pi].*)?$",
    // Movie Name 2020 (1080p)
    r"^(.*?)\s+(\d{4})\s+(?:\(.*?\)|\[.*?\]|.*?)$",
];

/// Tokens that mean a four digit number is a resolution or codec, not a year.
const NON_YEAR_TOKENS: &[&str] = &[
    "1080p", "1080i", "720p", "720i", "480p", "480i", "2160p", "4k", "uhd", "x264", "x265",
    "hevc", "xvid", "mp4", "mkv",
];

const MIN_YEAR: u32 = 1900;
const MAX_YEAR: u32 = 2030;

const UNTITLED: &str = "Untitled";

static CANONICAL_SERIES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CANONICAL_SERIES_PATTERN).unwrap());
static CANONICAL_MOVIE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CANONICAL_MOVIE_PATTERN).unwrap());
static SERIES_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(SERIES_PATTERNS));
static MOVIE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(MOVIE_PATTERNS));
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[._]").unwrap());
static UNWANTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// Why a movie pattern candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    ResolutionToken,
    OutOfRange,
    EmptyTitle,
}

/// Clean up a title: separators become spaces, punctuation is dropped and
/// every word is capitalized.
pub fn clean_title(raw: &str) -> String {
    let spaced = SEPARATOR_RE.replace_all(raw, " ");
    let stripped = UNWANTED_RE.replace_all(&spaced, "");

    stripped
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Check a candidate year against the resolution vocabulary and valid range.
fn check_year(year: &str) -> Option<Rejection> {
    let as_resolution = format!("{}p", year).to_lowercase();
    if NON_YEAR_TOKENS.iter().any(|t| as_resolution.contains(t)) {
        return Some(Rejection::ResolutionToken);
    }

    match year.parse::<u32>() {
        Ok(y) if (MIN_YEAR..=MAX_YEAR).contains(&y) => None,
        _ => Some(Rejection::OutOfRange),
    }
}

/// Which pattern produced a parse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedPattern {
    /// `Show Name - S01E02`
    CanonicalSeries,
    /// `Movie Name (2021)`
    CanonicalMovie,
    /// Index into the series pattern list.
    Series(usize),
    /// Index into the movie pattern list.
    Movie(usize),
    /// Title only.
    Fallback,
}

impl fmt::Display for MatchedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchedPattern::CanonicalSeries => write!(f, "canonical series"),
            MatchedPattern::CanonicalMovie => write!(f, "canonical movie"),
            MatchedPattern::Series(idx) => write!(f, "series pattern {}", idx),
            MatchedPattern::Movie(idx) => write!(f, "movie pattern {}", idx),
            MatchedPattern::Fallback => write!(f, "title only"),
        }
    }
}

fn series_candidate(re: &Regex, stem: &str) -> Option<MediaInfo> {
    let caps = re.captures(stem)?;
    let season = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let episode = caps.get(3)?.as_str().parse::<u32>().ok()?;

    let title = clean_title(caps.get(1).map_or("", |m| m.as_str()));
    if title.is_empty() {
        tracing::debug!("Series pattern matched without a title, skipping");
        return None;
    }
    Some(MediaInfo::episode(title, season, episode))
}

fn movie_candidate(re: &Regex, stem: &str) -> Option<MediaInfo> {
    let caps = re.captures(stem)?;
    let year = caps.get(2)?.as_str();

    if let Some(reason) = check_year(year) {
        tracing::debug!("Rejected year '{}': {:?}", year, reason);
        return None;
    }

    let title = clean_title(caps.get(1).map_or("", |m| m.as_str()));
    if title.is_empty() {
        tracing::debug!("Rejected year '{}': {:?}", year, Rejection::EmptyTitle);
        return None;
    }
    Some(MediaInfo::movie(title, year))
}

/// Parse a filename stem into media information.
///
/// Never fails: input that matches no pattern degrades to a title-only
/// result built from the whole stem.
pub fn parse_filename(stem: &str) -> MediaInfo {
    parse_with_pattern(stem).0
}

/// Parse a filename stem and report which pattern matched.
///
/// Canonical names are recognised first, then the series list, then the
/// movie list.
pub fn parse_with_pattern(stem: &str) -> (MediaInfo, MatchedPattern) {
    tracing::debug!("Parsing filename: {}", stem);

    if let Some(info) = series_candidate(&CANONICAL_SERIES_RE, stem) {
        return (info, MatchedPattern::CanonicalSeries);
    }
    if let Some(info) = movie_candidate(&CANONICAL_MOVIE_RE, stem) {
        return (info, MatchedPattern::CanonicalMovie);
    }

    for (idx, re) in SERIES_RES.iter().enumerate() {
        if let Some(info) = series_candidate(re, stem) {
            tracing::debug!("Matched series pattern {}: {}", idx, generate_filename(&info));
            return (info, MatchedPattern::Series(idx));
        }
    }

    for (idx, re) in MOVIE_RES.iter().enumerate() {
        if let Some(info) = movie_candidate(re, stem) {
            tracing::debug!("Matched movie pattern {}: {}", idx, generate_filename(&info));
            return (info, MatchedPattern::Movie(idx));
        }
    }

    tracing::debug!("No pattern matched, using clean title only");
    let title = clean_title(stem);
    let info = if !title.is_empty() {
        MediaInfo::titled(title)
    } else if stem.trim().is_empty() {
        MediaInfo::titled(UNTITLED)
    } else {
        MediaInfo::titled(stem.trim())
    };
    (info, MatchedPattern::Fallback)
}

/// Generate a canonical filename stem.
pub fn generate_filename(info: &MediaInfo) -> String {
    match (info.season, info.episode, info.year.as_deref()) {
        (Some(season), Some(episode), _) => {
            format!("{} - S{:02}E{:02}", info.title, season, episode)
        }
        (_, _, Some(year)) => format!("{} ({})", info.title, year),
        _ => info.title.clone(),
    }
}

/// Parse a stem and regenerate its canonical form.
pub fn canonical_stem(stem: &str) -> String {
    generate_filename(&parse_filename(stem))
}

/// Canonical file name for a path, keeping the original extension.
pub fn rename_with_extension(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let new_stem = canonical_stem(&stem);

    match path.extension() {
        Some(ext) => format!("{}.{}", new_stem, ext.to_string_lossy()),
        None => new_stem,
    }
}
