//! Integration tests for the filename parser.
//!
//! Tests cover:
//! - Release-style movie names
//! - Series markers
//! - Resolution/year disambiguation
//! - Which pattern claims each filename form
//! - Canonical name generation and idempotence

use media_shelf::core::parser::{
    canonical_stem, clean_title, generate_filename, parse_filename, parse_with_pattern,
    rename_with_extension, MatchedPattern,
};
use media_shelf::models::media::{MediaInfo, MediaKind};
use std::path::Path;

// ========== MOVIE TESTS ==========

#[test]
fn test_release_group_suffix() {
    let info = parse_filename("Richie.Rich.1994.720p.WEBRip.x264-[YTS.AM]");
    assert_eq!(info.title, "Richie Rich");
    assert_eq!(info.year.as_deref(), Some("1994"));
    assert_eq!(info.kind(), MediaKind::Movie);
}

#[test]
fn test_year_followed_by_resolution_in_parentheses() {
    let info = parse_filename("Hotel Transylvania 2012 (1080)");
    assert_eq!(info, MediaInfo::movie("Hotel Transylvania", "2012"));
}

#[test]
fn test_year_before_resolution() {
    let info = parse_filename("The.Matrix.1999.1080p.BluRay.x264");
    assert_eq!(info.title, "The Matrix");
    assert_eq!(info.year.as_deref(), Some("1999"));
}

#[test]
fn test_resolution_is_not_a_year() {
    let info = parse_filename("Movie.1080p.2021.BluRay");
    assert_eq!(info.year.as_deref(), Some("2021"));
}

#[test]
fn test_plain_space_separated_year() {
    assert_eq!(parse_filename("Inception 2010"), MediaInfo::movie("Inception", "2010"));
}

#[test]
fn test_parenthesized_year() {
    assert_eq!(
        parse_filename("The Matrix (1999)"),
        MediaInfo::movie("The Matrix", "1999")
    );
}

// ========== SERIES TESTS ==========

#[test]
fn test_season_episode_marker() {
    let info = parse_filename("Breaking.Bad.S05E14.720p");
    assert_eq!(info, MediaInfo::episode("Breaking Bad", 5, 14));
    assert!(info.is_series());
}

#[test]
fn test_cross_marker() {
    let info = parse_filename("TV.Show.1x02");
    assert_eq!(info, MediaInfo::episode("Tv Show", 1, 2));
}

#[test]
fn test_series_wins_over_year() {
    let info = parse_filename("Show.Name.2019.S02E05.720p");
    assert_eq!(info.season, Some(2));
    assert_eq!(info.episode, Some(5));
    assert!(info.year.is_none());
}

// ========== PATTERN ORDER TESTS ==========

fn assert_parsed(stem: &str, expected: MediaInfo, pattern: MatchedPattern) {
    assert_eq!(parse_with_pattern(stem), (expected, pattern), "stem: {}", stem);
}

#[test]
fn test_canonical_series_form() {
    assert_parsed(
        "Show - S100E01",
        MediaInfo::episode("Show", 100, 1),
        MatchedPattern::CanonicalSeries,
    );
}

#[test]
fn test_canonical_movie_form() {
    assert_parsed(
        "Space 1999 (1975)",
        MediaInfo::movie("Space 1999", "1975"),
        MatchedPattern::CanonicalMovie,
    );
}

#[test]
fn test_series_pattern_0_season_episode() {
    assert_parsed(
        "Greys.Anatomy.S17E03.HDTV.x264-PHOENiX",
        MediaInfo::episode("Greys Anatomy", 17, 3),
        MatchedPattern::Series(0),
    );
}

#[test]
fn test_series_pattern_1_cross() {
    assert_parsed("TV.Show.1x02", MediaInfo::episode("Tv Show", 1, 2), MatchedPattern::Series(1));
}

#[test]
fn test_series_pattern_2_dash_with_episode_title() {
    assert_parsed(
        "Show Name - S01E02 - Pilot",
        MediaInfo::episode("Show Name", 1, 2),
        MatchedPattern::Series(2),
    );
}

#[test]
fn test_movie_pattern_0_generic_year() {
    assert_parsed(
        "Hamilton.2020.720p.WEBRip.x264.AAC-[YTS.MX]",
        MediaInfo::movie("Hamilton", "2020"),
        MatchedPattern::Movie(0),
    );
    assert_parsed(
        "Movie Name [2024]",
        MediaInfo::movie("Movie Name", "2024"),
        MatchedPattern::Movie(0),
    );
}

#[test]
fn test_movie_pattern_1_form_is_claimed_by_generic_pattern() {
    // The generic pattern accepts an optional bracket around the year, so
    // the dotted parenthesized form never reaches pattern 1.
    assert_parsed(
        "Movie.Name.(2021)",
        MediaInfo::movie("Movie Name", "2021"),
        MatchedPattern::Movie(0),
    );
}

#[test]
fn test_movie_pattern_2_year_between_separators() {
    assert_parsed(
        "Godzilla.vs.Kong.2021.1080p.WEBRip.x264-RARBG",
        MediaInfo::movie("Godzilla Vs Kong", "2021"),
        MatchedPattern::Movie(2),
    );
    assert_parsed(
        "The.Matrix.1999.1080p.BluRay.x264",
        MediaInfo::movie("The Matrix", "1999"),
        MatchedPattern::Movie(2),
    );
}

#[test]
fn test_movie_pattern_3_parenthesized_after_separator() {
    assert_parsed(
        "Spider-Man_(2002)",
        MediaInfo::movie("Spider-man", "2002"),
        MatchedPattern::Movie(3),
    );
}

#[test]
fn test_movie_pattern_4_bracketed_year() {
    assert_parsed(
        "Crouching-Tiger [2000]",
        MediaInfo::movie("Crouching-tiger", "2000"),
        MatchedPattern::Movie(4),
    );
}

#[test]
fn test_movie_pattern_5_release_group() {
    assert_parsed(
        "X-Men 1080 Cut.2000.YIFY",
        MediaInfo::movie("X-men 1080 Cut", "2000"),
        MatchedPattern::Movie(5),
    );
}

#[test]
fn test_movie_pattern_6_quality_tag() {
    assert_parsed(
        "X-Men 1080 Cut.2000.BluRay",
        MediaInfo::movie("X-men 1080 Cut", "2000"),
        MatchedPattern::Movie(6),
    );
}

#[test]
fn test_movie_pattern_7_distributor_tag() {
    assert_parsed(
        "X-Men 1080 Cut.2000.Netflix",
        MediaInfo::movie("X-men 1080 Cut", "2000"),
        MatchedPattern::Movie(7),
    );
    assert_eq!(
        parse_filename("A.Christmas.Wish.2019.Lifetime.720p"),
        MediaInfo::movie("A Christmas Wish", "2019")
    );
}

#[test]
fn test_movie_pattern_8_year_not_followed_by_resolution() {
    assert_parsed(
        "X-Men 1080 pack 2000 edition",
        MediaInfo::movie("X-men 1080 Pack", "2000"),
        MatchedPattern::Movie(8),
    );
}

#[test]
fn test_movie_pattern_9_space_separated_year() {
    assert_parsed(
        "X-Men.1080 2000 (Director's Cut)",
        MediaInfo::movie("X-men 1080", "2000"),
        MatchedPattern::Movie(9),
    );
}

#[test]
fn test_no_pattern_falls_back_to_title() {
    assert_parsed(
        "home_video_final",
        MediaInfo::titled("Home Video Final"),
        MatchedPattern::Fallback,
    );
}

// ========== FALLBACK TESTS ==========

#[test]
fn test_title_only_fallback() {
    let info = parse_filename("home_video_final");
    assert_eq!(info, MediaInfo::titled("Home Video Final"));
    assert_eq!(info.kind(), MediaKind::Unknown);
}

#[test]
fn test_out_of_range_year_is_ignored() {
    let info = parse_filename("Robot 3000");
    assert!(info.year.is_none());
    assert_eq!(info.title, "Robot 3000");
}

#[test]
fn test_clean_title() {
    assert_eq!(clean_title("the_big.lebowski"), "The Big Lebowski");
}

// ========== GENERATION TESTS ==========

#[test]
fn test_generated_names() {
    assert_eq!(
        canonical_stem("Richie.Rich.1994.720p.WEBRip.x264-[YTS.AM]"),
        "Richie Rich (1994)"
    );
    assert_eq!(canonical_stem("TV.Show.1x02"), "Tv Show - S01E02");
    assert_eq!(
        generate_filename(&MediaInfo::episode("Show", 10, 100)),
        "Show - S10E100"
    );
}

#[test]
fn test_rename_with_extension() {
    assert_eq!(
        rename_with_extension(Path::new("/in/Hotel Transylvania 2012 (1080).mp4")),
        "Hotel Transylvania (2012).mp4"
    );
}

#[test]
fn test_generation_is_idempotent() {
    let inputs = [
        "Richie.Rich.1994.720p.WEBRip.x264-[YTS.AM]",
        "Hotel Transylvania 2012 (1080)",
        "The.Matrix.1999.1080p.BluRay.x264",
        "Breaking.Bad.S05E14.720p",
        "TV.Show.1x02",
        "home_video_final",
    ];

    for input in inputs {
        let once = canonical_stem(input);
        let twice = canonical_stem(&once);
        assert_eq!(once, twice, "not idempotent for {}", input);
    }
}

#[test]
fn test_constructed_records_round_trip() {
    let records = [
        MediaInfo::movie("Space 1999", "1975"),
        MediaInfo::movie("Blade Runner 2049", "2017"),
        MediaInfo::movie("2001 A Space Odyssey", "1968"),
        MediaInfo::movie("Spider-man", "2002"),
        MediaInfo::movie("Up", "2009"),
        MediaInfo::episode("Show", 100, 1),
        MediaInfo::episode("Space 1999", 1, 2),
        MediaInfo::episode("The 100", 7, 16),
        MediaInfo::episode("Doctor Who", 12, 1000),
        MediaInfo::titled("Home Video"),
        MediaInfo::titled("Robot 3000"),
    ];

    for record in records {
        let generated = generate_filename(&record);
        let reparsed = parse_filename(&generated);
        assert_eq!(reparsed, record, "reparse of {}", generated);
        assert_eq!(generate_filename(&reparsed), generated);
    }
}
