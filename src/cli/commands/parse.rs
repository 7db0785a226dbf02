//! Parse command implementation.

use crate::core::parser;
use crate::utils::fs::{file_stem_string, is_video_file};
use colored::Colorize;
use std::path::Path;

/// Print the parsed fields and canonical name of each input.
pub fn parse(names: &[String]) {
    for name in names {
        let path = Path::new(name);
        let stem = if is_video_file(path) {
            file_stem_string(path)
        } else {
            name.clone()
        };

        let (info, pattern) = parser::parse_with_pattern(&stem);
        println!("{}", name.bold());
        println!("  {} {}", "Title:".bold(), info.title);
        if let Some(ref year) = info.year {
            println!("  {} {}", "Year:".bold(), year);
        }
        if let (Some(season), Some(episode)) = (info.season, info.episode) {
            println!("  {} S{:02}E{:02}", "Episode:".bold(), season, episode);
        }
        println!("  {} {}", "Kind:".bold(), info.kind());
        println!("  {} {}", "Matched:".bold(), pattern.to_string().dimmed());
        println!("  {} {}", "Canonical:".bold(), parser::generate_filename(&info).green());
        println!();
    }
}
