//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Media Shelf - Rename, move and sort your movie and TV files
#[derive(Parser, Debug)]
#[command(name = "media-shelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    /// Configuration directory (default: platform config dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show how file names are parsed
    Parse {
        /// File names or stems to parse
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },

    /// Rename files in place to clean titles
    Rename {
        /// Files to rename
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Dry run - show what would be done
        #[arg(long)]
        dry_run: bool,

        /// Drop the original extension
        #[arg(long)]
        no_extension: bool,
    },

    /// Copy or move files to a destination folder
    Move {
        /// Files or folders to queue
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Destination folder
        #[arg(short, long, value_name = "DIR")]
        dest: PathBuf,

        /// Move instead of copy
        #[arg(long = "move")]
        move_files: bool,

        /// Rename files to clean titles on the way
        #[arg(long)]
        rename: bool,
    },

    /// Look up and cache metadata for files
    Analyze {
        /// Video files to analyze
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Look up this title instead of the parsed one
        #[arg(long, value_name = "TITLE")]
        title: Option<String>,

        /// Release year for --title
        #[arg(long, value_name = "YEAR", requires = "title")]
        year: Option<String>,

        /// Treat --title as a TV series
        #[arg(long, requires = "title")]
        tv: bool,
    },

    /// Sort files into an audience/type/genre library
    Sort {
        /// Video files to sort
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Library root (overrides the saved setting)
        #[arg(short, long, value_name = "DIR")]
        base: Option<PathBuf>,

        /// Perform the operations instead of simulating them
        #[arg(long)]
        execute: bool,

        /// Output path for the plan JSON
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Execute a saved sort plan
    Execute {
        /// Path to the plan JSON file
        #[arg(value_name = "PLAN_FILE")]
        plan_file: PathBuf,
    },

    /// Show or adjust API usage
    Usage {
        /// Only this provider (tmdb or omdb)
        #[arg(short, long)]
        provider: Option<String>,

        /// Days of history to show
        #[arg(short, long, default_value_t = 7)]
        days: u32,

        /// Set the daily limit of --provider
        #[arg(long, value_name = "N", requires = "provider")]
        set_limit: Option<u32>,
    },

    /// Manage the metadata cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show or change module settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached entries
    Show,

    /// Remove all cached entries
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Show settings of every module
    Show,

    /// Set a module setting
    Set {
        /// Setting key as MODULE.KEY (e.g. media_sorter.sort_by)
        #[arg(value_name = "KEY")]
        key: String,

        /// New value (JSON, or a plain string)
        #[arg(value_name = "VALUE")]
        value: String,
    },
}
