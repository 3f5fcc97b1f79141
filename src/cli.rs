//! Command-line interface definitions.
//!
//! API keys can be passed as flags or through the environment; flags and
//! environment win over `config.yaml`.

use crate::catalog::{CATEGORIES, DateRange, SOURCES, SortKey};
use crate::config::Config;
use crate::providers::nyt::POPULAR_PERIODS;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Latest headlines from every provider
/// news_aggregator search
///
/// # Search The Guardian for this week's climate coverage, as JSON
/// news_aggregator search climate --source "The Guardian" --date-range "This Week" --json
///
/// # Remember a favorite category
/// news_aggregator prefs toggle-category Technology
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", global = true, hide_env_values = true)]
    pub newsapi_key: Option<String>,

    /// The Guardian Open Platform key
    #[arg(long, env = "GUARDIAN_API_KEY", global = true, hide_env_values = true)]
    pub guardian_key: Option<String>,

    /// New York Times API key
    #[arg(long, env = "NYT_API_KEY", global = true, hide_env_values = true)]
    pub nyt_key: Option<String>,

    /// File holding persisted preferences
    #[arg(long, env = "NEWS_AGGREGATOR_STORAGE", global = true)]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Layer flag and environment values over the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(key) = &self.newsapi_key {
            config.newsapi_key = Some(key.clone());
        }
        if let Some(key) = &self.guardian_key {
            config.guardian_key = Some(key.clone());
        }
        if let Some(key) = &self.nyt_key {
            config.nyt_key = Some(key.clone());
        }
        if let Some(path) = &self.storage {
            config.storage_path = Some(path.clone());
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search and page through merged articles
    Search(SearchArgs),
    /// List the available categories, sources, date ranges and sort keys
    Options,
    /// List the sections a provider exposes
    Sections {
        /// Provider source label
        #[arg(long, value_parser = provider_label)]
        source: String,
    },
    /// Search The Guardian's tags (keywords, contributors, series)
    Tags {
        /// Free-text filter on tag names
        query: Option<String>,
    },
    /// Most viewed New York Times articles
    Popular {
        /// Window in days
        #[arg(long, default_value_t = 1, value_parser = popular_period)]
        period: u32,
        /// Print JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },
    /// Show or edit stored preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Free-text query; omit for headlines
    pub query: Option<String>,

    /// Category filter (defaults to the first preferred category)
    #[arg(long, value_parser = category_label)]
    pub category: Option<String>,

    /// Source filter (defaults to the first preferred source)
    #[arg(long, value_parser = source_label)]
    pub source: Option<String>,

    /// One of: All Time, Today, This Week, This Month
    #[arg(long)]
    pub date_range: Option<DateRange>,

    /// One of: Date (Newest), Date (Oldest), Title (A-Z), Source (A-Z)
    #[arg(long)]
    pub sort_by: Option<SortKey>,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Results per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Print JSON instead of Markdown
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON page to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum PrefsAction {
    /// Print stored preferences
    Show,
    /// Add or remove a preferred source
    ToggleSource {
        #[arg(value_parser = provider_label)]
        source: String,
    },
    /// Add or remove a preferred category
    ToggleCategory {
        #[arg(value_parser = provider_category_label)]
        category: String,
    },
    /// Add a preferred author
    AddAuthor { author: String },
    /// Remove a preferred author
    RemoveAuthor { author: String },
    /// Forget every preference
    Clear,
}

fn match_label(value: &str, labels: &[&str], kind: &str) -> Result<String, String> {
    labels
        .iter()
        .find(|l| l.eq_ignore_ascii_case(value.trim()))
        .map(|l| l.to_string())
        .ok_or_else(|| format!("unknown {kind} '{value}'; expected one of: {}", labels.join(", ")))
}

fn category_label(value: &str) -> Result<String, String> {
    match_label(value, CATEGORIES, "category")
}

fn source_label(value: &str) -> Result<String, String> {
    match_label(value, SOURCES, "source")
}

/// A concrete provider, not the "All Sources" sentinel.
fn provider_label(value: &str) -> Result<String, String> {
    match_label(value, &SOURCES[1..], "provider")
}

/// A concrete category, not the "All Categories" sentinel.
fn provider_category_label(value: &str) -> Result<String, String> {
    match_label(value, &CATEGORIES[1..], "category")
}

fn popular_period(value: &str) -> Result<u32, String> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|days| POPULAR_PERIODS.contains(days))
        .ok_or_else(|| format!("period must be one of {POPULAR_PERIODS:?} days"))
}
