//! Data models shared by the providers, the aggregator and the front end.
//!
//! - [`Article`]: the provider-agnostic article every adapter normalizes into
//! - [`Filter`]: the user's current filter selection
//! - [`UserPreferences`]: persisted personalization choices
//! - [`PaginationInfo`] and [`ArticlesPage`]: the aggregator's output
//! - [`QueryDescriptor`] and [`ProviderResult`]: the adapter contract
//!
//! `Article` and `UserPreferences` serialize with camelCase names so JSON
//! output and the stored preference blob keep the familiar wire shape.

use crate::catalog::{ALL_CATEGORIES, ALL_SOURCES, DateRange, SortKey};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const NO_TITLE: &str = "No title available";
pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_CONTENT: &str = "No content available";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-image.jpg";
pub const DEFAULT_CATEGORY: &str = "general";

/// Origin outlet of an article (not necessarily the provider that served it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub id: String,
    pub name: String,
}

/// A normalized article.
///
/// `id` is built as `{provider}-{native id}-{index in batch}` and is unique
/// within one aggregated result. `published_at` is kept as the provider sent it;
/// see [`Article::published`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub url: String,
    #[serde(rename = "urlToImage")]
    pub image_url: String,
    pub published_at: String,
    pub author: String,
    pub source: ArticleSource,
    pub category: String,
}

impl Article {
    /// Parse `published_at`.
    ///
    /// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as
    /// midnight UTC). Anything else yields `None`; such articles are kept but
    /// sort after every dated one.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

/// The user's filter selection. Sentinel labels mean "no restriction".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub category: String,
    pub source: String,
    pub date_range: DateRange,
    pub sort_by: SortKey,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            source: ALL_SOURCES.to_string(),
            date_range: DateRange::AllTime,
            sort_by: SortKey::DateNewest,
        }
    }
}

impl Filter {
    /// Category restriction, or `None` for the sentinel.
    pub fn category_restriction(&self) -> Option<&str> {
        (self.category != ALL_CATEGORIES && !self.category.is_empty())
            .then_some(self.category.as_str())
    }

    pub fn selects_all_sources(&self) -> bool {
        self.source == ALL_SOURCES
    }

    /// Number of active restrictions among category, source and date range.
    pub fn active_count(&self) -> usize {
        [
            self.category_restriction().is_some(),
            !self.selects_all_sources(),
            self.date_range != DateRange::AllTime,
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }
}

/// Persisted personalization choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub preferred_sources: Vec<String>,
    pub preferred_categories: Vec<String>,
    pub preferred_authors: Vec<String>,
}

impl UserPreferences {
    pub fn toggle_source(&mut self, source: &str) {
        toggle(&mut self.preferred_sources, source);
    }

    pub fn toggle_category(&mut self, category: &str) {
        toggle(&mut self.preferred_categories, category);
    }

    /// Adds a trimmed author name; blank names and duplicates are ignored.
    pub fn add_author(&mut self, author: &str) -> bool {
        let author = author.trim();
        if author.is_empty() || self.preferred_authors.iter().any(|a| a == author) {
            return false;
        }
        self.preferred_authors.push(author.to_string());
        true
    }

    pub fn remove_author(&mut self, author: &str) -> bool {
        let before = self.preferred_authors.len();
        self.preferred_authors.retain(|a| a != author.trim());
        before != self.preferred_authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preferred_sources.is_empty()
            && self.preferred_categories.is_empty()
            && self.preferred_authors.is_empty()
    }
}

fn toggle(list: &mut Vec<String>, value: &str) {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
    } else {
        list.push(value.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: usize,
    pub page_size: u32,
}

impl PaginationInfo {
    /// `total_pages = ceil(total_results / page_size)`.
    pub fn new(current_page: u32, page_size: u32, total_results: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_results.div_ceil(page_size as usize) as u32;
        Self {
            current_page,
            total_pages,
            total_results,
            page_size,
        }
    }
}

/// One page of aggregated results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlesPage {
    pub articles: Vec<Article>,
    pub pagination: PaginationInfo,
}

impl ArticlesPage {
    pub fn empty(current_page: u32, page_size: u32) -> Self {
        Self {
            articles: Vec::new(),
            pagination: PaginationInfo::new(current_page, page_size, 0),
        }
    }
}

/// Generic query handed to every provider adapter.
///
/// Sentinel filter values have already been stripped to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub free_text: Option<String>,
    pub category: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            free_text: None,
            category: None,
            since: None,
            page: 1,
            page_size: 10,
        }
    }
}

/// Normalized articles plus the provider's own result count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResult {
    pub articles: Vec<Article>,
    pub total_results: u64,
}

/// A provider-side section, topic or outlet listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionInfo {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
pub(crate) fn article_fixture(id: &str, published_at: &str) -> Article {
    Article {
        id: id.to_string(),
        title: format!("Title {id}"),
        description: NO_DESCRIPTION.to_string(),
        content: NO_CONTENT.to_string(),
        url: format!("https://example.com/{id}"),
        image_url: PLACEHOLDER_IMAGE.to_string(),
        published_at: published_at.to_string(),
        author: UNKNOWN_AUTHOR.to_string(),
        source: ArticleSource {
            id: "unknown".to_string(),
            name: "Example".to_string(),
        },
        category: DEFAULT_CATEGORY.to_string(),
    }
}
