//! Static option catalogs offered to the front end.
//!
//! Categories and sources stay plain labels because they are matched against
//! provider names and provider taxonomies. Date ranges and sort keys carry
//! behavior, so they are enums that serialize as their display labels.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel meaning "no category restriction".
pub const ALL_CATEGORIES: &str = "All Categories";
/// Sentinel meaning "query every provider".
pub const ALL_SOURCES: &str = "All Sources";

pub const NEWSAPI: &str = "NewsAPI";
pub const GUARDIAN: &str = "The Guardian";
pub const NYTIMES: &str = "The New York Times";

pub const CATEGORIES: &[&str] = &[
    ALL_CATEGORIES,
    "Business",
    "Technology",
    "Entertainment",
    "Sports",
    "Science",
    "Health",
    "World",
    "Politics",
    "Environment",
];

pub const SOURCES: &[&str] = &[ALL_SOURCES, NEWSAPI, GUARDIAN, NYTIMES];

pub fn is_known_category(label: &str) -> bool {
    CATEGORIES.contains(&label)
}

pub fn is_known_source(label: &str) -> bool {
    SOURCES.contains(&label)
}

/// Publication window applied client-side after merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DateRange {
    #[default]
    #[serde(rename = "All Time")]
    AllTime,
    #[serde(rename = "Today")]
    Today,
    #[serde(rename = "This Week")]
    ThisWeek,
    #[serde(rename = "This Month")]
    ThisMonth,
}

impl DateRange {
    pub fn all() -> &'static [DateRange] {
        &[
            DateRange::AllTime,
            DateRange::Today,
            DateRange::ThisWeek,
            DateRange::ThisMonth,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::AllTime => "All Time",
            DateRange::Today => "Today",
            DateRange::ThisWeek => "This Week",
            DateRange::ThisMonth => "This Month",
        }
    }

    /// Earliest publication instant kept by this range, evaluated at `now`.
    ///
    /// "Today" and "This Month" align to calendar boundaries in `now`'s time
    /// zone; "This Week" is a rolling 7×24h window. `None` means unbounded.
    pub fn cutoff<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        let tz = now.timezone();
        let start_of = |date: chrono::NaiveDate| {
            date.and_hms_opt(0, 0, 0)
                .and_then(|midnight| tz.from_local_datetime(&midnight).earliest())
                .map(|dt| dt.with_timezone(&Utc))
        };

        match self {
            DateRange::AllTime => None,
            DateRange::Today => start_of(now.date_naive()),
            DateRange::ThisWeek => Some(now.with_timezone(&Utc) - Duration::days(7)),
            DateRange::ThisMonth => start_of(now.date_naive().with_day(1)?),
        }
    }
}

/// Final ordering applied to the merged, filtered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "Date (Newest)")]
    DateNewest,
    #[serde(rename = "Date (Oldest)")]
    DateOldest,
    #[serde(rename = "Title (A-Z)")]
    Title,
    #[serde(rename = "Source (A-Z)")]
    Source,
}

impl SortKey {
    pub fn all() -> &'static [SortKey] {
        &[
            SortKey::DateNewest,
            SortKey::DateOldest,
            SortKey::Title,
            SortKey::Source,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::DateNewest => "Date (Newest)",
            SortKey::DateOldest => "Date (Oldest)",
            SortKey::Title => "Title (A-Z)",
            SortKey::Source => "Source (A-Z)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownOption {}

impl FromStr for DateRange {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateRange::all()
            .iter()
            .copied()
            .find(|r| r.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOption {
                kind: "date range",
                value: s.to_string(),
            })
    }
}

impl FromStr for SortKey {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::all()
            .iter()
            .copied()
            .find(|k| k.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOption {
                kind: "sort key",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
