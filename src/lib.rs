//! # News Aggregator
//!
//! Search, filter and page through articles merged from three news APIs
//! (NewsAPI, The Guardian and The New York Times), with lightweight
//! personalization preferences kept in local storage.
//!
//! ## Architecture
//!
//! A request flows one way:
//! 1. **Session**: the caller's explicit browsing state (filters, search text,
//!    page) becomes a numbered request; superseded requests are discarded
//! 2. **Aggregator**: fans out to every provider enabled by the source filter
//!    and waits for all of them to settle
//! 3. **Providers**: each adapter translates the generic query into its API's
//!    vocabulary and normalizes the response into [`models::Article`]s
//! 4. **Merge**: results are sorted by publication date, filtered by date
//!    range, sorted by the requested key and sliced into a page
//!
//! Preferences live in [`preferences`] and only seed the initial filters.
//!
//! ## Usage
//!
//! ```ignore
//! use news_aggregator::{aggregator::Aggregator, config::Config, models::Filter, providers};
//!
//! let config = Config::default();
//! let aggregator = Aggregator::new(providers::default_providers(&config)?);
//! let page = aggregator.get_articles(&Filter::default(), "climate", 1, 10).await;
//! ```

pub mod aggregator;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod preferences;
pub mod providers;
pub mod session;
pub mod utils;

pub use aggregator::Aggregator;
pub use error::{Error, Result};
pub use models::{Article, ArticlesPage, Filter, PaginationInfo, UserPreferences};
pub use preferences::PreferenceBridge;
pub use session::Session;
