//! Fan-out, merge, filter, sort and paginate across news providers.
//!
//! # Algorithm
//!
//! 1. Select providers whose name matches `filter.source` (all of them for
//!    "All Sources").
//! 2. Query them concurrently and wait for every call to settle. A failing
//!    provider is logged and contributes nothing.
//! 3. Concatenate in provider order and sort by publication date, newest first.
//! 4. Drop articles outside the date range (undated articles are kept).
//! 5. Apply the requested sort key and slice out the page window.
//!
//! # Pagination
//!
//! Each provider is asked for page `N` of its own result stream and the merged
//! set is then paged again locally. This only approximates true global
//! pagination: page 2 of the merged order is not guaranteed to equal "page 2 of
//! every provider, merged".

use crate::catalog::SortKey;
use crate::models::{Article, ArticlesPage, Filter, PaginationInfo, QueryDescriptor};
use crate::providers::NewsProvider;
use chrono::{DateTime, Local, TimeZone, Utc};
use futures::future::join_all;
use itertools::Itertools;
use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct Aggregator {
    providers: Vec<Arc<dyn NewsProvider>>,
}

impl Aggregator {
    pub fn new(providers: Vec<Arc<dyn NewsProvider>>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Arc<dyn NewsProvider>] {
        &self.providers
    }

    pub fn provider(&self, name: &str) -> Option<&Arc<dyn NewsProvider>> {
        self.providers.iter().find(|p| p.name() == name)
    }

    /// Providers enabled by the filter's source selection.
    pub fn selected(&self, filter: &Filter) -> Vec<&Arc<dyn NewsProvider>> {
        self.providers
            .iter()
            .filter(|p| filter.selects_all_sources() || p.name() == filter.source)
            .collect()
    }

    /// Aggregate one page of articles, evaluating date ranges against the local clock.
    pub async fn get_articles(
        &self,
        filter: &Filter,
        search_query: &str,
        page: u32,
        page_size: u32,
    ) -> ArticlesPage {
        self.get_articles_at(filter, search_query, page, page_size, Local::now())
            .await
    }

    /// Same as [`Aggregator::get_articles`] with an explicit "now".
    ///
    /// Never fails: provider errors degrade to empty contributions, and when
    /// every provider fails the result is an empty, well-formed page.
    #[instrument(
        level = "info",
        skip_all,
        fields(
            source = %filter.source,
            category = %filter.category,
            page = page,
            page_size = page_size
        )
    )]
    pub async fn get_articles_at<Tz: TimeZone>(
        &self,
        filter: &Filter,
        search_query: &str,
        page: u32,
        page_size: u32,
        now: DateTime<Tz>,
    ) -> ArticlesPage {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let since = filter.date_range.cutoff(&now);

        let query = QueryDescriptor {
            free_text: Some(search_query.trim())
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            category: filter.category_restriction().map(str::to_string),
            since,
            page,
            page_size,
        };

        let selected = self.selected(filter);
        if selected.is_empty() {
            warn!(source = %filter.source, "No provider matches the selected source");
            return ArticlesPage::empty(page, page_size);
        }

        let t0 = Instant::now();
        let outcomes = join_all(selected.iter().map(|provider| {
            let query = &query;
            async move { (provider.name().to_string(), provider.query(query).await) }
        }))
        .await;

        let mut failed = 0usize;
        let mut merged: Vec<Article> = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    debug!(provider = %name, count = result.articles.len(), "Provider settled");
                    merged.extend(result.articles);
                }
                Err(e) => {
                    failed += 1;
                    warn!(provider = %name, error = %e, "Provider failed; continuing without it");
                }
            }
        }
        if failed == selected.len() {
            warn!(failed, "Every selected provider failed");
        }

        let merged = merge(merged);
        let filtered = apply_date_range(merged, since);
        let sorted = sort_articles(filtered, filter.sort_by);
        let result = paginate(sorted, page, page_size);

        info!(
            providers = selected.len(),
            failed,
            total = result.pagination.total_results,
            returned = result.articles.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Aggregated articles"
        );
        result
    }
}

/// Baseline order: newest first, undated last, with duplicate ids collapsed
/// to the first seen. The sort is stable, so equal dates keep provider order.
pub fn merge(articles: Vec<Article>) -> Vec<Article> {
    articles
        .into_iter()
        .unique_by(|a| a.id.clone())
        .sorted_by_cached_key(|a| {
            let published = a.published();
            (published.is_none(), Reverse(published))
        })
        .collect()
}

/// Keep articles published at or after `since`; undated articles always stay.
pub fn apply_date_range(articles: Vec<Article>, since: Option<DateTime<Utc>>) -> Vec<Article> {
    let Some(since) = since else {
        return articles;
    };
    articles
        .into_iter()
        .filter(|a| a.published().is_none_or(|published| published >= since))
        .collect()
}

/// Order by the requested key; ties fall back to `id` so the result does not
/// depend on which provider answered first. Keys are computed once per article.
pub fn sort_articles(mut articles: Vec<Article>, key: SortKey) -> Vec<Article> {
    match key {
        SortKey::DateNewest => articles.sort_by_cached_key(|a| {
            let published = a.published();
            (published.is_none(), Reverse(published), a.id.clone())
        }),
        SortKey::DateOldest => articles.sort_by_cached_key(|a| {
            let published = a.published();
            (published.is_none(), published, a.id.clone())
        }),
        SortKey::Title => {
            articles.sort_by_cached_key(|a| (a.title.to_lowercase(), a.id.clone()))
        }
        SortKey::Source => {
            articles.sort_by_cached_key(|a| (a.source.name.to_lowercase(), a.id.clone()))
        }
    }
    articles
}

/// Slice `[(page-1)*page_size, page*page_size)` out of the full set.
pub fn paginate(articles: Vec<Article>, page: u32, page_size: u32) -> ArticlesPage {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let pagination = PaginationInfo::new(page, page_size, articles.len());
    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let articles = articles
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();
    ArticlesPage {
        articles,
        pagination,
    }
}
