//! New York Times adapter (<https://developer.nytimes.com>).
//!
//! Listing and search both go through article search; the category becomes a
//! `news_desk` filter query. Most-popular lists are exposed separately via
//! [`NytProvider::most_popular`].

use super::{ApiClient, NewsProvider, api_error};
use crate::catalog::NYTIMES;
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    Article, ArticleSource, DEFAULT_CATEGORY, NO_CONTENT, NO_DESCRIPTION, NO_TITLE,
    PLACEHOLDER_IMAGE, ProviderResult, QueryDescriptor, SectionInfo, UNKNOWN_AUTHOR,
};
use crate::utils::non_blank;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

/// Most-popular windows the API accepts, in days.
pub const POPULAR_PERIODS: &[u32] = &[1, 7, 30];

#[derive(Debug, Deserialize)]
struct Fault {
    faultstring: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NytResponse {
    fault: Option<Fault>,
    #[serde(default)]
    num_results: u64,
    #[serde(default)]
    results: Vec<NytResult>,
}

#[derive(Debug, Deserialize)]
struct NytResult {
    uri: Option<String>,
    url: Option<String>,
    source: Option<String>,
    published_date: Option<String>,
    section: Option<String>,
    byline: Option<String>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    summary: Option<String>,
    #[serde(default)]
    media: Vec<NytMedia>,
}

#[derive(Debug, Deserialize)]
struct NytMedia {
    #[serde(rename = "media-metadata", default)]
    metadata: Vec<NytMediaMetadata>,
}

#[derive(Debug, Deserialize)]
struct NytMediaMetadata {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SectionListResponse {
    fault: Option<Fault>,
    #[serde(default)]
    results: Vec<SectionListItem>,
}

#[derive(Debug, Deserialize)]
struct SectionListItem {
    section: String,
    display_name: String,
}

#[derive(Debug, Clone)]
pub struct NytProvider {
    api: ApiClient,
}

impl NytProvider {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(
                NYTIMES,
                config,
                &config.nyt_base_url,
                "api-key",
                config.nyt_key.clone(),
            )?,
        })
    }

    /// Article search URL. NYT pages are zero-based, so page `N` is sent as `N-1`.
    pub fn request_url(&self, query: &QueryDescriptor) -> Result<Url> {
        let mut params = vec![("page", query.page.saturating_sub(1).to_string())];
        if let Some(text) = non_blank(query.free_text.as_deref()) {
            params.push(("q", text.to_string()));
        }
        if let Some(category) = query.category.as_deref() {
            params.push(("fq", format!("news_desk:({category})")));
        }
        if let Some(since) = query.since {
            params.push(("begin_date", since.format("%Y%m%d").to_string()));
        }
        self.api.endpoint("/search/v2/articlesearch.json", &params)
    }

    /// Most-viewed articles over the last `period_days` (1, 7 or 30).
    #[instrument(level = "info", skip(self))]
    pub async fn most_popular(&self, period_days: u32) -> Result<ProviderResult> {
        let url = self
            .api
            .endpoint(&format!("/mostpopular/v2/viewed/{period_days}.json"), &[])?;
        let result = parse_articles(&self.api.get(url).await?, "nyt-popular")?;
        info!(count = result.articles.len(), "Fetched NYT most popular articles");
        Ok(result)
    }
}

/// Map an NYT response body; `id_prefix` distinguishes search from most-popular ids.
pub fn parse_articles(body: &str, id_prefix: &str) -> Result<ProviderResult> {
    let response: NytResponse = serde_json::from_str(body)?;
    if let Some(fault) = response.fault {
        return Err(api_error(NYTIMES, fault.faultstring));
    }

    let articles = response
        .results
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            let summary = non_blank(result.summary.as_deref());
            let image = result
                .media
                .first()
                .and_then(|m| m.metadata.first())
                .and_then(|meta| non_blank(meta.url.as_deref()))
                .unwrap_or(PLACEHOLDER_IMAGE)
                .to_string();
            Article {
                id: format!("{id_prefix}-{}-{index}", result.uri.as_deref().unwrap_or_default()),
                title: non_blank(result.title.as_deref()).unwrap_or(NO_TITLE).to_string(),
                description: summary.unwrap_or(NO_DESCRIPTION).to_string(),
                content: summary.unwrap_or(NO_CONTENT).to_string(),
                url: result.url.unwrap_or_default(),
                image_url: image,
                published_at: result.published_date.unwrap_or_default(),
                author: non_blank(result.byline.as_deref()).unwrap_or(UNKNOWN_AUTHOR).to_string(),
                source: ArticleSource {
                    id: non_blank(result.source.as_deref()).unwrap_or("unknown").to_string(),
                    name: NYTIMES.to_string(),
                },
                category: non_blank(result.section.as_deref())
                    .unwrap_or(DEFAULT_CATEGORY)
                    .to_string(),
            }
        })
        .collect();

    Ok(ProviderResult {
        articles,
        total_results: response.num_results,
    })
}

pub fn parse_sections(body: &str) -> Result<Vec<SectionInfo>> {
    let response: SectionListResponse = serde_json::from_str(body)?;
    if let Some(fault) = response.fault {
        return Err(api_error(NYTIMES, fault.faultstring));
    }
    Ok(response
        .results
        .into_iter()
        .map(|s| SectionInfo {
            id: s.section,
            name: s.display_name,
        })
        .collect())
}

#[async_trait]
impl NewsProvider for NytProvider {
    fn name(&self) -> &str {
        NYTIMES
    }

    #[instrument(level = "info", skip_all, fields(provider = NYTIMES, page = query.page))]
    async fn query(&self, query: &QueryDescriptor) -> Result<ProviderResult> {
        let body = self.api.get(self.request_url(query)?).await?;
        let result = parse_articles(&body, "nyt")?;
        info!(count = result.articles.len(), total = result.total_results, "Fetched NYT articles");
        Ok(result)
    }

    async fn sections(&self) -> Result<Vec<SectionInfo>> {
        let url = self.api.endpoint("/news/v3/content/section-list.json", &[])?;
        parse_sections(&self.api.get(url).await?)
    }
}
