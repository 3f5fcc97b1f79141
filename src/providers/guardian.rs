//! The Guardian Open Platform adapter (<https://open-platform.theguardian.com>).
//!
//! The Guardian has a single `/search` endpoint covering both listing and
//! free-text search; article fields (thumbnail, body, byline) are opted into
//! with `show-fields`.

use super::{ApiClient, NewsProvider, api_error};
use crate::catalog::GUARDIAN;
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    Article, ArticleSource, DEFAULT_CATEGORY, NO_CONTENT, NO_DESCRIPTION, NO_TITLE,
    PLACEHOLDER_IMAGE, ProviderResult, QueryDescriptor, SectionInfo, UNKNOWN_AUTHOR,
};
use crate::utils::{excerpt, non_blank};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

const DESCRIPTION_CHARS: usize = 200;
const SHOW_FIELDS: &str = "thumbnail,bodyText,byline";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    id: String,
    section_id: Option<String>,
    section_name: Option<String>,
    web_publication_date: Option<String>,
    web_title: Option<String>,
    web_url: Option<String>,
    fields: Option<SearchFields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFields {
    thumbnail: Option<String>,
    body_text: Option<String>,
    byline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SectionsResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    results: Vec<SectionResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionResult {
    id: String,
    web_title: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    results: Vec<TagResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagResult {
    id: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    web_title: String,
}

/// A Guardian tag (keyword, contributor, series, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardianTag {
    pub id: String,
    pub name: String,
    pub kind: String,
}

/// Map a catalog category onto a Guardian section id.
pub fn section_id(category: &str) -> String {
    match category.to_ascii_lowercase().as_str() {
        "sports" => "sport".to_string(),
        "entertainment" => "culture".to_string(),
        "health" => "society".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct GuardianProvider {
    api: ApiClient,
}

impl GuardianProvider {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(
                GUARDIAN,
                config,
                &config.guardian_base_url,
                "api-key",
                config.guardian_key.clone(),
            )?,
        })
    }

    pub fn request_url(&self, query: &QueryDescriptor) -> Result<Url> {
        let mut params = vec![
            ("page-size", query.page_size.to_string()),
            ("page", query.page.to_string()),
            ("show-fields", SHOW_FIELDS.to_string()),
        ];
        if let Some(text) = non_blank(query.free_text.as_deref()) {
            params.push(("q", text.to_string()));
        }
        if let Some(category) = query.category.as_deref() {
            params.push(("section", section_id(category)));
        }
        if let Some(since) = query.since {
            params.push(("from-date", since.format("%Y-%m-%d").to_string()));
        }
        self.api.endpoint("/search", &params)
    }

    /// `/tags`, optionally narrowed by a free-text query.
    pub fn tags_url(&self, query: Option<&str>) -> Result<Url> {
        let params: Vec<(&str, String)> = non_blank(query)
            .map(|q| vec![("q", q.trim().to_string())])
            .unwrap_or_default();
        self.api.endpoint("/tags", &params)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn tags(&self, query: Option<&str>) -> Result<Vec<GuardianTag>> {
        let tags = parse_tags(&self.api.get(self.tags_url(query)?).await?)?;
        info!(count = tags.len(), "Fetched Guardian tags");
        Ok(tags)
    }
}

pub fn parse_articles(body: &str) -> Result<ProviderResult> {
    let Envelope { response } = serde_json::from_str::<Envelope<SearchResponse>>(body)?;
    if response.status.as_deref() == Some("error") {
        return Err(api_error(GUARDIAN, response.message));
    }

    let articles = response
        .results
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            let fields = result.fields.unwrap_or_default();
            let body_text = non_blank(fields.body_text.as_deref());
            Article {
                id: format!("guardian-{}-{index}", result.id),
                title: non_blank(result.web_title.as_deref()).unwrap_or(NO_TITLE).to_string(),
                description: body_text
                    .map(|text| excerpt(text, DESCRIPTION_CHARS))
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                content: body_text.unwrap_or(NO_CONTENT).to_string(),
                url: result.web_url.unwrap_or_default(),
                image_url: non_blank(fields.thumbnail.as_deref())
                    .unwrap_or(PLACEHOLDER_IMAGE)
                    .to_string(),
                published_at: result.web_publication_date.unwrap_or_default(),
                author: non_blank(fields.byline.as_deref()).unwrap_or(UNKNOWN_AUTHOR).to_string(),
                source: ArticleSource {
                    id: non_blank(result.section_id.as_deref()).unwrap_or("unknown").to_string(),
                    name: GUARDIAN.to_string(),
                },
                category: non_blank(result.section_name.as_deref())
                    .unwrap_or(DEFAULT_CATEGORY)
                    .to_string(),
            }
        })
        .collect();

    Ok(ProviderResult {
        articles,
        total_results: response.total,
    })
}

pub fn parse_sections(body: &str) -> Result<Vec<SectionInfo>> {
    let Envelope { response } = serde_json::from_str::<Envelope<SectionsResponse>>(body)?;
    if response.status.as_deref() == Some("error") {
        return Err(api_error(GUARDIAN, response.message));
    }
    Ok(response
        .results
        .into_iter()
        .map(|s| SectionInfo {
            id: s.id,
            name: s.web_title,
        })
        .collect())
}

pub fn parse_tags(body: &str) -> Result<Vec<GuardianTag>> {
    let Envelope { response } = serde_json::from_str::<Envelope<TagsResponse>>(body)?;
    if response.status.as_deref() == Some("error") {
        return Err(api_error(GUARDIAN, response.message));
    }
    Ok(response
        .results
        .into_iter()
        .map(|t| GuardianTag {
            id: t.id,
            name: t.web_title,
            kind: t.kind.unwrap_or_default(),
        })
        .collect())
}

#[async_trait]
impl NewsProvider for GuardianProvider {
    fn name(&self) -> &str {
        GUARDIAN
    }

    #[instrument(level = "info", skip_all, fields(provider = GUARDIAN, page = query.page))]
    async fn query(&self, query: &QueryDescriptor) -> Result<ProviderResult> {
        let body = self.api.get(self.request_url(query)?).await?;
        let result = parse_articles(&body)?;
        info!(
            count = result.articles.len(),
            total = result.total_results,
            "Fetched Guardian articles"
        );
        Ok(result)
    }

    async fn sections(&self) -> Result<Vec<SectionInfo>> {
        let url = self.api.endpoint("/sections", &[])?;
        parse_sections(&self.api.get(url).await?)
    }
}
