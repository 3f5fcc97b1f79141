//! NewsAPI adapter (<https://newsapi.org>).
//!
//! Without free text the adapter lists `/top-headlines` for the US, narrowed
//! to a NewsAPI category when the filter category has one. With free text it
//! searches `/everything`, pushing the date window down as `from`.

use super::{ApiClient, NewsProvider, api_error};
use crate::catalog::NEWSAPI;
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    Article, ArticleSource, DEFAULT_CATEGORY, NO_CONTENT, NO_DESCRIPTION, NO_TITLE,
    PLACEHOLDER_IMAGE, ProviderResult, QueryDescriptor, SectionInfo, UNKNOWN_AUTHOR,
};
use crate::utils::non_blank;
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    source: Option<NewsApiSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SourcesResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    sources: Vec<NewsApiSource>,
}

/// Map a catalog category onto NewsAPI's headline taxonomy.
///
/// NewsAPI has no World, Politics or Environment category; those are dropped.
pub fn headline_category(category: &str) -> Option<&'static str> {
    match category.to_ascii_lowercase().as_str() {
        "business" => Some("business"),
        "entertainment" => Some("entertainment"),
        "general" => Some("general"),
        "health" => Some("health"),
        "science" => Some("science"),
        "sports" => Some("sports"),
        "technology" => Some("technology"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct NewsApiProvider {
    api: ApiClient,
}

impl NewsApiProvider {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(
                NEWSAPI,
                config,
                &config.newsapi_base_url,
                "apiKey",
                config.newsapi_key.clone(),
            )?,
        })
    }

    /// Request URL for `query` (without the API key) and the category used to
    /// tag the results.
    pub fn request_url(&self, query: &QueryDescriptor) -> Result<(Url, Option<&'static str>)> {
        let mut params = vec![
            ("pageSize", query.page_size.to_string()),
            ("page", query.page.to_string()),
        ];

        match non_blank(query.free_text.as_deref()) {
            Some(text) => {
                params.insert(0, ("q", text.to_string()));
                if let Some(since) = query.since {
                    params.push(("from", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
                }
                Ok((self.api.endpoint("/everything", &params)?, None))
            }
            None => {
                params.push(("country", "us".to_string()));
                let category = query.category.as_deref().and_then(headline_category);
                if let Some(category) = category {
                    params.push(("category", category.to_string()));
                }
                Ok((self.api.endpoint("/top-headlines", &params)?, category))
            }
        }
    }
}

/// Map a NewsAPI response body into normalized articles.
pub fn parse_articles(body: &str, category: Option<&str>) -> Result<ProviderResult> {
    let response: NewsApiResponse = serde_json::from_str(body)?;
    if response.status.as_deref() == Some("error") {
        return Err(api_error(NEWSAPI, response.message));
    }

    let category = category.unwrap_or(DEFAULT_CATEGORY);
    let articles = response
        .articles
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let url = item.url.unwrap_or_default();
            let source = item.source.unwrap_or(NewsApiSource { id: None, name: None });
            Article {
                id: format!("newsapi-{url}-{index}"),
                title: non_blank(item.title.as_deref()).unwrap_or(NO_TITLE).to_string(),
                description: non_blank(item.description.as_deref())
                    .unwrap_or(NO_DESCRIPTION)
                    .to_string(),
                content: non_blank(item.content.as_deref()).unwrap_or(NO_CONTENT).to_string(),
                image_url: non_blank(item.url_to_image.as_deref())
                    .unwrap_or(PLACEHOLDER_IMAGE)
                    .to_string(),
                published_at: item.published_at.unwrap_or_default(),
                author: non_blank(item.author.as_deref()).unwrap_or(UNKNOWN_AUTHOR).to_string(),
                source: ArticleSource {
                    id: non_blank(source.id.as_deref()).unwrap_or("unknown").to_string(),
                    name: non_blank(source.name.as_deref())
                        .unwrap_or("Unknown Source")
                        .to_string(),
                },
                category: category.to_string(),
                url,
            }
        })
        .collect();

    Ok(ProviderResult {
        articles,
        total_results: response.total_results,
    })
}

pub fn parse_sources(body: &str) -> Result<Vec<SectionInfo>> {
    let response: SourcesResponse = serde_json::from_str(body)?;
    if response.status.as_deref() == Some("error") {
        return Err(api_error(NEWSAPI, response.message));
    }
    Ok(response
        .sources
        .into_iter()
        .filter_map(|s| {
            Some(SectionInfo {
                id: s.id?,
                name: s.name?,
            })
        })
        .collect())
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    fn name(&self) -> &str {
        NEWSAPI
    }

    #[instrument(level = "info", skip_all, fields(provider = NEWSAPI, page = query.page))]
    async fn query(&self, query: &QueryDescriptor) -> Result<ProviderResult> {
        let (url, category) = self.request_url(query)?;
        let body = self.api.get(url).await?;
        let result = parse_articles(&body, category)?;
        info!(
            count = result.articles.len(),
            total = result.total_results,
            "Fetched NewsAPI articles"
        );
        Ok(result)
    }

    async fn sections(&self) -> Result<Vec<SectionInfo>> {
        let url = self.api.endpoint("/top-headlines/sources", &[])?;
        parse_sources(&self.api.get(url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn provider() -> NewsApiProvider {
        NewsApiProvider::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_headlines_mode_without_free_text() {
        let query = QueryDescriptor {
            category: Some("Technology".to_string()),
            page: 2,
            page_size: 20,
            ..QueryDescriptor::default()
        };
        let (url, category) = provider().request_url(&query).unwrap();
        assert_eq!(url.path(), "/v2/top-headlines");
        assert_eq!(
            url.query(),
            Some("pageSize=20&page=2&country=us&category=technology")
        );
        assert_eq!(category, Some("technology"));
    }

    #[test]
    fn test_unmapped_category_is_dropped() {
        let query = QueryDescriptor {
            category: Some("Politics".to_string()),
            ..QueryDescriptor::default()
        };
        let (url, category) = provider().request_url(&query).unwrap();
        assert!(!url.as_str().contains("category="));
        assert_eq!(category, None);
    }

    #[test]
    fn test_search_mode_with_free_text() {
        let query = QueryDescriptor {
            free_text: Some("climate".to_string()),
            since: Some("2024-03-08T18:00:00Z".parse().unwrap()),
            ..QueryDescriptor::default()
        };
        let (url, _) = provider().request_url(&query).unwrap();
        assert_eq!(url.path(), "/v2/everything");
        assert_eq!(
            url.query(),
            Some("q=climate&pageSize=10&page=1&from=2024-03-08T18%3A00%3A00Z")
        );
    }

    #[test]
    fn test_parse_articles_applies_defaults() {
        let body = r#"{
            "status": "ok",
            "totalResults": 42,
            "articles": [
                {
                    "source": {"id": "bbc-news", "name": "BBC News"},
                    "author": "Jane Roe",
                    "title": "Headline",
                    "description": "Desc",
                    "url": "https://bbc.co.uk/a",
                    "urlToImage": "https://bbc.co.uk/a.jpg",
                    "publishedAt": "2024-03-15T02:00:00Z",
                    "content": "Body"
                },
                {
                    "source": {"id": null, "name": "Blog"},
                    "author": null,
                    "title": null,
                    "url": "https://blog.example/b",
                    "publishedAt": "2024-03-14T10:00:00Z"
                }
            ]
        }"#;

        let result = parse_articles(body, Some("science")).unwrap();
        assert_eq!(result.total_results, 42);
        assert_eq!(result.articles.len(), 2);

        let first = &result.articles[0];
        assert_eq!(first.id, "newsapi-https://bbc.co.uk/a-0");
        assert_eq!(first.source.name, "BBC News");
        assert_eq!(first.category, "science");

        let second = &result.articles[1];
        assert_eq!(second.id, "newsapi-https://blog.example/b-1");
        assert_eq!(second.title, NO_TITLE);
        assert_eq!(second.author, UNKNOWN_AUTHOR);
        assert_eq!(second.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(second.source.id, "unknown");
    }

    #[test]
    fn test_search_results_default_to_general() {
        let body = r#"{"status":"ok","totalResults":1,"articles":[{"url":"u","publishedAt":"x"}]}"#;
        let result = parse_articles(body, None).unwrap();
        assert_eq!(result.articles[0].category, "general");
        assert_eq!(result.articles[0].source.name, "Unknown Source");
    }

    #[test]
    fn test_error_payload() {
        let body = r#"{"status":"error","code":"apiKeyInvalid",
            "message":"Your API key is invalid."}"#;
        match parse_articles(body, None) {
            Err(Error::Api { provider, message }) => {
                assert_eq!(provider, NEWSAPI);
                assert_eq!(message, "Your API key is invalid.");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_sources() {
        let body = r#"{"status":"ok","sources":[
            {"id":"abc-news","name":"ABC News","category":"general"}]}"#;
        let sources = parse_sources(body).unwrap();
        assert_eq!(
            sources,
            vec![SectionInfo {
                id: "abc-news".to_string(),
                name: "ABC News".to_string()
            }]
        );
    }
}
