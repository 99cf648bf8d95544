use crate::document::{Document, is_discussion_title};
use crate::error::{Result, ScanError};
use crate::source::DocumentSource;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// Safety valve for the `plcontinue` loop.
const MAX_LINK_PAGES: usize = 100;

/// Connection settings for [`WikiClient`].
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl SourceConfig {
    /// Endpoint of the Wikipedia edition for `language` (`en`, `de`, ...).
    pub fn for_language(language: &str) -> Self {
        Self {
            endpoint: format!("https://{}.wikipedia.org/w/api.php", language),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: format!("WordAnalyzer/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
        }
    }
}

/// [`DocumentSource`] backed by the MediaWiki action API.
pub struct WikiClient {
    client: Client,
    endpoint: Url,
}

impl WikiClient {
    pub fn new() -> Result<Self> {
        Self::from_config(&SourceConfig::default())
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", config.endpoint, e)))?;

        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Plain-text body of the article.
    pub async fn fetch_text(&self, title: &str) -> Result<String> {
        let response: QueryResponse = self
            .query(
                title,
                &[("prop", "extracts"), ("explaintext", "1"), ("titles", title)],
            )
            .await?;

        let page = Self::single_page(title, response)?;
        Ok(page.extract.unwrap_or_default())
    }

    /// Outbound article links, discussion pages excluded. Follows `plcontinue` until the
    /// API reports no more batches.
    pub async fn fetch_links(&self, title: &str) -> Result<BTreeSet<String>> {
        let mut links = BTreeSet::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_LINK_PAGES {
            let mut params = vec![
                ("prop", "links"),
                ("pllimit", "max"),
                ("titles", title),
            ];
            if let Some(ref plcontinue) = cursor {
                params.push(("plcontinue", plcontinue.as_str()));
            }

            let response: QueryResponse = self.query(title, &params).await?;
            cursor = response
                .continuation
                .as_ref()
                .and_then(|c| c.plcontinue.clone());

            let page = Self::single_page(title, response)?;
            links.extend(
                page.links
                    .into_iter()
                    .filter(|link| link.ns % 2 == 0 && !is_discussion_title(&link.title))
                    .map(|link| link.title),
            );

            if cursor.is_none() {
                break;
            }
        }

        if cursor.is_some() {
            warn!(
                "Stopped following links of {} after {} pages; {} links kept, the rest dropped",
                title,
                MAX_LINK_PAGES,
                links.len()
            );
        }

        Ok(links)
    }

    async fn query(&self, title: &str, params: &[(&str, &str)]) -> Result<QueryResponse> {
        debug!("Querying {} for {:?}", self.endpoint, params);

        let start = Instant::now();
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("redirects", "1"),
            ])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                title: title.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("Response for {} in {:?}", title, start.elapsed());

        Ok(serde_json::from_str(&body)?)
    }

    fn single_page(title: &str, response: QueryResponse) -> Result<Page> {
        let page = response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .ok_or_else(|| ScanError::ParseError(format!("No page in response for {}", title)))?;

        if page.missing || page.invalid {
            return Err(ScanError::NotFound(title.to_string()));
        }

        Ok(page)
    }
}

#[async_trait]
impl DocumentSource for WikiClient {
    async fn fetch(&self, title: &str) -> Result<Document> {
        let text = self.fetch_text(title).await?;
        let links = self.fetch_links(title).await?;

        Ok(Document {
            title: title.to_string(),
            text,
            links,
        })
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default, rename = "continue")]
    continuation: Option<Continuation>,
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct Continuation {
    #[serde(default)]
    plcontinue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    #[serde(default)]
    ns: i64,
    title: String,
}
