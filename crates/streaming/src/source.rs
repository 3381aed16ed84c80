//! Remote data sources for link and category records.
//!
//! Sources are opaque async capabilities: they hand back an ordered sequence
//! of records or fail with a [`DataSourceError`]. Link and category sources
//! are separate traits so the two datasets fail independently.

use std::future::Future;
use std::pin::Pin;

use formats::{CategoryDatum, GeoLinkCollection};
use tracing::warn;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type for data source operations.
#[derive(Debug)]
pub struct DataSourceError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for DataSourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl DataSourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

pub trait LinkSource: Send + Sync {
    /// Human-readable origin for log lines (URL, collection path, …).
    fn describe(&self) -> String;

    fn fetch_links(&self) -> BoxFuture<'_, Result<GeoLinkCollection, DataSourceError>>;
}

pub trait CategorySource: Send + Sync {
    fn describe(&self) -> String;

    fn fetch_categories(&self) -> BoxFuture<'_, Result<Vec<CategoryDatum>, DataSourceError>>;
}

/// GET a URL and return the body, failing on transport errors and non-2xx.
async fn get_text(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String, DataSourceError> {
    let resp = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| DataSourceError::with_source(format!("GET {url} failed"), e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(DataSourceError::new(format!(
            "GET {url} returned status {status}"
        )));
    }

    resp.text()
        .await
        .map_err(|e| DataSourceError::with_source(format!("reading body of {url} failed"), e))
}

/// JSON endpoint serving an array of link objects.
#[derive(Debug, Clone)]
pub struct HttpLinkSource {
    client: reqwest::Client,
    url: String,
}

impl HttpLinkSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl LinkSource for HttpLinkSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch_links(&self) -> BoxFuture<'_, Result<GeoLinkCollection, DataSourceError>> {
        Box::pin(async move {
            let body = get_text(&self.client, &self.url, &[]).await?;
            formats::decode_links(&body)
                .map_err(|e| DataSourceError::with_source("link payload rejected", e))
        })
    }
}

/// Number of documents requested per page from the document store.
const DOCUMENT_PAGE_SIZE: &str = "300";

/// A document-store collection whose documents are links, keyed by document id.
#[derive(Debug, Clone)]
pub struct DocumentStoreSource {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    collection: String,
}

impl DocumentStoreSource {
    pub const DEFAULT_BASE_URL: &'static str = "https://firestore.googleapis.com/v1";

    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            project_id: project_id.into(),
            collection: collection.into(),
        }
    }

    pub fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.collection
        )
    }
}

impl LinkSource for DocumentStoreSource {
    fn describe(&self) -> String {
        self.collection_url()
    }

    fn fetch_links(&self) -> BoxFuture<'_, Result<GeoLinkCollection, DataSourceError>> {
        Box::pin(async move {
            let url = self.collection_url();
            let mut links = Vec::new();
            let mut page_token: Option<String> = None;
            loop {
                let mut query = vec![("pageSize", DOCUMENT_PAGE_SIZE)];
                if let Some(token) = page_token.as_deref() {
                    query.push(("pageToken", token));
                }
                let body = get_text(&self.client, &url, &query).await?;
                let page = formats::decode_document_page(&body)
                    .map_err(|e| DataSourceError::with_source("document page rejected", e))?;
                let batch = formats::documents_to_links(&page.documents);
                for rejected in &batch.rejected {
                    warn!(collection = %url, error = %rejected, "skipping unusable document");
                }
                links.extend(batch.links);

                match page.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break,
                }
            }
            Ok(GeoLinkCollection::new(links))
        })
    }
}

/// JSON endpoint serving an array of `{label, value, color}` objects.
#[derive(Debug, Clone)]
pub struct HttpCategorySource {
    client: reqwest::Client,
    url: String,
}

impl HttpCategorySource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl CategorySource for HttpCategorySource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch_categories(&self) -> BoxFuture<'_, Result<Vec<CategoryDatum>, DataSourceError>> {
        Box::pin(async move {
            let body = get_text(&self.client, &self.url, &[]).await?;
            formats::decode_categories(&body)
                .map_err(|e| DataSourceError::with_source("category payload rejected", e))
        })
    }
}

/// In-process source returning a fixed result; also used to simulate outages.
#[derive(Debug, Clone)]
pub struct StaticLinkSource {
    result: Result<GeoLinkCollection, String>,
}

impl StaticLinkSource {
    pub fn new(links: GeoLinkCollection) -> Self {
        Self { result: Ok(links) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
        }
    }
}

impl LinkSource for StaticLinkSource {
    fn describe(&self) -> String {
        "static links".to_string()
    }

    fn fetch_links(&self) -> BoxFuture<'_, Result<GeoLinkCollection, DataSourceError>> {
        let result = self.result.clone().map_err(DataSourceError::new);
        Box::pin(async move { result })
    }
}

#[derive(Debug, Clone)]
pub struct StaticCategorySource {
    result: Result<Vec<CategoryDatum>, String>,
}

impl StaticCategorySource {
    pub fn new(categories: Vec<CategoryDatum>) -> Self {
        Self {
            result: Ok(categories),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
        }
    }
}

impl CategorySource for StaticCategorySource {
    fn describe(&self) -> String {
        "static categories".to_string()
    }

    fn fetch_categories(&self) -> BoxFuture<'_, Result<Vec<CategoryDatum>, DataSourceError>> {
        let result = self.result.clone().map_err(DataSourceError::new);
        Box::pin(async move { result })
    }
}
