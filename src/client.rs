use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};

use crate::config::ApiConfig;
use crate::formats::{CollectionEnvelope, DocumentRecord, Language};

/// Page size requested for a whole collection. Larger collections are truncated.
pub const COLLECTION_PAGE_SIZE: u32 = 100;

/// Any failure talking to the content API. Not-found is not a failure: it
/// comes back as an empty collection or `None`.
#[derive(Debug, thiserror::Error)]
pub enum FetchFailure {
    #[error("content api request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("content api returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("content api response is not a documentation envelope: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// All published records for `language`, ascending by `order`.
    async fn fetch_collection(
        &self,
        language: Language,
    ) -> Result<Vec<DocumentRecord>, FetchFailure>;

    /// The published record with `slug` in `language`, if any.
    async fn fetch_by_slug(
        &self,
        slug: &str,
        language: Language,
    ) -> Result<Option<DocumentRecord>, FetchFailure>;
}

#[derive(Debug, Clone)]
pub struct HttpContentClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpContentClient {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("build content api http client")?;
        Ok(Self {
            client,
            endpoint: config.documentations_endpoint(),
        })
    }

    pub fn collection_query(language: Language) -> Vec<(&'static str, String)> {
        vec![
            ("filters[isPublished][$eq]", "true".to_owned()),
            ("filters[language][$eq]", language.code().to_owned()),
            ("sort[0]", "order:asc".to_owned()),
            ("pagination[pageSize]", COLLECTION_PAGE_SIZE.to_string()),
        ]
    }

    pub fn slug_query(slug: &str, language: Language) -> Vec<(&'static str, String)> {
        vec![
            ("filters[slug][$eq]", slug.to_owned()),
            ("filters[isPublished][$eq]", "true".to_owned()),
            ("filters[language][$eq]", language.code().to_owned()),
        ]
    }

    async fn get_envelope(
        &self,
        query: &[(&'static str, String)],
    ) -> Result<CollectionEnvelope, FetchFailure> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(query)
            .header(USER_AGENT, "docsite/0.1")
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await?;
        if !status.is_success() {
            return Err(FetchFailure::Status {
                status: status.as_u16(),
                body: raw,
            });
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl ContentSource for HttpContentClient {
    async fn fetch_collection(
        &self,
        language: Language,
    ) -> Result<Vec<DocumentRecord>, FetchFailure> {
        let envelope = self
            .get_envelope(&Self::collection_query(language))
            .await?;
        if envelope.data.len() >= COLLECTION_PAGE_SIZE as usize {
            tracing::warn!(
                %language,
                records = envelope.data.len(),
                "collection reached the page size; later records are not shown"
            );
        }
        tracing::debug!(%language, records = envelope.data.len(), "fetched collection");
        Ok(envelope.data)
    }

    async fn fetch_by_slug(
        &self,
        slug: &str,
        language: Language,
    ) -> Result<Option<DocumentRecord>, FetchFailure> {
        let envelope = self.get_envelope(&Self::slug_query(slug, language)).await?;
        tracing::debug!(slug, %language, matches = envelope.data.len(), "fetched by slug");
        Ok(envelope.data.into_iter().next())
    }
}
