//! Record sources: where the publication snapshot comes from.

pub mod sample;

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ApiKey;
use crate::model::{FilterState, Publication, PublicationRow};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid publication data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid publications endpoint '{0}': must be an HTTP(S) URL")]
    InvalidEndpoint(String),

    #[error("publications request failed: status {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Provider of the publication snapshot. Filters are advisory: implementations
/// may ignore them, and the query engine always re-applies them.
pub trait RecordSource {
    async fn fetch(&self, filters: &FilterState) -> Result<Vec<Publication>, SourceError>;
}

/// JSON array of publication rows on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for FileSource {
    async fn fetch(&self, _filters: &FilterState) -> Result<Vec<Publication>, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        let rows: Vec<PublicationRow> = serde_json::from_str(&text)?;
        debug!(path = %self.path.display(), rows = rows.len(), "loaded publication file");
        Ok(rows.into_iter().map(PublicationRow::into_publication).collect())
    }
}

#[derive(Serialize)]
struct PublicationsRequest<'a> {
    filters: &'a FilterState,
}

/// Publications endpoint that accepts `{"filters": ...}` and answers with an array of rows.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: Client,
    endpoint: Url,
    api_key: Option<ApiKey>,
}

impl HttpSource {
    pub fn new(http: Client, endpoint: &str, api_key: Option<ApiKey>) -> Result<Self, SourceError> {
        let url = Url::parse(endpoint)
            .map_err(|_| SourceError::InvalidEndpoint(endpoint.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SourceError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(Self {
            http,
            endpoint: url,
            api_key,
        })
    }
}

impl RecordSource for HttpSource {
    async fn fetch(&self, filters: &FilterState) -> Result<Vec<Publication>, SourceError> {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .header("User-Agent", crate::USER_AGENT)
            .json(&PublicationsRequest { filters })
            .timeout(REQUEST_TIMEOUT);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, endpoint = %self.endpoint, "publications endpoint error");
            return Err(SourceError::Status(status.as_u16()));
        }

        let rows: Vec<PublicationRow> = response.json().await?;
        debug!(rows = rows.len(), "fetched publications");
        Ok(rows.into_iter().map(PublicationRow::into_publication).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Source,
    Sample,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<Publication>,
    pub origin: Origin,
}

/// Fetch from `source`, degrading to the sample records when it fails or is empty.
pub async fn load_or_sample(source: &impl RecordSource, filters: &FilterState) -> Snapshot {
    match source.fetch(filters).await {
        Ok(records) if !records.is_empty() => {
            info!(records = records.len(), "publication snapshot loaded");
            Snapshot {
                records,
                origin: Origin::Source,
            }
        }
        Ok(_) => {
            warn!("record source returned no publications, using sample data");
            sample_snapshot()
        }
        Err(e) => {
            warn!(error = %e, "failed to fetch publications, using sample data");
            sample_snapshot()
        }
    }
}

/// The built-in sample records, flagged so renderers can say so.
pub fn sample_snapshot() -> Snapshot {
    Snapshot {
        records: sample::sample_publications(),
        origin: Origin::Sample,
    }
}
