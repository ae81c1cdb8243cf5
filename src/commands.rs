//! Command handlers: load a snapshot, evaluate the query engine, render the result.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{Command, DataArgs};
use crate::config::{self, ApiKey};
use crate::import::{self, ImportError};
use crate::model::{FilterState, Publication};
use crate::query::aggregate::Dashboard;
use crate::query::{self, SearchMode};
use crate::ranking::{
    GeminiRanker, Ranking, RankingError, RankingSource, SearchOutcome, SearchSession,
};
use crate::render;
use crate::source::{self, FileSource, HttpSource, Origin, Snapshot, SourceError};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout covering connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CommandError + '_ {
    move |source| CommandError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[derive(Serialize)]
struct BrowseOutput<'a> {
    origin: Origin,
    total: usize,
    papers: &'a [&'a Publication],
}

#[derive(Serialize)]
struct StatsOutput<'a> {
    origin: Origin,
    dashboard: &'a Dashboard,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchOutput<'a> {
    query: &'a str,
    origin: Origin,
    /// "ranked" when the AI ordering was applied, "substring" otherwise.
    mode: &'static str,
    ranking: Option<&'a Ranking>,
    papers: &'a [&'a Publication],
    dashboard: &'a Dashboard,
}

struct SearchRequest<'a> {
    query: &'a str,
    data: &'a DataArgs,
    filters: FilterState,
    limit: usize,
    top: usize,
    debounce: Duration,
}

/// Shared state for one CLI invocation.
///
/// Configuration via environment variables:
/// - `GEMINI_API_KEY` / `GEMINI_MODEL`: AI ranking for `search` (optional)
/// - `SPACEBIO_PUBLICATIONS_URL` / `SPACEBIO_PUBLICATIONS_KEY`: remote record source (optional)
pub struct App {
    http: Client,
}

impl App {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }

    pub async fn run(&self, command: Command) -> Result<String, CommandError> {
        match command {
            Command::Browse {
                data,
                filters,
                contains,
                limit,
            } => {
                let filters = filters.to_filter_state(contains.as_deref());
                self.browse(&data, &filters, limit).await
            }
            Command::Stats {
                data,
                filters,
                contains,
                top,
            } => {
                let filters = filters.to_filter_state(contains.as_deref());
                self.stats(&data, &filters, top).await
            }
            Command::Search {
                search_query,
                data,
                filters,
                limit,
                top,
                debounce_ms,
            } => {
                let request = SearchRequest {
                    filters: filters.to_filter_state(Some(&search_query)),
                    query: &search_query,
                    data: &data,
                    limit,
                    top,
                    debounce: Duration::from_millis(debounce_ms),
                };
                let ranker = GeminiRanker::from_env(self.http.clone());
                self.search(ranker, request).await
            }
            Command::Import { path, output } => self.import(&path, output.as_deref()).await,
        }
    }

    async fn load(&self, data: &DataArgs, filters: &FilterState) -> Result<Snapshot, CommandError> {
        if let Some(path) = &data.data {
            return Ok(source::load_or_sample(&FileSource::new(path), filters).await);
        }
        if let Some(endpoint) = config::env_non_empty(config::PUBLICATIONS_URL_VAR) {
            let key = config::env_non_empty(config::PUBLICATIONS_KEY_VAR).map(ApiKey::new);
            let remote = HttpSource::new(self.http.clone(), &endpoint, key)?;
            return Ok(source::load_or_sample(&remote, filters).await);
        }
        info!("no publication source configured, using sample data");
        Ok(source::sample_snapshot())
    }

    async fn browse(
        &self,
        data: &DataArgs,
        filters: &FilterState,
        limit: usize,
    ) -> Result<String, CommandError> {
        let snapshot = self.load(data, filters).await?;
        let view = query::apply(&snapshot.records, filters, None);
        info!(matching = view.len(), "browse");

        if data.json {
            let papers = &view[..limit.min(view.len())];
            return Ok(serde_json::to_string_pretty(&BrowseOutput {
                origin: snapshot.origin,
                total: view.len(),
                papers,
            })?);
        }
        Ok(render::format_cards(&view, limit))
    }

    async fn stats(
        &self,
        data: &DataArgs,
        filters: &FilterState,
        top: usize,
    ) -> Result<String, CommandError> {
        let snapshot = self.load(data, filters).await?;
        let view = query::apply(&snapshot.records, filters, None);
        let dashboard = Dashboard::build(&view, top);

        if data.json {
            return Ok(serde_json::to_string_pretty(&StatsOutput {
                origin: snapshot.origin,
                dashboard: &dashboard,
            })?);
        }
        Ok(render::format_dashboard(&dashboard, snapshot.origin))
    }

    /// Rank with `ranker` when available; any other outcome degrades to substring matching.
    async fn search<S: RankingSource>(
        &self,
        ranker: Result<S, RankingError>,
        request: SearchRequest<'_>,
    ) -> Result<String, CommandError> {
        let SearchRequest {
            query: search_query,
            data,
            filters,
            limit,
            top,
            debounce,
        } = request;
        let snapshot = self.load(data, &filters).await?;

        let outcome = match ranker {
            Ok(ranker) => {
                SearchSession::new(ranker, debounce)
                    .search(search_query, &snapshot.records)
                    .await
            }
            Err(e) => {
                warn!("AI ranking not available: {e}");
                SearchOutcome::Failed(e)
            }
        };
        let ranking = outcome.ranking();
        let ranked_ids = ranking.map(|r| r.paper_ids.as_slice());

        let mode = match SearchMode::select(&filters, ranked_ids) {
            SearchMode::Ranked(_) => "ranked",
            _ => "substring",
        };
        let view = query::apply(&snapshot.records, &filters, ranked_ids);
        let dashboard = Dashboard::build(&view, top);
        info!(mode, matching = view.len(), "search complete");

        if data.json {
            return Ok(serde_json::to_string_pretty(&SearchOutput {
                query: search_query,
                origin: snapshot.origin,
                mode,
                ranking,
                papers: &view[..limit.min(view.len())],
                dashboard: &dashboard,
            })?);
        }

        let mut out = match &outcome {
            SearchOutcome::Ranked(r) => render::format_ai_summary(search_query, r),
            SearchOutcome::Failed(_) => {
                "> Note: AI ranking unavailable. Showing basic text matches.\n\n".to_string()
            }
            SearchOutcome::Cleared | SearchOutcome::Superseded => String::new(),
        };
        out.push_str(&render::format_cards(&view, limit));
        out.push('\n');
        out.push_str(&render::format_dashboard(&dashboard, snapshot.origin));
        Ok(out)
    }

    async fn import(&self, path: &Path, output: Option<&Path>) -> Result<String, CommandError> {
        let file = std::fs::File::open(path).map_err(io_error(path))?;
        let report = import::import_csv(file)?;
        info!(
            imported = report.publications.len(),
            skipped = report.skipped,
            "import complete"
        );

        let json = serde_json::to_string_pretty(&report.publications)?;
        match output {
            Some(target) => {
                tokio::fs::write(target, json)
                    .await
                    .map_err(io_error(target))?;
                Ok(format!(
                    "Imported {} publications ({} skipped) into {}\n",
                    report.publications.len(),
                    report.skipped,
                    target.display()
                ))
            }
            None => Ok(json),
        }
    }
}
