use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::client::{RankingError, RankingSource};
use super::types::Ranking;
use crate::model::Publication;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Queries this short (after trimming) clear the ranking instead of calling out.
const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug)]
pub enum SearchOutcome {
    Ranked(Ranking),
    /// Query too short or nothing to rank; any previous ranking should be dropped.
    Cleared,
    /// A newer search was issued; this result must not be applied.
    Superseded,
    /// Ranking source failed; callers fall back to substring matching.
    Failed(RankingError),
}

impl SearchOutcome {
    pub fn ranking(&self) -> Option<&Ranking> {
        match self {
            Self::Ranked(ranking) => Some(ranking),
            _ => None,
        }
    }
}

/// Debounced, latest-wins access to a [`RankingSource`].
///
/// Every call to [`SearchSession::search`] claims a generation token. A call
/// whose token is no longer the newest after the debounce interval, or after
/// the ranking response arrives, reports [`SearchOutcome::Superseded`].
pub struct SearchSession<S> {
    source: S,
    debounce: Duration,
    generation: AtomicU64,
}

impl<S: RankingSource> SearchSession<S> {
    pub fn new(source: S, debounce: Duration) -> Self {
        Self {
            source,
            debounce,
            generation: AtomicU64::new(0),
        }
    }

    pub async fn search(&self, query: &str, records: &[Publication]) -> SearchOutcome {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if !self.is_current(token) {
            debug!(token, "search superseded during debounce");
            return SearchOutcome::Superseded;
        }

        if query.trim().chars().count() <= MIN_QUERY_CHARS || records.is_empty() {
            return SearchOutcome::Cleared;
        }

        info!(query, papers = records.len(), "ranking search");
        let result = self.source.rank(query, records).await;

        if !self.is_current(token) {
            debug!(token, "dropping stale ranking response");
            return SearchOutcome::Superseded;
        }

        match result {
            Ok(ranking) => {
                info!(ranked = ranking.paper_ids.len(), no_results = ranking.no_results, "ranking complete");
                SearchOutcome::Ranked(ranking)
            }
            Err(e) => {
                warn!(error = %e, "ranking failed, falling back to substring search");
                SearchOutcome::Failed(e)
            }
        }
    }

    fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }
}
