//! Publication query engine: category/year filtering, relevance ranking, and aggregation.

pub mod aggregate;

use std::collections::HashMap;

use crate::model::{FilterState, Publication};

/// Text-relevance strategy for one evaluation. Ranking takes precedence over substring search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMode<'a> {
    /// Keep only ranked ids, ordered by their position in the ranking.
    Ranked(&'a [String]),
    /// Case-insensitive substring match on title, abstract, or any keyword.
    /// Holds the lowercased query.
    Substring(String),
    Unconstrained,
}

impl<'a> SearchMode<'a> {
    /// An empty ranking is treated as absent, never as "zero results".
    pub fn select(filters: &FilterState, ranking: Option<&'a [String]>) -> Self {
        if !filters.has_query() {
            return Self::Unconstrained;
        }
        match ranking {
            Some(ids) if !ids.is_empty() => Self::Ranked(ids),
            _ => Self::Substring(filters.search_query.to_lowercase()),
        }
    }
}

/// Evaluate `filters` (and an optional external relevance ranking) over `records`.
///
/// Pure and deterministic. Malformed filters such as an inverted year range
/// produce an empty view, not an error.
pub fn apply<'r>(
    records: &'r [Publication],
    filters: &FilterState,
    ranking: Option<&[String]>,
) -> Vec<&'r Publication> {
    let candidates: Vec<&Publication> = records
        .iter()
        .filter(|p| filters.matches_categories(p))
        .filter(|p| filters.year_range.contains(p.year))
        .collect();

    match SearchMode::select(filters, ranking) {
        SearchMode::Ranked(ids) => order_by_ranking(candidates, ids),
        SearchMode::Substring(needle) => candidates
            .into_iter()
            .filter(|p| matches_text(p, &needle))
            .collect(),
        SearchMode::Unconstrained => candidates,
    }
}

fn order_by_ranking<'r>(candidates: Vec<&'r Publication>, ids: &[String]) -> Vec<&'r Publication> {
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        position.entry(id.as_str()).or_insert(i);
    }

    let mut ranked: Vec<(usize, &Publication)> = candidates
        .into_iter()
        .filter_map(|p| position.get(p.id.as_str()).map(|&i| (i, p)))
        .collect();
    ranked.sort_by_key(|&(i, _)| i);
    ranked.into_iter().map(|(_, p)| p).collect()
}

fn matches_text(publication: &Publication, needle: &str) -> bool {
    publication.title.to_lowercase().contains(needle)
        || publication.r#abstract.to_lowercase().contains(needle)
        || publication
            .keywords
            .iter()
            .any(|k| k.to_lowercase().contains(needle))
}
