//! Publication records and the filter state the query engine evaluates against.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_YEAR_MIN: i32 = 2010;
pub const DEFAULT_YEAR_MAX: i32 = 2025;

const FALLBACK_YEAR: i32 = 2020;
const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrganismType {
    Plant,
    Animal,
    Microbe,
}

impl OrganismType {
    pub const ALL: [OrganismType; 3] = [Self::Plant, Self::Animal, Self::Microbe];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plant => "Plant",
            Self::Animal => "Animal",
            Self::Microbe => "Microbe",
        }
    }
}

impl fmt::Display for OrganismType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrganismType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown organism type '{trimmed}' (expected Plant, Animal, or Microbe)"))
    }
}

/// One publication entry. Immutable once loaded; a refresh replaces the whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub year: i32,
    pub mission: String,
    pub experiment_type: String,
    pub organism_type: OrganismType,
    pub r#abstract: String,
    pub citations: u32,
    /// Assigned impact score. Not derived from `citations`.
    pub impact: f64,
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubmed_link: Option<String>,
}

/// Inclusive year bound. Serialized as a `[min, max]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// An inverted range contains nothing.
    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(DEFAULT_YEAR_MIN, DEFAULT_YEAR_MAX)
    }
}

impl From<(i32, i32)> for YearRange {
    fn from((min, max): (i32, i32)) -> Self {
        Self::new(min, max)
    }
}

impl From<YearRange> for (i32, i32) {
    fn from(range: YearRange) -> Self {
        (range.min, range.max)
    }
}

/// Constraint set evaluated by [`crate::query::apply`].
///
/// Categories combine conjunctively; values within one category combine
/// disjunctively. An empty category set places no constraint on that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub organism_type: BTreeSet<OrganismType>,
    pub experiment_type: BTreeSet<String>,
    pub mission: BTreeSet<String>,
    pub year_range: YearRange,
    pub search_query: String,
}

impl FilterState {
    pub fn matches_categories(&self, publication: &Publication) -> bool {
        admits(&self.organism_type, &publication.organism_type)
            && admits(&self.experiment_type, &publication.experiment_type)
            && admits(&self.mission, &publication.mission)
    }

    pub fn has_query(&self) -> bool {
        !self.search_query.is_empty()
    }
}

fn admits<T: Ord>(allowed: &BTreeSet<T>, value: &T) -> bool {
    allowed.is_empty() || allowed.contains(value)
}

/// Loosely-typed publication as stored by the backing database or produced by
/// the CSV importer. Accepts both snake_case and camelCase field names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicationRow {
    pub id: String,
    pub title: String,
    pub authors: Option<Vec<String>>,
    pub year: Option<i32>,
    pub mission: Option<String>,
    #[serde(alias = "experimentType")]
    pub experiment_type: Option<String>,
    #[serde(alias = "organismType")]
    pub organism_type: Option<String>,
    pub r#abstract: Option<String>,
    pub citations: Option<u32>,
    pub impact: Option<f64>,
    pub keywords: Option<Vec<String>>,
    #[serde(alias = "pubmedLink")]
    pub pubmed_link: Option<String>,
}

impl PublicationRow {
    /// Fill missing fields with dashboard defaults.
    ///
    /// Rows without an `impact` score fall back to their citation count.
    pub fn into_publication(self) -> Publication {
        let citations = self.citations.unwrap_or(0);
        let impact = self.impact.unwrap_or(f64::from(citations));
        let organism_type = self
            .organism_type
            .as_deref()
            .and_then(|o| o.parse().ok())
            .unwrap_or(OrganismType::Microbe);

        Publication {
            id: self.id,
            title: self.title,
            authors: self.authors.unwrap_or_default(),
            year: self.year.filter(|&y| y != 0).unwrap_or(FALLBACK_YEAR),
            mission: non_empty(self.mission).unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            experiment_type: non_empty(self.experiment_type)
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            organism_type,
            r#abstract: self.r#abstract.unwrap_or_default(),
            citations,
            impact,
            keywords: self.keywords.unwrap_or_default(),
            pubmed_link: non_empty(self.pubmed_link),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
