//! Dashboard aggregations over an already-filtered view.
//!
//! Every function here is independent of the others and of view order, except
//! the impact ranking, which breaks ties by input order.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::model::Publication;

pub const DEFAULT_IMPACT_TOP_N: usize = 10;
pub const TITLE_PREVIEW_CHARS: usize = 30;

/// One bar or slice of a categorical chart. Histograms carry no defined order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactEntry {
    pub id: String,
    /// Display preview: at most [`TITLE_PREVIEW_CHARS`] characters plus an ellipsis.
    pub title: String,
    pub impact: f64,
    pub citations: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_papers: usize,
    pub total_citations: u64,
    /// Full precision; `0.0` for an empty view. Use [`SummaryStats::average_impact_display`] for output.
    pub average_impact: f64,
    pub unique_missions: usize,
}

impl SummaryStats {
    pub fn compute(view: &[&Publication]) -> Self {
        let total_citations = view.iter().map(|p| u64::from(p.citations)).sum();
        let average_impact = if view.is_empty() {
            0.0
        } else {
            view.iter().map(|p| p.impact).sum::<f64>() / view.len() as f64
        };
        let unique_missions = view
            .iter()
            .map(|p| p.mission.as_str())
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_papers: view.len(),
            total_citations,
            average_impact,
            unique_missions,
        }
    }

    /// One decimal place, or a bare `0` when there is nothing to average.
    pub fn average_impact_display(&self) -> String {
        if self.total_papers == 0 {
            "0".to_string()
        } else {
            format!("{:.1}", self.average_impact)
        }
    }
}

pub fn organism_histogram(view: &[&Publication]) -> Vec<CategoryCount> {
    histogram_by(view, |p| p.organism_type.as_str())
}

pub fn mission_histogram(view: &[&Publication]) -> Vec<CategoryCount> {
    histogram_by(view, |p| p.mission.as_str())
}

pub fn experiment_histogram(view: &[&Publication]) -> Vec<CategoryCount> {
    histogram_by(view, |p| p.experiment_type.as_str())
}

fn histogram_by<'a>(
    view: &[&'a Publication],
    key: impl Fn(&'a Publication) -> &'a str,
) -> Vec<CategoryCount> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();

    for &publication in view {
        let label = key(publication);
        match slots.get(label) {
            Some(&slot) => counts[slot].value += 1,
            None => {
                slots.insert(label, counts.len());
                counts.push(CategoryCount {
                    name: label.to_string(),
                    value: 1,
                });
            }
        }
    }

    counts
}

/// Publication counts per year, ascending by year.
pub fn year_histogram(view: &[&Publication]) -> Vec<YearCount> {
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for publication in view {
        *by_year.entry(publication.year).or_default() += 1;
    }
    by_year
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Top `limit` publications by descending impact. Equal impacts keep input order.
pub fn impact_ranking(view: &[&Publication], limit: usize) -> Vec<ImpactEntry> {
    let mut sorted: Vec<&Publication> = view.to_vec();
    sorted.sort_by(|a, b| b.impact.total_cmp(&a.impact));
    sorted
        .into_iter()
        .take(limit)
        .map(|p| ImpactEntry {
            id: p.id.clone(),
            title: preview_title(&p.title),
            impact: p.impact,
            citations: p.citations,
        })
        .collect()
}

pub fn preview_title(title: &str) -> String {
    let mut preview: String = title.chars().take(TITLE_PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

/// Every chart and headline figure for one filtered view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub summary: SummaryStats,
    pub by_organism: Vec<CategoryCount>,
    pub by_mission: Vec<CategoryCount>,
    pub by_experiment: Vec<CategoryCount>,
    pub timeline: Vec<YearCount>,
    pub top_impact: Vec<ImpactEntry>,
}

impl Dashboard {
    pub fn build(view: &[&Publication], top_n: usize) -> Self {
        Self {
            summary: SummaryStats::compute(view),
            by_organism: organism_histogram(view),
            by_mission: mission_histogram(view),
            by_experiment: experiment_histogram(view),
            timeline: year_histogram(view),
            top_impact: impact_ranking(view, top_n),
        }
    }
}
