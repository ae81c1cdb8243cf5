//! Best-effort metadata inference from a publication title.
//!
//! Keyword heuristics only: first matching rule wins, and nothing here is authoritative.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::OrganismType;

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid year pattern"));

const ORGANISM_RULES: &[(&[&str], OrganismType)] = &[
    (&["plant", "arabidopsis", "rice", "wheat"], OrganismType::Plant),
    (&["mouse", "mice", "rat", "human"], OrganismType::Animal),
    (&["bacteria", "microbe", "yeast", "fungi"], OrganismType::Microbe),
];

const MISSION_RULES: &[(&[&str], &str)] = &[
    (&["iss", "international space station"], "ISS"),
    (&["mars"], "Mars"),
    (&["moon", "lunar"], "Moon"),
];

const EXPERIMENT_RULES: &[(&[&str], &str)] = &[
    (&["radiation"], "Radiation"),
    (&["microgravity", "gravity"], "Microgravity"),
    (&["plant growth"], "Plant Growth"),
    (&["cell culture"], "Cell Culture"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferredMetadata {
    pub year: Option<i32>,
    pub organism: Option<OrganismType>,
    pub mission: Option<String>,
    pub experiment: Option<String>,
}

pub fn infer_metadata(title: &str) -> InferredMetadata {
    let lower = title.to_lowercase();

    InferredMetadata {
        year: YEAR.find(title).and_then(|m| m.as_str().parse().ok()),
        organism: first_rule(&lower, ORGANISM_RULES).copied(),
        mission: first_rule(&lower, MISSION_RULES).map(|m| m.to_string()),
        experiment: first_rule(&lower, EXPERIMENT_RULES).map(|e| e.to_string()),
    }
}

/// Plain substring matching, so "iss" also hits words like "tissue".
fn first_rule<'a, T>(lower: &str, rules: &'a [(&[&str], T)]) -> Option<&'a T> {
    rules
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, value)| value)
}
