//! CSV bulk import: flat rows to normalised publication records.

pub mod infer;

use std::collections::HashMap;
use std::io::Read;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{Publication, PublicationRow};
use infer::infer_metadata;

static PMC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PMC\d+").expect("valid PMC pattern"));

const TITLE_COLUMNS: &[&str] = &["title"];
const LINK_COLUMNS: &[&str] = &["pubmed central link", "link"];
const ABSTRACT_COLUMNS: &[&str] = &["abstract"];
const KEYWORD_COLUMNS: &[&str] = &["keywords"];
const AUTHOR_COLUMNS: &[&str] = &["authors"];

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV has no title column (expected 'Title')")]
    MissingTitleColumn,
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub publications: Vec<Publication>,
    /// Data rows dropped because their title was empty.
    pub skipped: usize,
}

/// Lower-cased header name to column index.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().trim_matches('"').to_lowercase(), i))
                .collect(),
        )
    }

    fn index(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|a| self.0.get(*a).copied())
    }

    fn value<'r>(&self, record: &'r csv::StringRecord, aliases: &[&str]) -> Option<&'r str> {
        self.index(aliases)
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Read a headed CSV (such as `SB_publication_PMC.csv`) into publications.
///
/// Year, organism, mission, and experiment type are inferred from the title;
/// anything still missing gets the usual row defaults.
pub fn import_csv<R: Read>(reader: R) -> Result<ImportReport, ImportError> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(csv.headers()?);
    if columns.index(TITLE_COLUMNS).is_none() {
        return Err(ImportError::MissingTitleColumn);
    }

    let mut publications = Vec::new();
    let mut skipped = 0;

    for (n, record) in csv.records().enumerate() {
        let record = record?;
        let row_number = n + 1;
        let Some(title) = columns.value(&record, TITLE_COLUMNS) else {
            warn!(row = row_number, "skipping CSV row without title");
            skipped += 1;
            continue;
        };
        let link = columns.value(&record, LINK_COLUMNS);
        publications.push(to_row(&columns, &record, title, link, row_number).into_publication());
    }

    debug!(imported = publications.len(), skipped, "CSV import complete");
    Ok(ImportReport {
        publications,
        skipped,
    })
}

fn to_row(
    columns: &Columns,
    record: &csv::StringRecord,
    title: &str,
    link: Option<&str>,
    row_number: usize,
) -> PublicationRow {
    let meta = infer_metadata(title);
    let id = link
        .and_then(|l| PMC_ID.find(l))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| format!("row-{row_number}"));

    PublicationRow {
        id,
        title: title.to_string(),
        authors: columns.value(record, AUTHOR_COLUMNS).map(split_list),
        year: meta.year,
        mission: meta.mission,
        experiment_type: meta.experiment,
        organism_type: meta.organism.map(|o| o.as_str().to_string()),
        r#abstract: columns.value(record, ABSTRACT_COLUMNS).map(str::to_string),
        citations: None,
        impact: None,
        keywords: columns.value(record, KEYWORD_COLUMNS).map(split_list),
        pubmed_link: link.map(str::to_string),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
