use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::{DEFAULT_YEAR_MAX, DEFAULT_YEAR_MIN, FilterState, OrganismType, YearRange};
use crate::query::aggregate::DEFAULT_IMPACT_TOP_N;
use crate::ranking::DEFAULT_DEBOUNCE;

const DEFAULT_CARD_LIMIT: usize = 6;

#[derive(Parser)]
#[command(name = "spacebio", version, about = "Explore NASA space biology publications")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Filter publications and print paper cards
    Browse {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        filters: FilterArgs,
        /// Case-insensitive text match on title, abstract, or keywords
        #[arg(long)]
        contains: Option<String>,
        /// Number of paper cards to print
        #[arg(long, default_value_t = DEFAULT_CARD_LIMIT)]
        limit: usize,
    },
    /// Print dashboard statistics, histograms, timeline, and impact ranking
    Stats {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        filters: FilterArgs,
        /// Case-insensitive text match on title, abstract, or keywords
        #[arg(long)]
        contains: Option<String>,
        /// Entries in the high-impact ranking
        #[arg(long, default_value_t = DEFAULT_IMPACT_TOP_N)]
        top: usize,
    },
    /// Natural-language search ranked by Gemini (falls back to substring matching)
    Search {
        /// What to look for, e.g. "how do plants grow without gravity"
        #[arg(value_name = "QUERY")]
        search_query: String,
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        filters: FilterArgs,
        /// Number of paper cards to print
        #[arg(long, default_value_t = DEFAULT_CARD_LIMIT)]
        limit: usize,
        /// Entries in the high-impact ranking
        #[arg(long, default_value_t = DEFAULT_IMPACT_TOP_N)]
        top: usize,
        /// Quiet period before the ranking request is sent
        #[arg(long, default_value_t = DEFAULT_DEBOUNCE.as_millis() as u64)]
        debounce_ms: u64,
    },
    /// Convert a publications CSV (e.g. SB_publication_PMC.csv) into JSON records
    Import {
        /// CSV file with at least a Title column
        path: PathBuf,
        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct DataArgs {
    /// JSON file of publication rows (default: $SPACEBIO_PUBLICATIONS_URL, then sample data)
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Emit JSON instead of Markdown
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Organism type: Plant, Animal, or Microbe (repeatable)
    #[arg(long = "organism")]
    pub organisms: Vec<OrganismType>,
    /// Experiment type (repeatable)
    #[arg(long = "experiment")]
    pub experiments: Vec<String>,
    /// Mission (repeatable)
    #[arg(long = "mission")]
    pub missions: Vec<String>,
    /// First year, inclusive
    #[arg(long, default_value_t = DEFAULT_YEAR_MIN)]
    pub from_year: i32,
    /// Last year, inclusive
    #[arg(long, default_value_t = DEFAULT_YEAR_MAX)]
    pub to_year: i32,
}

impl FilterArgs {
    /// `search_query` comes from `--contains` or, for `search`, from the positional query.
    pub fn to_filter_state(&self, search_query: Option<&str>) -> FilterState {
        FilterState {
            organism_type: self.organisms.iter().copied().collect(),
            experiment_type: self.experiments.iter().cloned().collect(),
            mission: self.missions.iter().cloned().collect(),
            year_range: YearRange::new(self.from_year, self.to_year),
            search_query: search_query.unwrap_or_default().to_string(),
        }
    }
}
