//! AI-assisted relevance ranking: Gemini client, prompt, reply parsing, and debounced sessions.

pub mod client;
pub mod extract;
pub mod prompt;
pub mod session;
pub mod types;

pub use client::{GeminiRanker, RankingError, RankingSource};
pub use session::{DEFAULT_DEBOUNCE, SearchOutcome, SearchSession};
pub use types::Ranking;
