use tracing::warn;

use super::client::RankingError;
use super::types::{GenerateContentResponse, Ranking};

/// Pull the ranking JSON out of a model reply.
pub fn extract_ranking(response: &GenerateContentResponse) -> Result<Ranking, RankingError> {
    let text = response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        warn!("Gemini returned empty answer (safety filter or empty response)");
    }

    parse_ranking_text(&text)
}

/// Parse the outermost `{...}` span of `text`. Prose or code fences around it are ignored.
///
/// Text with no object at all yields [`Ranking::unprocessable`]; an object that
/// is not valid ranking JSON is an error.
pub fn parse_ranking_text(text: &str) -> Result<Ranking, RankingError> {
    let Some(span) = json_object_span(text) else {
        warn!("ranking reply contained no JSON object");
        return Ok(Ranking::unprocessable());
    };
    serde_json::from_str(span).map_err(|e| RankingError::Malformed(e.to_string()))
}

fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::types::{Candidate, Content, Part};

    fn reply(parts: &[&str]) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: Some(vec![Candidate {
                content: Some(Content {
                    parts: parts
                        .iter()
                        .map(|t| Part {
                            text: t.to_string(),
                        })
                        .collect(),
                    role: Some("model".into()),
                }),
            }]),
            error: None,
        }
    }

    #[test]
    fn extracts_json_wrapped_in_prose_and_fences() {
        let text = "Here you go:\n```json\n{\"paperIds\": [\"2\", \"5\"], \"summary\": \"Radiation {studies}\", \"explanation\": \"both mention radiation\"}\n```\nHope that helps.";
        let ranking = parse_ranking_text(text).unwrap();

        assert_eq!(ranking.paper_ids, vec!["2", "5"]);
        assert_eq!(ranking.summary.as_deref(), Some("Radiation {studies}"));
        assert!(!ranking.no_results);
    }

    #[test]
    fn reply_without_object_is_unprocessable() {
        let ranking = parse_ranking_text("I could not find anything.").unwrap();
        assert!(ranking.no_results);
        assert!(ranking.paper_ids.is_empty());
        assert_eq!(ranking.explanation, "Error processing AI response.");
    }

    #[test]
    fn reversed_braces_are_unprocessable() {
        let ranking = parse_ranking_text("} nothing {").unwrap();
        assert!(ranking.no_results);
    }

    #[test]
    fn invalid_object_is_malformed() {
        let result = parse_ranking_text("{\"paperIds\": [\"1\",}");
        assert!(matches!(result, Err(RankingError::Malformed(_))));

        let result = parse_ranking_text("{\"paperIds\": \"not-a-list\"}");
        assert!(matches!(result, Err(RankingError::Malformed(_))));
    }

    #[test]
    fn null_fields_keep_the_ids() {
        let ranking = parse_ranking_text(
            r#"{"paperIds":["2","5"],"summary":null,"explanation":null,"suggestedFilters":null,"noResults":null}"#,
        )
        .unwrap();
        assert_eq!(ranking.paper_ids, vec!["2", "5"]);
        assert!(ranking.summary.is_none());
        assert!(ranking.explanation.is_empty());
        assert!(!ranking.no_results);
        assert!(ranking.suggested_filters.is_empty());

        let ranking = parse_ranking_text(
            r#"{"paperIds":["6"],"suggestedFilters":{"organismType":null,"mission":["ISS"]}}"#,
        )
        .unwrap();
        assert!(ranking.suggested_filters.organism_type.is_empty());
        assert_eq!(ranking.suggested_filters.mission, vec!["ISS"]);
    }

    #[test]
    fn no_results_with_suggestions_is_kept() {
        let ranking = parse_ranking_text(
            r#"{"paperIds": ["6"], "noResults": true, "summary": "No direct results found", "suggestedFilters": {"organismType": ["Microbe"]}}"#,
        )
        .unwrap();
        assert!(ranking.no_results);
        assert_eq!(ranking.paper_ids, vec!["6"]);
        assert_eq!(ranking.suggested_filters.organism_type, vec!["Microbe"]);
    }

    #[test]
    fn joins_multi_part_replies() {
        let response = reply(&["{\"paperIds\": [\"1\"],", " \"explanation\": \"split\"}"]);
        let ranking = extract_ranking(&response).unwrap();
        assert_eq!(ranking.paper_ids, vec!["1"]);
        assert_eq!(ranking.explanation, "split");
    }

    #[test]
    fn empty_reply_is_unprocessable() {
        let response = GenerateContentResponse {
            candidates: None,
            error: None,
        };
        let ranking = extract_ranking(&response).unwrap();
        assert!(ranking.no_results);
    }
}
