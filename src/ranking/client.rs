use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::extract::extract_ranking;
use super::prompt::{SYSTEM_PROMPT, build_user_prompt};
use super::types::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    Ranking,
};
use crate::config::{self, ApiKey};
use crate::model::Publication;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TEMPERATURE: f32 = 0.3;

#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey")]
    ApiKeyNotSet,

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed ranking response: {0}")]
    Malformed(String),
}

/// External relevance-ordering collaborator.
/// Implemented by `GeminiRanker` for production; mock implementations used in tests.
pub trait RankingSource {
    async fn rank(&self, query: &str, records: &[Publication]) -> Result<Ranking, RankingError>;
}

#[derive(Clone, Debug)]
pub struct GeminiRanker {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl GeminiRanker {
    pub fn from_env(http: Client) -> Result<Self, RankingError> {
        let api_key =
            config::env_non_empty(config::GEMINI_API_KEY_VAR).ok_or(RankingError::ApiKeyNotSet)?;
        let model = config::env_non_empty(config::GEMINI_MODEL_VAR)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self {
            http,
            api_key: ApiKey::new(api_key),
            model,
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey::new("test-key"),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }

    async fn generate(
        &self,
        query: &str,
        records: &[Publication],
    ) -> Result<GenerateContentResponse, RankingError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let request = GenerateContentRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: SYSTEM_PROMPT.to_string(),
                }],
                role: None,
            },
            contents: vec![Content {
                parts: vec![Part {
                    text: build_user_prompt(query, records),
                }],
                role: Some("user".to_string()),
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Gemini API rate limited");
            return Err(RankingError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<GenerateContentResponse>(&text)
                && let Some(err) = &body.error
            {
                let classified = classify_api_error(err);
                warn!(error = %classified, "Gemini API error");
                return Err(classified);
            }
            let end = text.floor_char_boundary(200);
            warn!(status = %status, "Gemini API error (no structured body)");
            return Err(RankingError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {}", &text[..end]),
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| RankingError::Malformed(e.to_string()))?;
        debug!(model = %self.model, papers = records.len(), "gemini ranking complete");

        if let Some(err) = &body.error {
            let classified = classify_api_error(err);
            warn!(error = %classified, "Gemini API error in 200 response");
            return Err(classified);
        }

        Ok(body)
    }
}

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;

impl RankingSource for GeminiRanker {
    async fn rank(&self, query: &str, records: &[Publication]) -> Result<Ranking, RankingError> {
        let mut last_err = None;
        for attempt in 0..MAX_RETRIES {
            match self.generate(query, records).await {
                Ok(response) => return extract_ranking(&response),
                Err(e) if is_retriable(&e) => {
                    last_err = Some(e);
                    if attempt + 1 < MAX_RETRIES {
                        let delay_ms = jittered_backoff(attempt);
                        debug!(
                            attempt = attempt + 1,
                            delay_ms, "retrying after transient error"
                        );
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(RankingError::RateLimited))
    }
}

fn is_retriable(e: &RankingError) -> bool {
    matches!(
        e,
        RankingError::RateLimited
            | RankingError::Api {
                code: 500..=599,
                ..
            }
    )
}

/// Equal jitter backoff: base/2 + rand(0, base/2).
fn jittered_backoff(attempt: u32) -> u64 {
    let base = INITIAL_BACKOFF_MS * 2u64.pow(attempt);
    let half = base / 2;
    half + fastrand::u64(..half.max(1))
}

fn classify_api_error(err: &ApiError) -> RankingError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());

    match err.code {
        Some(429) => RankingError::RateLimited,
        Some(403) => RankingError::QuotaExhausted(message),
        Some(code) => RankingError::Api { code, message },
        None => RankingError::Api {
            code: 0,
            message: format!("Unknown error (no status code): {message}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_429_as_rate_limited() {
        let err = ApiError {
            code: Some(429),
            message: Some("Resource exhausted".into()),
        };
        assert!(matches!(classify_api_error(&err), RankingError::RateLimited));
    }

    #[test]
    fn classify_403_as_quota_exhausted() {
        let err = ApiError {
            code: Some(403),
            message: Some("Quota exceeded".into()),
        };
        assert!(matches!(
            classify_api_error(&err),
            RankingError::QuotaExhausted(_)
        ));
    }

    #[test]
    fn classify_missing_code_keeps_message() {
        let err = ApiError {
            code: None,
            message: Some("odd".into()),
        };
        match classify_api_error(&err) {
            RankingError::Api { code, message } => {
                assert_eq!(code, 0);
                assert!(message.contains("odd"));
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn only_transient_errors_are_retried() {
        assert!(is_retriable(&RankingError::RateLimited));
        assert!(is_retriable(&RankingError::Api {
            code: 503,
            message: String::new()
        }));
        assert!(!is_retriable(&RankingError::Api {
            code: 400,
            message: String::new()
        }));
        assert!(!is_retriable(&RankingError::Malformed("x".into())));
    }

    #[test]
    fn backoff_stays_within_equal_jitter_bounds() {
        for attempt in 0..3 {
            let base = INITIAL_BACKOFF_MS * 2u64.pow(attempt);
            let delay = jittered_backoff(attempt);
            assert!(delay >= base / 2 && delay < base, "attempt {attempt}: {delay}");
        }
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;
    use crate::source::sample::sample_publications;
    use wiremock::matchers::{body_partial_json, header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model_reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": text}],
                    "role": "model"
                }
            }]
        })
    }

    #[tokio::test]
    async fn rank_success_returns_ranking() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"temperature": 0.3}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
                "```json\n{\"paperIds\": [\"5\", \"2\"], \"summary\": \"Two radiation studies.\", \"explanation\": \"radiation\", \"noResults\": false}\n```",
            )))
            .mount(&server)
            .await;

        let ranker = GeminiRanker::with_base_url(Client::new(), &server.uri());
        let ranking = ranker
            .rank("cosmic radiation", &sample_publications())
            .await
            .unwrap();

        assert_eq!(ranking.paper_ids, vec!["5", "2"]);
        assert_eq!(ranking.summary.as_deref(), Some("Two radiation studies."));
    }

    #[tokio::test]
    async fn rank_sends_every_paper_in_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(model_reply("{}")))
            .expect(1)
            .mount(&server)
            .await;

        let ranker = GeminiRanker::with_base_url(Client::new(), &server.uri());
        ranker.rank("moss", &sample_publications()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Search Query: \"moss\""));
        assert!(prompt.contains("ID: 6"));
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("paperIds"));
    }

    #[tokio::test]
    async fn rank_429_returns_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let ranker = GeminiRanker::with_base_url(Client::new(), &server.uri());
        let result = ranker.rank("test", &sample_publications()).await;
        assert!(matches!(result, Err(RankingError::RateLimited)));
    }

    #[tokio::test]
    async fn rank_400_with_error_body_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": 400,
                    "message": "Invalid argument"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ranker = GeminiRanker::with_base_url(Client::new(), &server.uri());
        match ranker.rank("test", &sample_publications()).await {
            Err(RankingError::Api { code: 400, message }) => {
                assert!(message.contains("Invalid argument"));
            }
            other => panic!("expected Api(400) with body message, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rank_200_with_error_field_returns_classified_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {
                    "code": 403,
                    "message": "Quota exceeded"
                }
            })))
            .mount(&server)
            .await;

        let ranker = GeminiRanker::with_base_url(Client::new(), &server.uri());
        let result = ranker.rank("test", &sample_publications()).await;
        assert!(matches!(result, Err(RankingError::QuotaExhausted(_))));
    }

    #[tokio::test]
    async fn rank_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let ranker = GeminiRanker::with_base_url(Client::new(), &server.uri());
        let result = ranker.rank("test", &sample_publications()).await;
        assert!(matches!(result, Err(RankingError::Malformed(_))));
    }
}
