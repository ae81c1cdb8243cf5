use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: Option<u16>,
    pub message: Option<String>,
}

/// Filter hints proposed by the ranking model. Values are free text and are
/// not validated against the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestedFilters {
    #[serde(deserialize_with = "null_as_default")]
    pub organism_type: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub experiment_type: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub mission: Vec<String>,
}

impl SuggestedFilters {
    pub fn is_empty(&self) -> bool {
        self.organism_type.is_empty() && self.experiment_type.is_empty() && self.mission.is_empty()
    }
}

/// Relevance ordering returned by a ranking source, most relevant first.
///
/// `no_results` is presentation-only: any ids it carries are applied like a normal ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ranking {
    #[serde(deserialize_with = "lenient_ids")]
    pub paper_ids: Vec<String>,
    pub summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub explanation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub no_results: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub suggested_filters: SuggestedFilters,
}

impl Ranking {
    /// Placeholder used when the model reply holds no JSON object at all.
    pub fn unprocessable() -> Self {
        Self {
            paper_ids: vec![],
            summary: Some(
                "Unable to process your search. Please try again with different terms.".into(),
            ),
            explanation: "Error processing AI response.".into(),
            no_results: true,
            suggested_filters: SuggestedFilters::default(),
        }
    }
}

/// Models write `null` for fields they have nothing to say about; treat it like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Models sometimes emit numeric ids (`[1, 2]`) even when the dataset uses strings.
fn lenient_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    let ids = Option::<Vec<Id>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(ids
        .into_iter()
        .map(|id| match id {
            Id::Text(s) => s,
            Id::Number(n) => n.to_string(),
        })
        .collect())
}
