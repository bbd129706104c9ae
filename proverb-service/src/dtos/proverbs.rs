use crate::models::{Proverb, ProverbPatch};
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

/// Create payload. Every field is optional at the type level so a missing
/// required field is reported by validation rather than by the JSON parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProverbRequest {
    #[validate(
        required(message = "originalText is required"),
        length(min = 1, message = "originalText is required")
    )]
    pub original_text: Option<String>,
    pub english_translation: Option<String>,
    #[validate(
        required(message = "language is required"),
        length(min = 1, message = "language is required")
    )]
    pub language: Option<String>,
    #[validate(
        required(message = "country is required"),
        length(min = 1, message = "country is required")
    )]
    pub country: Option<String>,

    pub literal_meaning: Option<String>,
    pub metaphorical_meaning: Option<String>,
    pub usage_scenarios: Option<String>,
    pub life_lesson: Option<String>,

    pub therapeutic_value: Option<String>,
    pub relevant_situations: Option<Vec<String>>,
    pub mood_category: Option<String>,
    pub success_stories: Option<String>,
}

pub type UpdateProverbRequest = ProverbPatch;

impl TryFrom<CreateProverbRequest> for Proverb {
    type Error = AppError;

    fn try_from(req: CreateProverbRequest) -> Result<Self, Self::Error> {
        let missing = |field: &str| AppError::BadRequest(anyhow::anyhow!("{} is required", field));

        let mut proverb = Proverb::new(
            req.original_text.ok_or_else(|| missing("originalText"))?,
            req.language.ok_or_else(|| missing("language"))?,
            req.country.ok_or_else(|| missing("country"))?,
        );
        proverb.english_translation = req.english_translation;
        proverb.literal_meaning = req.literal_meaning;
        proverb.metaphorical_meaning = req.metaphorical_meaning;
        proverb.usage_scenarios = req.usage_scenarios;
        proverb.life_lesson = req.life_lesson;
        proverb.therapeutic_value = req.therapeutic_value;
        proverb.relevant_situations = req.relevant_situations.unwrap_or_default();
        proverb.mood_category = req.mood_category;
        proverb.success_stories = req.success_stories;

        Ok(proverb)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProverbResponse {
    pub id: String,
    pub original_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_translation: Option<String>,
    pub language: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_meaning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metaphorical_meaning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_scenarios: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_lesson: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapeutic_value: Option<String>,
    #[serde(default)]
    pub relevant_situations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_stories: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Proverb> for ProverbResponse {
    fn from(p: Proverb) -> Self {
        Self {
            id: p.id.to_hex(),
            original_text: p.original_text,
            english_translation: p.english_translation,
            language: p.language,
            country: p.country,
            literal_meaning: p.literal_meaning,
            metaphorical_meaning: p.metaphorical_meaning,
            usage_scenarios: p.usage_scenarios,
            life_lesson: p.life_lesson,
            therapeutic_value: p.therapeutic_value,
            relevant_situations: p.relevant_situations,
            mood_category: p.mood_category,
            success_stories: p.success_stories,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// JSON body extractor whose rejections use the service's `{message}` error
/// shape with status 400. Validation is left to the handler.
pub struct ProverbJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ProverbJson<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.body_text())))?;

        Ok(ProverbJson(value))
    }
}
