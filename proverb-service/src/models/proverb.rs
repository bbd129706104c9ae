use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Deserializer, Serialize};
use service_core::error::AppError;
use validator::{Validate, ValidationError, ValidationErrors};

/// A stored proverb. Field names on disk are camelCase so existing collections
/// remain readable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Proverb {
    #[serde(rename = "_id")]
    pub id: ObjectId,

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

    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Proverb {
    /// Builds a new record with a fresh id and `created_at` set to now.
    ///
    /// The timestamp is truncated to milliseconds, the resolution of a BSON
    /// date, so the value returned on create matches what a later read yields.
    pub fn new(original_text: String, language: String, country: String) -> Self {
        Self {
            id: ObjectId::new(),
            original_text,
            english_translation: None,
            language,
            country,
            literal_meaning: None,
            metaphorical_meaning: None,
            usage_scenarios: None,
            life_lesson: None,
            therapeutic_value: None,
            relevant_situations: Vec::new(),
            mood_category: None,
            success_stories: None,
            created_at: mongodb::bson::DateTime::now().to_chrono(),
        }
    }
}

/// Fields to overwrite on an existing proverb.
///
/// Each field has three states: absent (`None`, left untouched), explicit
/// `null` (`Some(None)`, cleared) and a value (`Some(Some(_))`). The required
/// fields cannot be cleared; validation rejects a `null` for them. `id` and
/// `createdAt` cannot be patched.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProverbPatch {
    #[serde(default, deserialize_with = "present")]
    pub original_text: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub english_translation: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub language: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub country: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub literal_meaning: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub metaphorical_meaning: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub usage_scenarios: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub life_lesson: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub therapeutic_value: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub relevant_situations: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present")]
    pub mood_category: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub success_stories: Option<Option<String>>,
}

/// Marks a key that appeared in the body, keeping `null` distinct from absent.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ProverbPatch {
    fn required_fields(&self) -> [(&'static str, &'static str, &Option<Option<String>>); 3] {
        [
            ("original_text", "originalText", &self.original_text),
            ("language", "language", &self.language),
            ("country", "country", &self.country),
        ]
    }

    fn optional_fields(&self) -> [(&'static str, &Option<Option<String>>); 8] {
        [
            ("englishTranslation", &self.english_translation),
            ("literalMeaning", &self.literal_meaning),
            ("metaphoricalMeaning", &self.metaphorical_meaning),
            ("usageScenarios", &self.usage_scenarios),
            ("lifeLesson", &self.life_lesson),
            ("therapeuticValue", &self.therapeutic_value),
            ("moodCategory", &self.mood_category),
            ("successStories", &self.success_stories),
        ]
    }

    pub fn is_empty(&self) -> bool {
        *self == ProverbPatch::default()
    }

    /// The update carrying exactly the keys present in the patch: values go to
    /// `$set`, `null` optional text goes to `$unset`, a `null` list is stored
    /// empty.
    pub fn to_update_document(&self) -> Result<Document, AppError> {
        let mut set = Document::new();
        let mut unset = Document::new();

        for (_, key, value) in self.required_fields() {
            match value {
                Some(Some(v)) => {
                    set.insert(key, v.clone());
                }
                Some(None) => {
                    return Err(AppError::BadRequest(anyhow::anyhow!("{} is required", key)));
                }
                None => {}
            }
        }

        for (key, value) in self.optional_fields() {
            match value {
                Some(Some(v)) => {
                    set.insert(key, v.clone());
                }
                Some(None) => {
                    unset.insert(key, "");
                }
                None => {}
            }
        }

        if let Some(situations) = &self.relevant_situations {
            set.insert(
                "relevantSituations",
                situations.clone().unwrap_or_default(),
            );
        }

        let mut update = Document::new();
        if !set.is_empty() {
            update.insert("$set", set);
        }
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        Ok(update)
    }
}

impl Validate for ProverbPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (field, key, value) in self.required_fields() {
            let code = match value {
                Some(None) => "required",
                Some(Some(v)) if v.is_empty() => "length",
                _ => continue,
            };
            let mut error = ValidationError::new(code);
            error.message = Some(format!("{} is required", key).into());
            errors.add(field, error);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Applies `patch` over `existing`. Keys absent from the patch keep their
/// value; an explicit `null` clears an optional field.
pub fn merge(existing: Proverb, patch: ProverbPatch) -> Proverb {
    Proverb {
        id: existing.id,
        original_text: patch.original_text.flatten().unwrap_or(existing.original_text),
        english_translation: patch
            .english_translation
            .unwrap_or(existing.english_translation),
        language: patch.language.flatten().unwrap_or(existing.language),
        country: patch.country.flatten().unwrap_or(existing.country),
        literal_meaning: patch.literal_meaning.unwrap_or(existing.literal_meaning),
        metaphorical_meaning: patch
            .metaphorical_meaning
            .unwrap_or(existing.metaphorical_meaning),
        usage_scenarios: patch.usage_scenarios.unwrap_or(existing.usage_scenarios),
        life_lesson: patch.life_lesson.unwrap_or(existing.life_lesson),
        therapeutic_value: patch.therapeutic_value.unwrap_or(existing.therapeutic_value),
        relevant_situations: patch
            .relevant_situations
            .map(Option::unwrap_or_default)
            .unwrap_or(existing.relevant_situations),
        mood_category: patch.mood_category.unwrap_or(existing.mood_category),
        success_stories: patch.success_stories.unwrap_or(existing.success_stories),
        created_at: existing.created_at,
    }
}
