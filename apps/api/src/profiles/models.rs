use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Business fields a generated profile may carry into the datastore.
/// Everything else the model emits is dropped during normalization.
pub const PROFILE_FIELDS: &[&str] = &[
    "email",
    "username",
    "full_name",
    "display_name",
    "bio",
    "date_of_birth",
    "age",
    "gender",
    "pronouns",
    "location",
    "occupation",
    "education",
    "height_cm",
    "interests",
    "photo_urls",
    "looking_for",
    "is_verified",
    "is_active",
    "onboarding_completed",
    "last_active_at",
    "visibility_preferences",
    "notification_preferences",
    "questionnaire_answers",
    "assessment_results",
];

/// Fields the model sends as JSON-encoded strings; stored as nested objects.
pub const JSON_ENCODED_PROFILE_FIELDS: &[&str] = &[
    "visibility_preferences",
    "notification_preferences",
    "questionnaire_answers",
    "assessment_results",
];

/// Which fields survive normalization and which get decoded from JSON text.
#[derive(Debug, Clone, Copy)]
pub struct FieldPolicy<'a> {
    pub allowed: &'a [&'a str],
    pub json_encoded: &'a [&'a str],
}

pub const PROFILE_POLICY: FieldPolicy<'static> = FieldPolicy {
    allowed: PROFILE_FIELDS,
    json_encoded: JSON_ENCODED_PROFILE_FIELDS,
};

/// A normalized profile ready for insertion.
///
/// System fields are typed and always assigned by the service, never by the model.
/// `fields` holds the allow-listed business fields in the order the model emitted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Structured-output schema hint for bulk profile generation (Gemini OpenAPI subset).
pub fn profile_response_schema() -> Value {
    let string = json!({"type": "STRING"});
    let mut properties = Map::new();
    for field in PROFILE_FIELDS {
        let schema = match *field {
            "age" | "height_cm" => json!({"type": "INTEGER"}),
            "is_verified" | "is_active" | "onboarding_completed" => json!({"type": "BOOLEAN"}),
            "interests" | "photo_urls" => json!({"type": "ARRAY", "items": string.clone()}),
            _ => string.clone(),
        };
        properties.insert((*field).to_string(), schema);
    }
    for field in ["id", "created_at", "updated_at"] {
        properties.insert(field.to_string(), string.clone());
    }

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": properties,
            "required": ["email", "username", "full_name", "bio"]
        }
    })
}
