//! Record normalization — completes, repairs, and filters one generated profile.
//!
//! Total by construction: malformed input degrades to defaults, never to an error.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::profiles::models::{FieldPolicy, ProfileRecord};

/// Keys owned by `ProfileRecord`'s typed fields; never copied into `fields`.
const SYSTEM_FIELDS: &[&str] = &["id", "email", "created_at", "updated_at"];

pub fn normalize(raw: Map<String, Value>, policy: &FieldPolicy) -> ProfileRecord {
    normalize_at(raw, policy, Utc::now())
}

/// Normalizes with a caller-supplied timestamp, used for both `created_at` and `updated_at`.
pub fn normalize_at(
    mut raw: Map<String, Value>,
    policy: &FieldPolicy,
    now: DateTime<Utc>,
) -> ProfileRecord {
    let id = Uuid::new_v4();

    let email = match raw.remove("email") {
        Some(Value::String(email)) if !email.trim().is_empty() => email.trim().to_string(),
        _ => synthesize_email(),
    };

    for field in policy.json_encoded {
        if let Some(value) = raw.get_mut(*field) {
            *value = decode_nested(value.take(), field);
        }
    }

    let fields: Map<String, Value> = raw
        .into_iter()
        .filter(|(key, _)| {
            !SYSTEM_FIELDS.contains(&key.as_str()) && policy.allowed.contains(&key.as_str())
        })
        .collect();

    ProfileRecord {
        id,
        email,
        created_at: now,
        updated_at: now,
        fields,
    }
}

/// Turns a JSON-encoded string into a nested object. Anything that is not an
/// object afterwards becomes `{}`.
fn decode_nested(value: Value, field: &str) -> Value {
    match value {
        Value::Object(map) => Value::Object(map),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Value::Object(map),
            _ => {
                debug!("Field '{field}' did not decode to an object; using empty object");
                Value::Object(Map::new())
            }
        },
        _ => Value::Object(Map::new()),
    }
}

fn synthesize_email() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("user_{}@example.com", &token[..12])
}
