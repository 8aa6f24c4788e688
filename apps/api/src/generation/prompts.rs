// Prompt construction for every generation request kind.
// Pure string building: no I/O, never fails.

use serde_json::Value;

use crate::generation::request::GenerationRequest;
use crate::llm_client::prompts::{DATING_APP_TONE, JSON_ONLY_INSTRUCTION};
use crate::profiles::models::JSON_ENCODED_PROFILE_FIELDS;

const BIO_STYLE_DIRECTIVE: &str =
    " The profile should be engaging, positive, and highlight unique qualities. Keep it concise.";

const FEED_FORMAT_DIRECTIVE: &str = "Each item should be short, distinct, and relevant to dating app context \
    (e.g., 'X liked Y photo', 'New match with Z', 'A new event nearby'). \
    Format as a JSON list of strings, e.g., ['Item 1', 'Item 2'].";

const DAILY_PROMPT_DIRECTIVE: &str = "Generate a short, engaging, and thought-provoking daily question or prompt \
    for a dating app user to answer. It should encourage self-reflection or spark conversation.";

const DAILY_PROMPT_EXAMPLE: &str =
    " Example: 'What's one small thing that always makes your day better?'";

/// Bulk profile prompt. Replace `{count}`, `{json_fields}`, `{tone}` and `{json_only}`.
const BULK_PROFILES_TEMPLATE: &str = r#"Generate {count} realistic but entirely fictional dating app user profiles.

Return a JSON ARRAY of exactly {count} objects. Each object has these fields:
- "id": a valid UUID v4 string
- "email": a unique, obviously fake email address (e.g. "alex.rivera42@example.com")
- "username": a unique lowercase handle
- "full_name", "display_name": strings
- "bio": 2-3 sentence dating profile bio
- "date_of_birth": ISO-8601 date (YYYY-MM-DD), adult users only
- "age": integer matching date_of_birth
- "gender", "pronouns", "location", "occupation", "education", "looking_for": strings
- "height_cm": integer
- "interests": array of 3-6 short strings
- "photo_urls": array of 1-3 placeholder image URLs
- "is_verified", "is_active", "onboarding_completed": booleans, always true
- "created_at", "updated_at", "last_active_at": ISO-8601 timestamps with timezone
- {json_fields}: each MUST be a JSON-encoded STRING containing an object
  (e.g. "{\"show_age\": true, \"show_location\": false}"), never a nested object

Vary names, locations, ages, and interests across profiles. {tone}
{json_only}"#;

/// Builds the natural-language prompt for a request.
pub fn build_prompt(request: &GenerationRequest) -> String {
    match request {
        GenerationRequest::Bio {
            user_data,
            instructions,
        } => bio_prompt(user_data, instructions.as_deref()),
        GenerationRequest::Feed {
            profile_summary,
            recent_activity,
            item_count,
        } => feed_prompt(profile_summary, recent_activity, item_count.get()),
        GenerationRequest::DailyPrompt { context } => daily_prompt(context.as_deref()),
        GenerationRequest::BulkProfiles { count } => bulk_profiles_prompt(count.get()),
        GenerationRequest::Freeform { prompt } => prompt.clone(),
    }
}

fn bio_prompt(user_data: &[(String, String)], instructions: Option<&str>) -> String {
    let user_data_str = user_data
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "Create a compelling dating profile bio based on the following user data: {user_data_str}. "
    );
    if let Some(instructions) = instructions.filter(|i| !i.trim().is_empty()) {
        prompt.push_str(&format!(
            "Additionally, follow these instructions: {instructions}"
        ));
    }
    prompt.push_str(BIO_STYLE_DIRECTIVE);
    prompt
}

fn feed_prompt(profile_summary: &str, recent_activity: &[Value], item_count: u32) -> String {
    // Display on Value is infallible JSON serialization
    let activity_json = Value::Array(recent_activity.to_vec()).to_string();
    format!(
        "Based on the user's profile summary: \"{profile_summary}\"\n\
         And recent activities: {activity_json}\n\
         Generate {item_count} engaging and personalized news feed items. {FEED_FORMAT_DIRECTIVE}"
    )
}

fn daily_prompt(context: Option<&str>) -> String {
    let mut prompt = DAILY_PROMPT_DIRECTIVE.to_string();
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!(" Consider the following context: {context}."));
    }
    prompt.push_str(DAILY_PROMPT_EXAMPLE);
    prompt
}

fn bulk_profiles_prompt(count: u32) -> String {
    let json_fields = JSON_ENCODED_PROFILE_FIELDS
        .iter()
        .map(|f| format!("\"{f}\""))
        .collect::<Vec<_>>()
        .join(", ");

    BULK_PROFILES_TEMPLATE
        .replace("{count}", &count.to_string())
        .replace("{json_fields}", &json_fields)
        .replace("{tone}", DATING_APP_TONE)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use serde_json::json;

    use super::*;

    fn bio(pairs: &[(&str, &str)], instructions: Option<&str>) -> String {
        build_prompt(&GenerationRequest::Bio {
            user_data: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            instructions: instructions.map(str::to_string),
        })
    }

    #[test]
    fn test_bio_prompt_lists_pairs_in_order_once() {
        let pairs = [("name", "John"), ("age", "30"), ("hobbies", "hiking, reading")];
        let prompt = bio(&pairs, None);

        assert!(prompt.contains("name: John, age: 30, hobbies: hiking, reading."));
        for (k, v) in pairs {
            assert_eq!(prompt.matches(&format!("{k}: {v}")).count(), 1);
        }
        assert!(prompt.ends_with("Keep it concise."));
        assert!(!prompt.contains("Additionally"));
    }

    #[test]
    fn test_bio_prompt_keeps_caller_order() {
        let prompt = bio(&[("zodiac", "Leo"), ("city", "Austin")], None);
        let zodiac = prompt.find("zodiac: Leo").unwrap();
        let city = prompt.find("city: Austin").unwrap();
        assert!(zodiac < city);
    }

    #[test]
    fn test_bio_prompt_appends_instructions_before_style() {
        let prompt = bio(&[("name", "Ana")], Some("Mention her dog."));
        let instructions = prompt
            .find("Additionally, follow these instructions: Mention her dog.")
            .unwrap();
        let style = prompt.find("The profile should be engaging").unwrap();
        assert!(instructions < style);
    }

    #[test]
    fn test_feed_prompt_embeds_activity_json_and_count() {
        let prompt = build_prompt(&GenerationRequest::Feed {
            profile_summary: "Coffee lover in Berlin".to_string(),
            recent_activity: vec![json!({"type": "liked", "item": "photo", "user": "Jane"})],
            item_count: NonZeroU32::new(3).unwrap(),
        });

        assert!(prompt.contains("\"Coffee lover in Berlin\""));
        assert!(prompt.contains(r#"[{"type":"liked","item":"photo","user":"Jane"}]"#));
        assert!(prompt.contains("Generate 3 engaging"));
        assert!(prompt.contains("JSON list of strings"));
    }

    #[test]
    fn test_daily_prompt_with_and_without_context() {
        let plain = build_prompt(&GenerationRequest::DailyPrompt { context: None });
        assert!(!plain.contains("Consider the following context"));
        assert!(plain.ends_with("makes your day better?'"));

        let with_context = build_prompt(&GenerationRequest::DailyPrompt {
            context: Some("Valentine's week".to_string()),
        });
        assert!(with_context.contains(" Consider the following context: Valentine's week."));
    }

    #[test]
    fn test_bulk_prompt_states_count_and_field_rules() {
        let prompt = build_prompt(&GenerationRequest::BulkProfiles {
            count: NonZeroU32::new(7).unwrap(),
        });

        assert!(prompt.contains("Generate 7 realistic"));
        assert!(prompt.contains("exactly 7 objects"));
        assert!(prompt.contains("valid UUID"));
        assert!(prompt.contains("ISO-8601"));
        assert!(prompt.contains("always true"));
        for field in JSON_ENCODED_PROFILE_FIELDS {
            assert!(prompt.contains(&format!("\"{field}\"")));
        }
        assert!(!prompt.contains("{count}"));
    }
}
