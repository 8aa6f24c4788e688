//! Response interpretation — turns raw model text into a validated shape.
//!
//! Only the string-list expectation has a recovery path (quoted-substring extraction).
//! Structured output is never guessed at: malformed objects are a parse failure.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use crate::llm_client::{strip_json_fences, RawModelResponse};

/// The shape a caller expects the model's reply to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    PlainText,
    StringList,
    StructuredList,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterpretedResult {
    PlainText(String),
    StringList(Vec<String>),
    StructuredList(Vec<Map<String, Value>>),
    /// The reply could not be brought into the expected shape. `raw` is kept for
    /// diagnostics and is `None` when the call itself produced no text.
    ParseFailure { raw: Option<String> },
}

impl InterpretedResult {
    pub fn kind(&self) -> &'static str {
        match self {
            InterpretedResult::PlainText(_) => "plain text",
            InterpretedResult::StringList(_) => "string list",
            InterpretedResult::StructuredList(_) => "structured list",
            InterpretedResult::ParseFailure { .. } => "parse failure",
        }
    }
}

pub fn interpret(raw: &RawModelResponse, expectation: Expectation) -> InterpretedResult {
    let text = match raw {
        Ok(text) => text.trim(),
        Err(_) => return InterpretedResult::ParseFailure { raw: None },
    };
    if text.is_empty() {
        return InterpretedResult::ParseFailure { raw: None };
    }

    match expectation {
        Expectation::PlainText => InterpretedResult::PlainText(text.to_string()),
        Expectation::StringList => interpret_string_list(text),
        Expectation::StructuredList => interpret_structured_list(text),
    }
}

fn interpret_string_list(text: &str) -> InterpretedResult {
    match serde_json::from_str::<Value>(strip_json_fences(text)) {
        Ok(Value::Array(items)) => {
            let strings: Option<Vec<String>> = items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect();
            strings
                .map(InterpretedResult::StringList)
                .unwrap_or_else(|| parse_failure(text))
        }
        Ok(_) => {
            warn!("LLM returned valid JSON that is not a list of strings");
            parse_failure(text)
        }
        Err(e) => {
            warn!("Failed to parse JSON from LLM: {e}. Raw response: {text}");
            let items = extract_quoted(text);
            if items.is_empty() {
                parse_failure(text)
            } else {
                InterpretedResult::StringList(items)
            }
        }
    }
}

fn interpret_structured_list(text: &str) -> InterpretedResult {
    match serde_json::from_str::<Value>(strip_json_fences(text)) {
        Ok(Value::Array(items)) => {
            let objects: Option<Vec<Map<String, Value>>> = items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();
            objects
                .map(InterpretedResult::StructuredList)
                .unwrap_or_else(|| parse_failure(text))
        }
        Ok(_) => parse_failure(text),
        Err(e) => {
            warn!("Structured LLM output is not valid JSON: {e}");
            parse_failure(text)
        }
    }
}

fn parse_failure(text: &str) -> InterpretedResult {
    InterpretedResult::ParseFailure {
        raw: Some(text.to_string()),
    }
}

/// Every single- or double-quoted substring, in order of appearance.
fn extract_quoted(text: &str) -> Vec<String> {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    let re = QUOTED.get_or_init(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("valid regex"));
    re.captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}
