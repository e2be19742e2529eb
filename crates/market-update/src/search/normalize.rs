//! Reduce loosely-shaped search input to a [`SearchRequest`]
//!
//! Normalization is total: malformed or partial input degrades to defaults and never
//! produces an error.

use super::request::{OutputShape, Recency, SearchMode, SearchRequest};
use serde_json::{Map, Value};

/// Search input as received from a caller
#[derive(Debug, Clone, PartialEq)]
pub enum RawSearchInput {
    /// Bare text, possibly JSON-encoded
    Text(String),
    /// Already-decoded object of fields
    Fields(Map<String, Value>),
}

impl RawSearchInput {
    /// Normalize into canonical parameters
    pub fn normalize(&self) -> SearchRequest {
        normalize(self)
    }
}

impl From<&str> for RawSearchInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawSearchInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Value> for RawSearchInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::Fields(fields),
            Value::String(text) => Self::Text(text),
            other => Self::Text(other.to_string()),
        }
    }
}

/// The `query` field, which may be plain text or one level of nested object
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Plain(String),
    Structured(Map<String, Value>),
}

impl QueryValue {
    /// Classify a JSON value found under `query`
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Self::Structured(fields.clone()),
            other => Self::Plain(scalar_text(other)),
        }
    }

    /// Text under `description` (preferred) or `query`
    ///
    /// Returns `None` for a structured value carrying neither key.
    pub fn extract(&self) -> Option<String> {
        match self {
            Self::Plain(text) => Some(text.clone()),
            Self::Structured(fields) => fields
                .get("description")
                .or_else(|| fields.get("query"))
                .map(scalar_text),
        }
    }

    /// Total unwrapping: extracted text, or the compact JSON of the nested object
    pub fn to_text(&self) -> String {
        match (self.extract(), self) {
            (Some(text), _) => text,
            (None, Self::Structured(fields)) => {
                tracing::debug!("Nested query has neither 'description' nor 'query'");
                Value::Object(fields.clone()).to_string()
            }
            (None, Self::Plain(text)) => text.clone(),
        }
    }
}

/// Normalize raw search input into a [`SearchRequest`]
///
/// - plain text is the query
/// - a JSON object string is parsed and treated as fields
/// - fields are read with defaults for anything missing or mistyped
pub fn normalize(input: &RawSearchInput) -> SearchRequest {
    match input {
        RawSearchInput::Fields(fields) => from_fields(fields),
        RawSearchInput::Text(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(fields)) => from_fields(&fields),
            Ok(Value::String(inner)) => SearchRequest::with_query(inner),
            _ => SearchRequest::with_query(text.clone()),
        },
    }
}

fn from_fields(fields: &Map<String, Value>) -> SearchRequest {
    let defaults = SearchRequest::default();

    let query = match fields.get("query").or_else(|| fields.get("description")) {
        Some(value) => QueryValue::from_value(value).to_text(),
        None => Value::Object(fields.clone()).to_string(),
    };

    SearchRequest {
        query,
        mode: text_field(fields, &["search_type", "mode"])
            .and_then(SearchMode::parse)
            .unwrap_or(defaults.mode),
        max_results: count_field(fields, "max_results").unwrap_or(defaults.max_results),
        output_shape: text_field(fields, &["output_format", "output_shape"])
            .and_then(OutputShape::parse)
            .unwrap_or(defaults.output_shape),
        region: text_field(fields, &["region"])
            .filter(|s| !s.trim().is_empty())
            .map_or(defaults.region, |s| s.trim().to_string()),
        recency: text_field(fields, &["time_period", "recency"])
            .and_then(Recency::parse)
            .unwrap_or(defaults.recency),
        backend: text_field(fields, &["backend"])
            .filter(|s| !s.trim().is_empty())
            .map_or(defaults.backend, |s| s.trim().to_string()),
    }
}

/// First string value found under any of `keys`
fn text_field<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
}

/// Non-negative integer, accepting numeric strings
fn count_field(fields: &Map<String, Value>, key: &str) -> Option<usize> {
    match fields.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
