//! Canonical search parameters

use serde::{Deserialize, Serialize};

/// Default number of results requested
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Default region (all regions)
pub const DEFAULT_REGION: &str = "all";

/// Default backend filter
pub const DEFAULT_BACKEND: &str = "news";

/// How much work the provider should do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Simple run returning plain text
    Basic,
    /// Parameterized search honoring region, recency, backend and output shape
    #[default]
    Detailed,
}

impl SearchMode {
    /// Parse a mode name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "detailed" => Some(Self::Detailed),
            _ => None,
        }
    }
}

/// Shape of detailed search output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    /// Ordered list of structured result records
    #[default]
    List,
    /// One formatted string
    String,
}

impl OutputShape {
    /// Parse a shape name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "list" => Some(Self::List),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

/// Recency window for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recency {
    #[default]
    #[serde(rename = "d")]
    Day,
    #[serde(rename = "w")]
    Week,
    #[serde(rename = "m")]
    Month,
}

impl Recency {
    /// Parse either the short code (`d`, `w`, `m`) or the long name
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "d" | "day" => Some(Self::Day),
            "w" | "week" => Some(Self::Week),
            "m" | "month" => Some(Self::Month),
            _ => None,
        }
    }

    /// Short code understood by the search provider
    pub fn code(self) -> &'static str {
        match self {
            Self::Day => "d",
            Self::Week => "w",
            Self::Month => "m",
        }
    }
}

/// Canonical search parameters
///
/// `query` is always plain text here, whatever shape the caller used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Search text
    pub query: String,
    /// Basic or detailed search
    pub mode: SearchMode,
    /// Maximum records returned; 0 means no limit
    pub max_results: usize,
    /// List or string output for detailed searches
    pub output_shape: OutputShape,
    /// Region code, `all` for worldwide
    pub region: String,
    /// Recency window
    pub recency: Recency,
    /// Backend filter, `news` for news articles only
    pub backend: String,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            mode: SearchMode::default(),
            max_results: DEFAULT_MAX_RESULTS,
            output_shape: OutputShape::default(),
            region: DEFAULT_REGION.to_string(),
            recency: Recency::default(),
            backend: DEFAULT_BACKEND.to_string(),
        }
    }
}

impl SearchRequest {
    /// Request with the given query and every other field defaulted
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}
