//! Tool for searching recent market news

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use market_core::Result as CoreResult;
use market_tools::Tool;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{DuckDuckGoClient, SearchBackend, SearchHit};
use crate::cache::SearchCache;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::search::{OutputShape, RawSearchInput, SearchMode, SearchRequest};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Prefix of the text returned to the orchestrator when a search fails
pub const SEARCH_ERROR_PREFIX: &str = "Error performing search";

/// Result of a dispatched search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchOutput {
    /// Plain text (basic mode, or detailed mode with string output)
    Text(String),
    /// Structured records (detailed mode with list output)
    Records(Vec<SearchHit>),
}

impl SearchOutput {
    /// Shape provider hits according to the request
    pub fn from_hits(request: &SearchRequest, hits: Vec<SearchHit>) -> Self {
        match (request.mode, request.output_shape) {
            (SearchMode::Basic, _) => Self::Text(
                hits.iter()
                    .map(|hit| hit.snippet.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            (SearchMode::Detailed, OutputShape::String) => Self::Text(
                hits.iter()
                    .map(|hit| {
                        format!(
                            "snippet: {}, title: {}, link: {}",
                            hit.snippet, hit.title, hit.link
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            (SearchMode::Detailed, OutputShape::List) => Self::Records(hits),
        }
    }
}

/// News search tool: normalizes flexible input and dispatches it to a search backend
pub struct NewsSearchTool {
    backend: Arc<dyn SearchBackend>,
    cache: Option<SearchCache>,
    rate_limiter: Option<SharedRateLimiter>,
}

impl NewsSearchTool {
    /// Create a tool over any backend, with no cache and no throttling
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            cache: None,
            rate_limiter: None,
        }
    }

    /// Create a DuckDuckGo-backed tool from search settings
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let backend: Arc<dyn SearchBackend> = Arc::new(DuckDuckGoClient::new(config)?);
        let mut tool = Self::new(backend).with_rate_limit(config.rate_limit_per_minute);
        if !config.cache_ttl.is_zero() {
            tool = tool.with_cache(SearchCache::new(config.cache_ttl));
        }
        Ok(tool)
    }

    /// Serve repeated identical searches from `cache`
    pub fn with_cache(mut self, cache: SearchCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Allow at most `per_minute` searches per minute; 0 removes the limit
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limiter = NonZeroU32::new(per_minute)
            .map(|n| Arc::new(RateLimiter::direct(Quota::per_minute(n))));
        self
    }

    /// Normalize raw input and run the search
    pub async fn search(&self, input: &RawSearchInput) -> Result<SearchOutput> {
        let request = input.normalize();
        self.dispatch(&request).await
    }

    /// Run an already-normalized search
    pub async fn dispatch(&self, request: &SearchRequest) -> Result<SearchOutput> {
        match &self.cache {
            Some(cache) => {
                cache
                    .get_or_fetch(request.clone(), || self.fetch(request))
                    .await
            }
            None => self.fetch(request).await,
        }
    }

    async fn fetch(&self, request: &SearchRequest) -> Result<SearchOutput> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        info!(
            query = %request.query,
            mode = ?request.mode,
            backend = self.backend.name(),
            "Running search"
        );

        let hits = self.backend.search(request).await?;
        Ok(SearchOutput::from_hits(request, hits))
    }
}

#[async_trait]
impl Tool for NewsSearchTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let input = RawSearchInput::from(params);

        match self.search(&input).await {
            Ok(output) => Ok(serde_json::to_value(output)?),
            Err(e) => {
                warn!("Search failed: {e}");
                Ok(Value::String(format!("{SEARCH_ERROR_PREFIX}: {e}")))
            }
        }
    }

    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search for recent news and information. Input can be a simple search query string \
         or an object, e.g. 'MSFT stock news last 3 days' or \
         {\"query\": \"MSFT stock news last 3 days\", \"search_type\": \"detailed\", \"time_period\": \"d\"}. \
         A result starting with 'Error performing search' means the search failed."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "description": "Search query text, or an object with a 'query' or 'description' key",
                    "oneOf": [{ "type": "string" }, { "type": "object" }]
                },
                "search_type": {
                    "type": "string",
                    "enum": ["basic", "detailed"],
                    "default": "detailed"
                },
                "max_results": {
                    "type": "integer",
                    "minimum": 0,
                    "default": 20
                },
                "output_format": {
                    "type": "string",
                    "enum": ["list", "string"],
                    "default": "list"
                },
                "region": {
                    "type": "string",
                    "default": "all"
                },
                "time_period": {
                    "type": "string",
                    "enum": ["d", "w", "m"],
                    "default": "d"
                },
                "backend": {
                    "type": "string",
                    "default": "news"
                }
            },
            "required": ["query"]
        })
    }
}
