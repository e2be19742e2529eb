//! Configuration for search and report delivery

use crate::error::{MarketError, Result};
use market_utils::{process_env, var_opt, var_or, var_parse_or};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Channel used when `SLACK_CHANNEL` is not set
pub const DEFAULT_CHANNEL: &str = "#general";

/// Default maximum characters per delivered message part
pub const DEFAULT_MAX_PART_LENGTH: usize = 3000;

/// Default maximum characters of formatted content placed in a single block
pub const DEFAULT_MAX_BLOCK_LENGTH: usize = 3000;

/// Default Slack Web API base URL
pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api/";

/// Default DuckDuckGo HTML endpoint
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://html.duckduckgo.com/html/";

/// Settings for the messaging client and chunked delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessengerConfig {
    /// Bot token; required only when a messenger is actually built
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Destination channel (ID or `#name`)
    pub channel: String,

    /// Web API base URL
    pub api_base: String,

    /// Maximum characters per message part
    pub max_part_length: usize,

    /// Maximum characters of formatted content allowed inside a block
    pub max_block_length: usize,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            token: None,
            channel: DEFAULT_CHANNEL.to_string(),
            api_base: DEFAULT_SLACK_API_BASE.to_string(),
            max_part_length: DEFAULT_MAX_PART_LENGTH,
            max_block_length: DEFAULT_MAX_BLOCK_LENGTH,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl MessengerConfig {
    /// Return the token or fail with a configuration error
    pub fn require_token(&self) -> Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            MarketError::ConfigError(
                "No Slack token provided. Set SLACK_BOT_TOKEN or pass a token explicitly"
                    .to_string(),
            )
        })
    }
}

/// Settings for the search provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint
    pub base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Requests allowed per minute; 0 disables throttling
    pub rate_limit_per_minute: u32,

    /// How long identical searches are served from cache; zero disables caching
    pub cache_ttl: Duration,

    /// User-Agent header sent with search requests
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            rate_limit_per_minute: 10,
            cache_ttl: Duration::from_secs(300),
            user_agent: concat!("market-update/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Directory reports are written to when none is configured
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Process-wide configuration, built once and passed by reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketUpdateConfig {
    /// Messaging settings
    pub messenger: MessengerConfig,

    /// Search settings
    pub search: SearchConfig,

    /// Directory where report files are written
    pub output_dir: PathBuf,
}

impl Default for MarketUpdateConfig {
    fn default() -> Self {
        Self {
            messenger: MessengerConfig::default(),
            search: SearchConfig::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl MarketUpdateConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketUpdateConfigBuilder {
        MarketUpdateConfigBuilder::default()
    }

    /// Build configuration from the process environment
    ///
    /// Reads `SLACK_BOT_TOKEN`, `SLACK_CHANNEL`, `SLACK_API_BASE`, `SLACK_MAX_PART_LENGTH`,
    /// `SLACK_MAX_BLOCK_LENGTH`, `MARKET_UPDATE_TIMEOUT_SECS`, `SEARCH_BASE_URL`,
    /// `SEARCH_RATE_LIMIT_PER_MINUTE`, `SEARCH_CACHE_TTL_SECS` and `MARKET_UPDATE_OUTPUT_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(process_env)
    }

    /// Build configuration from variables supplied by `lookup`
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout = Duration::from_secs(var_parse_or(
            &lookup,
            "MARKET_UPDATE_TIMEOUT_SECS",
            30_u64,
        )?);

        let messenger = MessengerConfig {
            token: var_opt(&lookup, "SLACK_BOT_TOKEN"),
            channel: var_or(&lookup, "SLACK_CHANNEL", DEFAULT_CHANNEL),
            api_base: var_or(&lookup, "SLACK_API_BASE", DEFAULT_SLACK_API_BASE),
            max_part_length: var_parse_or(
                &lookup,
                "SLACK_MAX_PART_LENGTH",
                DEFAULT_MAX_PART_LENGTH,
            )?,
            max_block_length: var_parse_or(
                &lookup,
                "SLACK_MAX_BLOCK_LENGTH",
                DEFAULT_MAX_BLOCK_LENGTH,
            )?,
            request_timeout: timeout,
        };

        let search = SearchConfig {
            base_url: var_or(&lookup, "SEARCH_BASE_URL", DEFAULT_SEARCH_BASE_URL),
            request_timeout: timeout,
            rate_limit_per_minute: var_parse_or(&lookup, "SEARCH_RATE_LIMIT_PER_MINUTE", 10_u32)?,
            cache_ttl: Duration::from_secs(var_parse_or(
                &lookup,
                "SEARCH_CACHE_TTL_SECS",
                300_u64,
            )?),
            ..SearchConfig::default()
        };

        let config = Self {
            messenger,
            search,
            output_dir: PathBuf::from(var_or(
                &lookup,
                "MARKET_UPDATE_OUTPUT_DIR",
                DEFAULT_OUTPUT_DIR,
            )),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.messenger.channel.trim().is_empty() {
            return Err(MarketError::ConfigError("channel must not be empty".to_string()));
        }

        if self.messenger.max_part_length == 0 {
            return Err(MarketError::ConfigError(
                "max_part_length must be greater than 0".to_string(),
            ));
        }

        if self.messenger.max_block_length == 0 {
            return Err(MarketError::ConfigError(
                "max_block_length must be greater than 0".to_string(),
            ));
        }

        if self.messenger.request_timeout.is_zero() || self.search.request_timeout.is_zero() {
            return Err(MarketError::ConfigError(
                "request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for MarketUpdateConfig
#[derive(Debug, Default)]
pub struct MarketUpdateConfigBuilder {
    token: Option<String>,
    channel: Option<String>,
    api_base: Option<String>,
    max_part_length: Option<usize>,
    max_block_length: Option<usize>,
    request_timeout: Option<Duration>,
    search_base_url: Option<String>,
    rate_limit_per_minute: Option<u32>,
    cache_ttl: Option<Duration>,
    output_dir: Option<PathBuf>,
}

impl MarketUpdateConfigBuilder {
    /// Set the messaging bot token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the destination channel
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Set the messaging API base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the maximum characters per message part
    pub fn max_part_length(mut self, length: usize) -> Self {
        self.max_part_length = Some(length);
        self
    }

    /// Set the maximum characters of formatted content per block
    pub fn max_block_length(mut self, length: usize) -> Self {
        self.max_block_length = Some(length);
        self
    }

    /// Set the per-request timeout for both providers
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the search endpoint
    pub fn search_base_url(mut self, url: impl Into<String>) -> Self {
        self.search_base_url = Some(url.into());
        self
    }

    /// Set the search rate limit (0 disables it)
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set the search cache TTL (zero disables it)
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Set the report output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketUpdateConfig> {
        let messenger_defaults = MessengerConfig::default();
        let search_defaults = SearchConfig::default();

        let config = MarketUpdateConfig {
            messenger: MessengerConfig {
                token: self.token,
                channel: self.channel.unwrap_or(messenger_defaults.channel),
                api_base: self.api_base.unwrap_or(messenger_defaults.api_base),
                max_part_length: self
                    .max_part_length
                    .unwrap_or(messenger_defaults.max_part_length),
                max_block_length: self
                    .max_block_length
                    .unwrap_or(messenger_defaults.max_block_length),
                request_timeout: self
                    .request_timeout
                    .unwrap_or(messenger_defaults.request_timeout),
            },
            search: SearchConfig {
                base_url: self.search_base_url.unwrap_or(search_defaults.base_url),
                request_timeout: self
                    .request_timeout
                    .unwrap_or(search_defaults.request_timeout),
                rate_limit_per_minute: self
                    .rate_limit_per_minute
                    .unwrap_or(search_defaults.rate_limit_per_minute),
                cache_ttl: self.cache_ttl.unwrap_or(search_defaults.cache_ttl),
                user_agent: search_defaults.user_agent,
            },
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        };

        config.validate()?;
        Ok(config)
    }
}
