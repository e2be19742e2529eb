//! Market news search and report delivery
//!
//! This crate is the core behind a periodic market-news report. The report itself is
//! drafted by an external orchestration pipeline; this crate provides the two contracts
//! that pipeline calls into:
//!
//! - **Search**: [`NewsSearchTool`] accepts a query as a plain string, a JSON string, or an
//!   object with optional fields, normalizes it to a [`SearchRequest`], and dispatches it to
//!   DuckDuckGo. Failures come back to the orchestrator as a soft-failure string.
//! - **Delivery**: [`ReportMessenger`] reads a finished report and posts it to Slack,
//!   splitting it into "Part i/N" messages when it is long and falling back to plain text
//!   when rich formatting is rejected.
//!
//! # Example
//!
//! ```rust,ignore
//! use market_update::{MarketUpdateConfig, ReportMessenger};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MarketUpdateConfig::from_env()?;
//!     let messenger = ReportMessenger::from_config(&config.messenger)?;
//!
//!     let sent = messenger
//!         .deliver(&config.messenger.channel, "output/NVS_report_20250227_080406.md", None)
//!         .await;
//!     println!("delivered: {sent}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod delivery;
pub mod error;
pub mod platforms;
pub mod publisher;
pub mod report;
pub mod search;
pub mod tools;

pub use config::{MarketUpdateConfig, MessengerConfig, SearchConfig};
pub use delivery::{DeliverySummary, MessagePart, ReportMessenger, SendOutcome};
pub use error::{MarketError, Result};
pub use publisher::ReportPublisher;
pub use report::{ReportArtifact, RunInputs};
pub use search::{RawSearchInput, SearchRequest, normalize};
pub use tools::{NewsSearchTool, ReportDeliveryTool, SEARCH_ERROR_PREFIX, SearchOutput};

use market_tools::ToolRegistry;
use std::sync::Arc;

/// Registry holding the search tool and, when a messaging token is configured, the
/// report delivery tool
pub fn default_registry(config: &MarketUpdateConfig) -> Result<ToolRegistry> {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(NewsSearchTool::from_config(&config.search)?));

    match ReportMessenger::from_config(&config.messenger) {
        Ok(messenger) => registry.register(Arc::new(ReportDeliveryTool::new(
            Arc::new(messenger),
            config.messenger.channel.clone(),
        ))),
        Err(e) => tracing::debug!("Report delivery tool unavailable: {e}"),
    }

    Ok(registry)
}
