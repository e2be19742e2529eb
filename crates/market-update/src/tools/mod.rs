//! Tools exposed to the orchestrator

pub mod deliver;
pub mod search;

pub use deliver::ReportDeliveryTool;
pub use search::{NewsSearchTool, SEARCH_ERROR_PREFIX, SearchOutput};
