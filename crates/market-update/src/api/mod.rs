//! Search provider clients

pub mod duckduckgo;

pub use duckduckgo::{DuckDuckGoClient, SearchBackend, SearchHit};

#[cfg(test)]
pub use duckduckgo::MockSearchBackend;
