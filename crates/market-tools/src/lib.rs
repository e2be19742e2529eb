//! Tool contract for market-update
//!
//! An external orchestrator drives market-update through tools: named functions with a
//! JSON input schema. The search tool and the report delivery tool both implement [`Tool`]
//! and are looked up through a [`ToolRegistry`].

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::Tool;
