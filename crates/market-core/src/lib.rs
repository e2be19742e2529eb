//! Core types for market-update
//!
//! Defines the error type that crosses the boundary between the market-update tools
//! and whatever orchestrates them.

pub mod error;

pub use error::{Error, Result};
