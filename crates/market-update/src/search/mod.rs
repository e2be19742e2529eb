//! Search input normalization
//!
//! Callers describe a search in whatever shape is convenient: a bare string, a JSON string,
//! or an object whose `query` may itself be nested one level. Everything is reduced to a
//! canonical [`SearchRequest`] before it reaches a provider.

pub mod normalize;
pub mod request;

pub use normalize::{QueryValue, RawSearchInput, normalize};
pub use request::{OutputShape, Recency, SearchMode, SearchRequest};
