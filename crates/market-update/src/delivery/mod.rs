//! Chunked report delivery
//!
//! A report file is read once, announced, and posted either as one rich message or as a
//! numbered series of parts. Each rich message falls back to plain text once if the
//! provider rejects it.

pub mod chunk;
pub mod messenger;

pub use chunk::{MessagePart, plan_parts, split_content};
pub use messenger::{DeliveryFailure, DeliveryStage, DeliverySummary, ReportMessenger, SendOutcome};
