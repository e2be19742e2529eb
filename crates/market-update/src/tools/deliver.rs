//! Tool for delivering a finished report file to a channel

use async_trait::async_trait;
use market_core::{Error as CoreError, Result as CoreResult};
use market_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::delivery::ReportMessenger;

/// Delivers report files through a [`ReportMessenger`]
pub struct ReportDeliveryTool {
    messenger: Arc<ReportMessenger>,
    default_channel: String,
}

#[derive(Debug, Deserialize)]
struct DeliverParams {
    file_path: String,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    max_part_length: Option<usize>,
}

impl ReportDeliveryTool {
    /// Create the tool; reports go to `default_channel` unless the call names one
    pub fn new(messenger: Arc<ReportMessenger>, default_channel: impl Into<String>) -> Self {
        Self {
            messenger,
            default_channel: default_channel.into(),
        }
    }
}

#[async_trait]
impl Tool for ReportDeliveryTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let params: DeliverParams = serde_json::from_value(params)
            .map_err(|e| CoreError::InvalidInput(format!("Invalid parameters: {e}")))?;

        let channel = params
            .channel
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.default_channel.clone());

        let delivered = self
            .messenger
            .deliver(&channel, &params.file_path, params.max_part_length)
            .await;

        Ok(json!({
            "delivered": delivered,
            "channel": channel,
            "file_path": params.file_path,
        }))
    }

    fn name(&self) -> &str {
        "deliver_report"
    }

    fn description(&self) -> &str {
        "Send a finished report file to the messaging channel, split into parts if it is long. \
         Returns whether every message was delivered."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the report file"
                },
                "channel": {
                    "type": "string",
                    "description": "Channel ID or #name; defaults to the configured channel"
                },
                "max_part_length": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Override for the maximum characters per message part"
                }
            },
            "required": ["file_path"]
        })
    }
}
