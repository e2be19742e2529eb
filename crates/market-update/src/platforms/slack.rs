//! Slack Web API client
//!
//! Only `chat.postMessage` is used. See: https://api.slack.com/methods/chat.postMessage

use crate::config::MessengerConfig;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Text element inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}

/// Block Kit layout block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: TextObject },
    Section { text: TextObject },
}

impl Block {
    /// Header block with plain text
    pub fn header(text: impl Into<String>) -> Self {
        Self::Header {
            text: TextObject::PlainText {
                text: text.into(),
                emoji: true,
            },
        }
    }

    /// Section block with markdown text
    pub fn markdown(text: impl Into<String>) -> Self {
        Self::Section {
            text: TextObject::Mrkdwn { text: text.into() },
        }
    }
}

/// Body of a `chat.postMessage` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostMessage {
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
}

impl PostMessage {
    /// Message with only a text field
    pub fn plain(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            blocks: None,
        }
    }

    /// Message with fallback text and blocks
    pub fn rich(channel: impl Into<String>, text: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            blocks: Some(blocks),
        }
    }

    /// Whether the message carries blocks
    pub fn is_rich(&self) -> bool {
        self.blocks.is_some()
    }
}

/// Response from `chat.postMessage`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostMessageResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl PostMessageResponse {
    /// Provider error string, or a generic one
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("Unknown error")
    }
}

/// A messaging provider able to post one message
///
/// `Err` means the request never produced a usable answer (network, unreadable body);
/// a provider that answered "not ok" returns `Ok` with `ok == false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Post a message and return the provider's answer
    async fn post_message(&self, message: &PostMessage) -> Result<PostMessageResponse>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Slack bot client
pub struct SlackClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl SlackClient {
    /// Create a client; fails if no token is configured
    pub fn new(config: &MessengerConfig) -> Result<Self> {
        let token = config.require_token()?.to_string();

        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat.postMessage", config.api_base.trim_end_matches('/')),
            token,
        })
    }
}

#[async_trait]
impl MessagingProvider for SlackClient {
    #[instrument(skip(self, message), fields(channel = %message.channel, rich = message.is_rich()))]
    async fn post_message(&self, message: &PostMessage) -> Result<PostMessageResponse> {
        debug!("Posting message to Slack");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<PostMessageResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) if status.is_success() => Err(MarketError::ProviderRejected {
                provider: self.name().to_string(),
                error: format!("unreadable response: {e}"),
            }),
            Err(_) => Err(MarketError::ProviderRejected {
                provider: self.name().to_string(),
                error: format!("HTTP {status}: {body}"),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn config(api_base: String, token: Option<&str>) -> MessengerConfig {
        MessengerConfig {
            token: token.map(str::to_string),
            api_base,
            ..MessengerConfig::default()
        }
    }

    #[test]
    fn test_missing_token_fails_construction() {
        let result = SlackClient::new(&config("https://slack.com/api/".into(), None));
        assert!(matches!(result, Err(MarketError::ConfigError(_))));
    }

    #[test]
    fn test_block_serialization() {
        let message = PostMessage::rich(
            "#general",
            "Here's the detailed report:",
            vec![Block::header("Report: a.md"), Block::markdown("body")],
        );

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "channel": "#general",
                "text": "Here's the detailed report:",
                "blocks": [
                    { "type": "header", "text": { "type": "plain_text", "text": "Report: a.md", "emoji": true } },
                    { "type": "section", "text": { "type": "mrkdwn", "text": "body" } }
                ]
            })
        );

        let plain = serde_json::to_value(PostMessage::plain("#general", "hi")).unwrap();
        assert!(plain.get("blocks").is_none());
    }

    #[tokio::test]
    async fn test_post_message_sends_bearer_and_parses_ok() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/chat.postMessage")
                    .header("authorization", "Bearer xoxb-test")
                    .json_body(json!({ "channel": "#general", "text": "hello" }));
                then.status(200).json_body(json!({ "ok": true }));
            })
            .await;

        let client = SlackClient::new(&config(server.url("/api/"), Some("xoxb-test"))).unwrap();
        let response = client
            .post_message(&PostMessage::plain("#general", "hello"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.ok);
    }

    #[tokio::test]
    async fn test_post_message_surfaces_provider_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat.postMessage");
                then.status(200)
                    .json_body(json!({ "ok": false, "error": "channel_not_found" }));
            })
            .await;

        let client = SlackClient::new(&config(server.url("/api"), Some("xoxb-test"))).unwrap();
        let response = client
            .post_message(&PostMessage::plain("#missing", "hello"))
            .await
            .unwrap();

        assert!(!response.ok);
        assert_eq!(response.error_message(), "channel_not_found");
    }

    #[tokio::test]
    async fn test_post_message_non_json_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat.postMessage");
                then.status(502).body("bad gateway");
            })
            .await;

        let client = SlackClient::new(&config(server.url("/api/"), Some("xoxb-test"))).unwrap();
        let result = client
            .post_message(&PostMessage::plain("#general", "hello"))
            .await;

        match result {
            Err(MarketError::ProviderRejected { provider, error }) => {
                assert_eq!(provider, "slack");
                assert!(error.contains("502"));
            }
            other => panic!("Expected ProviderRejected, got {other:?}"),
        }
    }
}
