//! Report messenger: posts report files to a channel

use super::chunk::{MessagePart, plan_parts};
use crate::config::MessengerConfig;
use crate::error::{MarketError, Result};
use crate::platforms::{Block, MessagingProvider, PostMessage, SlackClient};
use crate::report::ReportArtifact;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Notification sent before any report content
pub const INTRO_MESSAGE: &str = "🔔 *New Market Trends Report Available*\n";

/// Lead text used when a snippet has no comment
const DEFAULT_LEAD: &str = "Report content:";

/// Outcome of posting one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Accepted as sent
    Delivered,
    /// Rich form rejected, plain-text retry accepted
    DeliveredAsPlainText { rejected: String },
    /// Not delivered
    Failed { error: String },
}

impl SendOutcome {
    /// Whether the message reached the channel
    pub fn is_delivered(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Which message of a delivery failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStage {
    Intro,
    Announcement,
    Part { index: usize, total: usize },
}

impl fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intro => write!(f, "intro"),
            Self::Announcement => write!(f, "announcement"),
            Self::Part { index, total } => write!(f, "part {index}/{total}"),
        }
    }
}

/// A message that could not be delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub stage: DeliveryStage,
    pub error: String,
}

/// What happened while delivering one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySummary {
    pub channel: String,
    /// Number of content parts the report was split into
    pub parts_total: usize,
    /// Parts that only went through after the plain-text fallback
    pub fallback_parts: Vec<usize>,
    pub failures: Vec<DeliveryFailure>,
}

impl DeliverySummary {
    /// True only if every message was delivered
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, stage: DeliveryStage, outcome: SendOutcome) {
        match outcome {
            SendOutcome::Delivered => {}
            SendOutcome::DeliveredAsPlainText { .. } => {
                if let DeliveryStage::Part { index, .. } = stage {
                    self.fallback_parts.push(index);
                }
            }
            SendOutcome::Failed { error } => {
                self.failures.push(DeliveryFailure { stage, error });
            }
        }
    }
}

/// Delivers report files to a messaging channel in size-bounded parts
pub struct ReportMessenger {
    provider: Arc<dyn MessagingProvider>,
    max_part_length: usize,
    max_block_length: usize,
}

impl ReportMessenger {
    /// Create a messenger over any provider
    ///
    /// Limits of 0 are raised to 1.
    pub fn new(
        provider: Arc<dyn MessagingProvider>,
        max_part_length: usize,
        max_block_length: usize,
    ) -> Self {
        Self {
            provider,
            max_part_length: max_part_length.max(1),
            max_block_length: max_block_length.max(1),
        }
    }

    /// Create a Slack-backed messenger; fails without a token
    pub fn from_config(config: &MessengerConfig) -> Result<Self> {
        let provider: Arc<dyn MessagingProvider> = Arc::new(SlackClient::new(config)?);
        Ok(Self::new(
            provider,
            config.max_part_length,
            config.max_block_length,
        ))
    }

    /// Part length used for a delivery; `None` or `Some(0)` falls back to the configured one
    pub fn part_length(&self, max_part_length: Option<usize>) -> usize {
        max_part_length
            .filter(|&n| n > 0)
            .unwrap_or(self.max_part_length)
    }

    /// Post a plain-text message
    pub async fn send_message(&self, channel: &str, text: &str) -> SendOutcome {
        self.post(&PostMessage::plain(channel, text)).await.into()
    }

    /// Post content as a formatted snippet
    ///
    /// With a title or comment the content goes into blocks (comment, header, body), unless
    /// the formatted body exceeds the block limit, in which case it is sent as plain text.
    /// A rejected block message is retried once as plain text.
    pub async fn send_snippet(
        &self,
        channel: &str,
        content: &str,
        title: Option<&str>,
        comment: Option<&str>,
    ) -> SendOutcome {
        let formatted = format!("\n{content}\n");
        let lead = comment.unwrap_or(DEFAULT_LEAD);
        let plain_text = format!("{lead}\n\n{formatted}");

        let message = if title.is_none() && comment.is_none() {
            PostMessage::plain(channel, formatted.clone())
        } else if formatted.chars().count() <= self.max_block_length {
            let mut blocks = Vec::with_capacity(3);
            if let Some(comment) = comment {
                blocks.push(Block::markdown(comment));
            }
            if let Some(title) = title {
                blocks.push(Block::header(title));
            }
            blocks.push(Block::markdown(formatted.clone()));
            PostMessage::rich(channel, lead, blocks)
        } else {
            PostMessage::plain(channel, plain_text.clone())
        };

        match self.post(&message).await {
            PostResult::Rejected(rejected) if message.is_rich() => {
                warn!(channel, error = %rejected, "Block message rejected, retrying as plain text");
                match self.post(&PostMessage::plain(channel, plain_text)).await {
                    PostResult::Accepted => SendOutcome::DeliveredAsPlainText { rejected },
                    PostResult::Rejected(error) | PostResult::Unsent(error) => {
                        error!(channel, error = %error, "Plain-text fallback also failed");
                        SendOutcome::Failed { error }
                    }
                }
            }
            other => other.into(),
        }
    }

    /// Deliver a report file; true only if every message went through
    ///
    /// `max_part_length` overrides the configured limit; `None` or `Some(0)` uses it.
    pub async fn deliver(
        &self,
        channel: &str,
        file_path: impl AsRef<Path>,
        max_part_length: Option<usize>,
    ) -> bool {
        match self.deliver_report(channel, file_path, max_part_length).await {
            Ok(summary) => summary.is_success(),
            Err(e) => {
                error!(channel, "Report not sent: {e}");
                false
            }
        }
    }

    /// Deliver a report file and describe what happened
    ///
    /// Fails before any network call if the file is missing or unreadable.
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub async fn deliver_report(
        &self,
        channel: &str,
        file_path: impl AsRef<Path>,
        max_part_length: Option<usize>,
    ) -> Result<DeliverySummary> {
        let artifact = ReportArtifact::load(file_path, channel).await?;
        let part_length = self.part_length(max_part_length);

        let parts = plan_parts(&artifact.content, part_length, &artifact.file_name());
        let mut summary = DeliverySummary {
            channel: artifact.channel.clone(),
            parts_total: parts.len(),
            fallback_parts: Vec::new(),
            failures: Vec::new(),
        };

        info!(
            channel,
            chars = artifact.char_len(),
            parts = parts.len(),
            "Sending report"
        );

        let intro = self.send_message(channel, INTRO_MESSAGE).await;
        summary.record(DeliveryStage::Intro, intro);

        if parts.len() > 1 {
            let announcement = format!(
                "The report is split into {} parts due to length:",
                parts.len()
            );
            let outcome = self.send_message(channel, &announcement).await;
            summary.record(DeliveryStage::Announcement, outcome);
        }

        for part in &parts {
            let outcome = self.send_part(channel, part).await;
            let stage = DeliveryStage::Part {
                index: part.index,
                total: part.total,
            };
            if outcome.is_delivered() {
                info!(channel, "Sent {stage}");
            } else {
                warn!(channel, "Failed to send {stage}");
            }
            summary.record(stage, outcome);
        }

        if summary.is_success() {
            info!(channel, "Report delivered");
        } else {
            for failure in &summary.failures {
                error!(channel, stage = %failure.stage, error = %failure.error, "Delivery failure");
            }
        }

        Ok(summary)
    }

    async fn send_part(&self, channel: &str, part: &MessagePart) -> SendOutcome {
        self.send_snippet(
            channel,
            &part.body,
            Some(part.title.as_str()),
            Some(part.comment.as_str()),
        )
        .await
    }

    async fn post(&self, message: &PostMessage) -> PostResult {
        match self.provider.post_message(message).await {
            Ok(response) if response.ok => PostResult::Accepted,
            Ok(response) => {
                let error = response.error_message().to_string();
                warn!(
                    provider = self.provider.name(),
                    channel = %message.channel,
                    error = %error,
                    "Provider rejected message"
                );
                PostResult::Rejected(error)
            }
            Err(e) => {
                let error = match e {
                    MarketError::ProviderRejected { error, .. } => error,
                    other => other.to_string(),
                };
                warn!(
                    provider = self.provider.name(),
                    channel = %message.channel,
                    error = %error,
                    "Message not sent"
                );
                PostResult::Unsent(error)
            }
        }
    }
}

/// Result of a single provider round-trip
enum PostResult {
    Accepted,
    /// Provider answered not-ok
    Rejected(String),
    /// No usable answer (network failure, unreadable response)
    Unsent(String),
}

impl From<PostResult> for SendOutcome {
    fn from(result: PostResult) -> Self {
        match result {
            PostResult::Accepted => Self::Delivered,
            PostResult::Rejected(error) | PostResult::Unsent(error) => Self::Failed { error },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::{MockMessagingProvider, PostMessageResponse};
    use std::sync::Mutex;

    fn ok() -> PostMessageResponse {
        PostMessageResponse {
            ok: true,
            error: None,
        }
    }

    fn rejected(error: &str) -> PostMessageResponse {
        PostMessageResponse {
            ok: false,
            error: Some(error.to_string()),
        }
    }

    /// Mock that records every message and answers with `respond`
    fn recording_provider(
        respond: impl Fn(&PostMessage) -> PostMessageResponse + Send + Sync + 'static,
    ) -> (MockMessagingProvider, Arc<Mutex<Vec<PostMessage>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&sent);

        let mut provider = MockMessagingProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_post_message().returning(move |message| {
            log.lock().unwrap().push(message.clone());
            Ok(respond(message))
        });

        (provider, sent)
    }

    fn write_report(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NVS_report_20250227_080406.md");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn body_of(message: &PostMessage) -> Option<String> {
        message.blocks.as_ref().and_then(|blocks| match blocks.last() {
            Some(Block::Section {
                text: crate::platforms::TextObject::Mrkdwn { text },
            }) => Some(text.clone()),
            _ => None,
        })
    }

    #[tokio::test]
    async fn test_missing_file_makes_no_network_call() {
        let mut provider = MockMessagingProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_post_message().times(0);

        let messenger = ReportMessenger::new(Arc::new(provider), 3000, 3000);
        assert!(!messenger.deliver("#x", "/no/such/file", None).await);
    }

    #[tokio::test]
    async fn test_single_part_rich_send() {
        let (_dir, path) = write_report("# NVS\nShares up.");
        let (provider, sent) = recording_provider(|_| ok());
        let messenger = ReportMessenger::new(Arc::new(provider), 3000, 3000);

        assert!(messenger.deliver("#general", &path, None).await);

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], PostMessage::plain("#general", INTRO_MESSAGE));

        let report = &sent[1];
        assert_eq!(report.text, "Here's the detailed report:");
        let blocks = report.blocks.as_ref().unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], Block::markdown("Here's the detailed report:"));
        assert_eq!(blocks[1], Block::header("Report: NVS_report_20250227_080406.md"));
        assert_eq!(body_of(report).unwrap(), "\n# NVS\nShares up.\n");
    }

    #[tokio::test]
    async fn test_seven_thousand_chars_in_three_parts() {
        let content = "A".repeat(7000);
        let (_dir, path) = write_report(&content);
        let (provider, sent) = recording_provider(|_| ok());
        let messenger = ReportMessenger::new(Arc::new(provider), 3000, 5000);

        let summary = messenger.deliver_report("#x", &path, None).await.unwrap();
        assert!(summary.is_success());
        assert_eq!(summary.parts_total, 3);

        let sent = sent.lock().unwrap();
        // intro + announcement + 3 parts
        assert_eq!(sent.len(), 5);
        assert_eq!(sent[1].text, "The report is split into 3 parts due to length:");

        let bodies: Vec<String> = sent[2..]
            .iter()
            .map(|m| body_of(m).unwrap().trim_matches('\n').to_string())
            .collect();
        let lengths: Vec<_> = bodies.iter().map(|b| b.chars().count()).collect();
        assert_eq!(lengths, vec![3000, 3000, 1000]);
        assert_eq!(bodies.concat(), content);

        let last_blocks = sent[4].blocks.as_ref().unwrap();
        assert_eq!(last_blocks[1], Block::header("Report Part 3/3"));
    }

    #[tokio::test]
    async fn test_multibyte_parts_split_by_characters() {
        let content = format!("{}x", "é📈".repeat(1500));
        let (_dir, path) = write_report(&content);
        let (provider, sent) = recording_provider(|_| ok());
        let messenger = ReportMessenger::new(Arc::new(provider), 3000, 5000);

        let summary = messenger.deliver_report("#x", &path, None).await.unwrap();
        assert_eq!(summary.parts_total, 2);

        let sent = sent.lock().unwrap();
        let bodies: Vec<String> = sent[2..]
            .iter()
            .map(|m| body_of(m).unwrap().trim_matches('\n').to_string())
            .collect();
        let lengths: Vec<_> = bodies.iter().map(|b| b.chars().count()).collect();
        assert_eq!(lengths, vec![3000, 1]);
        assert_eq!(bodies.concat(), content);
    }

    #[tokio::test]
    async fn test_override_part_length() {
        let (_dir, path) = write_report("abcdef");
        let (provider, sent) = recording_provider(|_| ok());
        let messenger = ReportMessenger::new(Arc::new(provider), 3000, 3000);

        let summary = messenger.deliver_report("#x", &path, Some(4)).await.unwrap();
        assert_eq!(summary.parts_total, 2);
        assert_eq!(sent.lock().unwrap().len(), 4);

        let summary = messenger.deliver_report("#x", &path, Some(0)).await.unwrap();
        assert_eq!(summary.parts_total, 1);
    }

    #[test]
    fn test_part_length_override() {
        let messenger = ReportMessenger::new(Arc::new(MockMessagingProvider::new()), 3000, 3000);
        assert_eq!(messenger.part_length(None), 3000);
        assert_eq!(messenger.part_length(Some(0)), 3000);
        assert_eq!(messenger.part_length(Some(1500)), 1500);

        let clamped = ReportMessenger::new(Arc::new(MockMessagingProvider::new()), 0, 0);
        assert_eq!(clamped.part_length(None), 1);
    }

    #[tokio::test]
    async fn test_oversized_block_sent_as_plain_text() {
        let (_dir, path) = write_report(&"C".repeat(100));
        let (provider, sent) = recording_provider(|_| ok());
        // parts up to 200 chars, but blocks only up to 50
        let messenger = ReportMessenger::new(Arc::new(provider), 200, 50);

        assert!(messenger.deliver("#x", &path, None).await);

        let sent = sent.lock().unwrap();
        let report = &sent[1];
        assert!(report.blocks.is_none());
        assert_eq!(
            report.text,
            format!("Here's the detailed report:\n\n\n{}\n", "C".repeat(100))
        );
    }

    #[tokio::test]
    async fn test_rejected_blocks_retried_once_as_plain_text() {
        let (_dir, path) = write_report("short report");
        let (provider, sent) = recording_provider(|message| {
            if message.is_rich() {
                rejected("invalid_blocks")
            } else {
                ok()
            }
        });
        let messenger = ReportMessenger::new(Arc::new(provider), 3000, 3000);

        let summary = messenger.deliver_report("#x", &path, None).await.unwrap();
        assert!(summary.is_success());
        assert_eq!(summary.fallback_parts, vec![1]);

        let sent = sent.lock().unwrap();
        // intro, rejected rich send, plain retry
        assert_eq!(sent.len(), 3);
        assert!(sent[1].is_rich());
        assert!(!sent[2].is_rich());
        assert_eq!(
            sent[2].text,
            "Here's the detailed report:\n\n\nshort report\n"
        );
    }

    #[tokio::test]
    async fn test_failed_retry_marks_part_failed_and_continues() {
        let content = "D".repeat(25);
        let (_dir, path) = write_report(&content);
        // Reject everything about the second part (rich send and its retry)
        let (provider, sent) = recording_provider(|message| {
            let second_part = message
                .blocks
                .as_ref()
                .is_some_and(|b| b.contains(&Block::header("Report Part 2/3")))
                || (!message.is_rich() && message.text.contains(&"D".repeat(10)));
            if second_part {
                rejected("invalid_blocks")
            } else {
                ok()
            }
        });
        let messenger = ReportMessenger::new(Arc::new(provider), 10, 3000);

        let summary = messenger.deliver_report("#x", &path, None).await.unwrap();
        assert!(!summary.is_success());
        assert_eq!(
            summary.failures,
            vec![DeliveryFailure {
                stage: DeliveryStage::Part { index: 2, total: 3 },
                error: "invalid_blocks".to_string(),
            }]
        );

        // intro + announcement + part1 + part2 rich + part2 retry + part3
        assert_eq!(sent.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_intro_failure_fails_delivery() {
        let (_dir, path) = write_report("x");
        let (provider, _sent) = recording_provider(|message| {
            if message.text == INTRO_MESSAGE {
                rejected("not_in_channel")
            } else {
                ok()
            }
        });
        let messenger = ReportMessenger::new(Arc::new(provider), 3000, 3000);

        let summary = messenger.deliver_report("#x", &path, None).await.unwrap();
        assert_eq!(summary.failures[0].stage, DeliveryStage::Intro);
        assert!(!messenger.deliver("#x", &path, None).await);
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let mut provider = MockMessagingProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_post_message()
            .times(1)
            .returning(|_| Err(MarketError::Other("connection refused".to_string())));

        let messenger = ReportMessenger::new(Arc::new(provider), 3000, 3000);
        let outcome = messenger
            .send_snippet("#x", "body", Some("Title"), None)
            .await;
        assert_eq!(
            outcome,
            SendOutcome::Failed {
                error: "connection refused".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_snippet_without_title_or_comment_is_plain() {
        let (provider, sent) = recording_provider(|_| ok());
        let messenger = ReportMessenger::new(Arc::new(provider), 3000, 3000);

        let outcome = messenger.send_snippet("#x", "body", None, None).await;
        assert_eq!(outcome, SendOutcome::Delivered);
        assert_eq!(sent.lock().unwrap()[0], PostMessage::plain("#x", "\nbody\n"));
    }
}
