//! Post-run publishing
//!
//! After the report pipeline finishes, the file it wrote is pushed to the configured
//! channel. Nothing here fails the run: a missing file, a missing token or a delivery
//! failure is logged and reported as `false`.

use crate::config::MarketUpdateConfig;
use crate::delivery::ReportMessenger;
use crate::report::latest_report;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Publishes finished reports to the configured channel
pub struct ReportPublisher {
    config: MarketUpdateConfig,
    messenger: Option<Arc<ReportMessenger>>,
}

impl ReportPublisher {
    /// Publisher that builds its messenger from `config` on demand
    pub fn new(config: MarketUpdateConfig) -> Self {
        Self {
            config,
            messenger: None,
        }
    }

    /// Publisher using an existing messenger
    pub fn with_messenger(config: MarketUpdateConfig, messenger: Arc<ReportMessenger>) -> Self {
        Self {
            config,
            messenger: Some(messenger),
        }
    }

    /// Channel reports are sent to
    pub fn channel(&self) -> &str {
        &self.config.messenger.channel
    }

    /// Send the report the run produced, if there is one
    pub async fn publish(&self, output_file: Option<&Path>) -> bool {
        let Some(path) = output_file.filter(|p| p.exists()) else {
            info!("No output file found or file does not exist. Nothing sent.");
            return false;
        };

        info!("Found output file: {}", path.display());

        let messenger = match &self.messenger {
            Some(messenger) => Arc::clone(messenger),
            None => match ReportMessenger::from_config(&self.config.messenger) {
                Ok(messenger) => Arc::new(messenger),
                Err(e) => {
                    error!("Cannot publish report: {e}");
                    return false;
                }
            },
        };

        messenger.deliver(self.channel(), path, None).await
    }

    /// Send the newest report for `symbol` from the output directory
    pub async fn publish_latest(&self, symbol: &str) -> bool {
        match latest_report(&self.config.output_dir, symbol) {
            Ok(found) => self.publish(found.as_deref()).await,
            Err(e) => {
                error!(
                    "Cannot scan {} for reports: {e}",
                    self.config.output_dir.display()
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::{MockMessagingProvider, PostMessageResponse};

    fn counting_messenger(expected_posts: usize) -> Arc<ReportMessenger> {
        let mut provider = MockMessagingProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_post_message()
            .withf(|message| message.channel == "#markets")
            .times(expected_posts)
            .returning(|_| {
                Ok(PostMessageResponse {
                    ok: true,
                    error: None,
                })
            });
        Arc::new(ReportMessenger::new(Arc::new(provider), 3000, 3000))
    }

    fn config(output_dir: &Path) -> MarketUpdateConfig {
        MarketUpdateConfig::builder()
            .channel("#markets")
            .output_dir(output_dir)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_publish_without_file_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = ReportPublisher::with_messenger(config(dir.path()), counting_messenger(0));

        assert!(!publisher.publish(None).await);
        assert!(!publisher.publish(Some(&dir.path().join("missing.md"))).await);
    }

    #[tokio::test]
    async fn test_publish_without_token_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NVS_report_20250227_080406.md");
        std::fs::write(&path, "report").unwrap();

        let publisher = ReportPublisher::new(config(dir.path()));
        assert!(!publisher.publish(Some(&path)).await);
    }

    #[tokio::test]
    async fn test_publish_latest_delivers_newest_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("NVS_report_20250226_080000.md"), "old").unwrap();
        std::fs::write(dir.path().join("NVS_report_20250227_080406.md"), "new").unwrap();

        let publisher = ReportPublisher::with_messenger(config(dir.path()), counting_messenger(2));
        assert_eq!(publisher.channel(), "#markets");
        assert!(publisher.publish_latest("NVS").await);
    }
}
