//! AWS SNS notification backend.

use async_trait::async_trait;
use aws_sdk_sns::Client;
use tracing::info;

use crate::error::{AppError, Result};
use crate::notify::Notifier;

/// Notifier that publishes to an SNS topic.
pub struct SnsNotifier {
    client: Client,
    topic_arn: String,
}

impl SnsNotifier {
    /// Create a new SNS notifier for the given topic.
    pub fn new(client: Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }

    /// Create an SNS notifier from environment configuration.
    pub async fn from_env() -> Result<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        let topic_arn = std::env::var("SNS_TOPIC_ARN")
            .map_err(|_| AppError::config("SNS_TOPIC_ARN environment variable not set"))?;

        Ok(Self::new(client, topic_arn))
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<()> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|e| AppError::notify(e.into_service_error()))?;

        info!(
            "published '{subject}' to {} (message id {:?})",
            self.topic_arn,
            output.message_id()
        );
        Ok(())
    }
}
