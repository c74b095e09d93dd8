use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domains::response::OutboundEnvelope;
use crate::error::{AuraRelayError, Result};
use crate::interfaces::queue::QueuePublisher;

/// Publishes by POSTing the outbound envelope to a queue ingress endpoint.
pub struct HttpQueuePublisher {
    client: reqwest::Client,
    url: String,
    queue: String,
}

impl HttpQueuePublisher {
    pub fn new(url: impl Into<String>, queue: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            queue: queue.into(),
        }
    }
}

#[async_trait]
impl QueuePublisher for HttpQueuePublisher {
    async fn publish(&self, message: &OutboundEnvelope) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| AuraRelayError::Publish(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuraRelayError::Publish(format!(
                "queue '{}' ingress returned {status}",
                self.queue
            )));
        }
        debug!(queue = %self.queue, "outbound message accepted");
        Ok(())
    }
}

/// In-process publisher backed by an unbounded channel.
#[derive(Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<OutboundEnvelope>,
}

impl ChannelPublisher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundEnvelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl QueuePublisher for ChannelPublisher {
    async fn publish(&self, message: &OutboundEnvelope) -> Result<()> {
        self.tx
            .send(message.clone())
            .map_err(|_| AuraRelayError::Publish("outbound channel closed".to_string()))
    }
}
