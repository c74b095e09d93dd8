use async_trait::async_trait;

use crate::domains::response::OutboundEnvelope;
use crate::error::Result;

#[async_trait]
pub trait QueuePublisher: Send + Sync {
    async fn publish(&self, message: &OutboundEnvelope) -> Result<()>;
}
