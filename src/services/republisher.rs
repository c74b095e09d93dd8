use std::sync::Arc;

use tracing::{error, info};

use crate::domains::response::{GatewayResponse, OutboundEnvelope};
use crate::error::{AuraRelayError, Result};
use crate::interfaces::queue::QueuePublisher;

pub struct Republisher {
    publisher: Arc<dyn QueuePublisher>,
    queue: String,
}

impl Republisher {
    pub fn new(publisher: Arc<dyn QueuePublisher>, queue: impl Into<String>) -> Self {
        Self {
            publisher,
            queue: queue.into(),
        }
    }

    /// Turns a gateway reply into an outbound message without publishing it.
    pub fn outbound_for(response: &GatewayResponse) -> Result<OutboundEnvelope> {
        if !response.success() {
            return Err(AuraRelayError::Upstream(response.raw().clone()));
        }
        let (op, d) = response.dispatch_body().ok_or_else(|| {
            AuraRelayError::MalformedUpstreamResponse(
                "success reported without op and d".to_string(),
            )
        })?;
        Ok(OutboundEnvelope::success(op, d))
    }

    pub async fn republish(&self, response: &GatewayResponse) -> Result<OutboundEnvelope> {
        let outbound = Self::outbound_for(response).inspect_err(|err| {
            error!(queue = %self.queue, error = %err, "API response not republished");
        })?;
        self.publisher.publish(&outbound).await?;
        info!(queue = %self.queue, op = outbound.body.op, "republished API response");
        Ok(outbound)
    }
}
