use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::config::PayloadPolicy;
use crate::domains::envelope::{DeliveryContext, Envelope};
use crate::domains::response::GatewayResponse;
use crate::error::{AuraRelayError, Result};
use crate::interfaces::gateway::GatewayClient;

/// Sends one envelope to the gateway. Never retries; redelivery is the
/// host's business.
pub struct Forwarder {
    client: Arc<dyn GatewayClient>,
    policy: PayloadPolicy,
}

impl Forwarder {
    pub fn new(client: Arc<dyn GatewayClient>, policy: PayloadPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> PayloadPolicy {
        self.policy
    }

    pub fn request_body(&self, envelope: &Envelope, ctx: &DeliveryContext) -> Value {
        match self.policy {
            PayloadPolicy::Envelope => json!({
                "attempts": ctx.delivery_count,
                "data": envelope.delivered(),
            }),
            PayloadPolicy::Payload => envelope.d.clone(),
        }
    }

    pub async fn forward(
        &self,
        url: &str,
        envelope: &Envelope,
        ctx: &DeliveryContext,
    ) -> Result<GatewayResponse> {
        let body = self.request_body(envelope, ctx);
        info!(endpoint = url, attempts = ctx.delivery_count, "forwarding to API");

        let reply = self.client.post_json(url, &body).await.map_err(|err| {
            error!(endpoint = url, error = %err, "error fetching API");
            AuraRelayError::Forward {
                status: None,
                message: err.to_string(),
            }
        })?;

        if !reply.is_success() {
            error!(endpoint = url, status = reply.status, body = %reply.body, "API returned error status");
            return Err(AuraRelayError::Forward {
                status: Some(reply.status),
                message: reply.reason,
            });
        }

        let raw: Value = serde_json::from_str(&reply.body).map_err(|e| {
            AuraRelayError::MalformedUpstreamResponse(format!("undecodable body: {e}"))
        })?;
        debug!(endpoint = url, response = %raw, "API response");
        Ok(GatewayResponse::new(raw))
    }
}
