use serde::Serialize;
use tracing::{debug, error, info};

use crate::domains::envelope::{DeliveryContext, Envelope, InboundMessage};
use crate::domains::response::OutboundEnvelope;
use crate::error::{AuraRelayError, Result};
use crate::services::endpoint::EndpointResolver;
use crate::services::forwarder::Forwarder;
use crate::services::republisher::Republisher;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Opcode has no handler; nothing was sent or published.
    Ignored { op: i64 },
    Forwarded {
        endpoint: String,
        published: OutboundEnvelope,
    },
}

/// Queue-triggered handler: parse, dispatch on opcode, forward, republish.
///
/// Every failure is returned to the caller so the host can redeliver.
pub struct DispatchHandler {
    resolver: EndpointResolver,
    forwarder: Forwarder,
    republisher: Republisher,
    strict: bool,
}

impl DispatchHandler {
    pub fn new(
        resolver: EndpointResolver,
        forwarder: Forwarder,
        republisher: Republisher,
        strict: bool,
    ) -> Self {
        Self {
            resolver,
            forwarder,
            republisher,
            strict,
        }
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    pub async fn handle(
        &self,
        message: impl Into<InboundMessage>,
        ctx: &DeliveryContext,
    ) -> Result<DispatchOutcome> {
        let message = message.into();
        info!(
            delivery_count = ctx.delivery_count,
            message_id = ctx.message_id.as_deref().unwrap_or(""),
            "queue message received"
        );

        let envelope = message.parse(self.strict).inspect_err(|err| {
            error!(error = %err, "rejecting message");
        })?;
        self.dispatch(&envelope, ctx).await
    }

    pub async fn dispatch(
        &self,
        envelope: &Envelope,
        ctx: &DeliveryContext,
    ) -> Result<DispatchOutcome> {
        if !envelope.is_dispatch() {
            debug!(op = envelope.op, t = %envelope.t, "no handler for opcode, ignoring");
            return Ok(DispatchOutcome::Ignored { op: envelope.op });
        }
        if envelope.t.is_empty() {
            error!(op = envelope.op, "dispatch envelope without type");
            return Err(AuraRelayError::InvalidEnvelopeFields(vec!["t".to_string()]));
        }

        let endpoint = self.resolver.resolve(&envelope.t);
        let response = self.forwarder.forward(&endpoint, envelope, ctx).await?;
        let published = self.republisher.republish(&response).await?;
        Ok(DispatchOutcome::Forwarded {
            endpoint,
            published,
        })
    }
}
