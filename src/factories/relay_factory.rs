use std::sync::Arc;

use tracing::info;

use crate::client::AuraRelay;
use crate::config::Config;
use crate::error::Result;
use crate::interfaces::gateway::GatewayClient;
use crate::interfaces::queue::QueuePublisher;
use crate::schedule::CronSchedule;
use crate::services::dispatch::DispatchHandler;
use crate::services::endpoint::EndpointResolver;
use crate::services::forwarder::Forwarder;
use crate::services::gateway::HttpGatewayClient;
use crate::services::heartbeat::HeartbeatPinger;
use crate::services::queue::HttpQueuePublisher;
use crate::services::republisher::Republisher;

pub struct RelayFactory;

impl RelayFactory {
    /// Wires the relay against the real gateway over HTTP.
    pub fn create_from_config(
        config: &Config,
        publisher: Arc<dyn QueuePublisher>,
    ) -> Result<AuraRelay> {
        let gateway = Arc::new(HttpGatewayClient::new(config.timeout_seconds())?);
        Self::create_with_gateway(config, gateway, publisher)
    }

    pub fn create_with_gateway(
        config: &Config,
        gateway: Arc<dyn GatewayClient>,
        publisher: Arc<dyn QueuePublisher>,
    ) -> Result<AuraRelay> {
        let heartbeat_schedule = CronSchedule::parse(&config.heartbeat_schedule())?;
        let resolver =
            EndpointResolver::new(config.base_url()).with_heartbeat_path(config.heartbeat_path());

        let forwarder = Forwarder::new(gateway.clone(), config.payload_policy());
        let republisher = Republisher::new(publisher, config.outbound_queue());
        let pinger = Arc::new(HeartbeatPinger::new(gateway, resolver.heartbeat_url()));

        info!(
            base_url = resolver.base_url(),
            inbound = %config.inbound_queue(),
            outbound = %config.outbound_queue(),
            payload = ?forwarder.policy(),
            strict = config.strict(),
            "relay configured"
        );

        let handler = DispatchHandler::new(resolver, forwarder, republisher, config.strict());
        Ok(AuraRelay::new(handler, pinger, heartbeat_schedule))
    }

    /// Publisher for the configured queue ingress, if there is one.
    pub fn publisher_from_config(config: &Config) -> Option<Arc<dyn QueuePublisher>> {
        config.publish_url().map(|url| {
            Arc::new(HttpQueuePublisher::new(url, config.outbound_queue()))
                as Arc<dyn QueuePublisher>
        })
    }
}
