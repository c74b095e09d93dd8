pub mod dispatch;
pub mod endpoint;
pub mod forwarder;
pub mod gateway;
pub mod heartbeat;
pub mod queue;
pub mod republisher;
