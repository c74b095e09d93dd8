pub mod client;
pub mod config;
pub mod daemon;
pub mod domains;
pub mod error;
pub mod factories;
pub mod interfaces;
pub mod schedule;
pub mod scheduler;
pub mod services;

pub use crate::client::AuraRelay;
pub use crate::config::Config;
pub use crate::domains::envelope::{DeliveryContext, Envelope, InboundMessage};
pub use crate::domains::response::{GatewayResponse, OutboundEnvelope};
pub use crate::error::{AuraRelayError, Result};
pub use crate::services::dispatch::DispatchOutcome;
