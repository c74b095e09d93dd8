use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuraRelayError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("error parsing message: {0}")]
    Parse(String),
    #[error("invalid message: {0}")]
    InvalidEnvelope(String),
    #[error("invalid message, missing fields: {}", .0.join(", "))]
    InvalidEnvelopeFields(Vec<String>),
    #[error("error fetching API{}: {message}", status_suffix(.status))]
    Forward { status: Option<u16>, message: String },
    #[error("API response error: {0}")]
    Upstream(Value),
    #[error("malformed API response: {0}")]
    MalformedUpstreamResponse(String),
    #[error("error sending heartbeat{}: {message}", status_suffix(.status))]
    Heartbeat { status: Option<u16>, message: String },
    #[error("publish error: {0}")]
    Publish(String),
}

impl AuraRelayError {
    /// Whether redelivering the same message could succeed.
    ///
    /// Malformed input never gets better on redelivery; everything that
    /// depends on the gateway or the outbound queue might.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            AuraRelayError::Parse(_)
                | AuraRelayError::InvalidEnvelope(_)
                | AuraRelayError::InvalidEnvelopeFields(_)
                | AuraRelayError::Config(_)
        )
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, AuraRelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_fields() {
        let err = AuraRelayError::Forward {
            status: Some(503),
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "error fetching API (status 503): Service Unavailable"
        );

        let err = AuraRelayError::Heartbeat {
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "error sending heartbeat: connection refused");

        let err = AuraRelayError::InvalidEnvelopeFields(vec!["d".to_string(), "s".to_string()]);
        assert!(format!("{err}").contains("d, s"));
    }

    #[test]
    fn shape_errors_are_not_retryable() {
        assert!(!AuraRelayError::Parse("x".to_string()).is_retryable());
        assert!(!AuraRelayError::InvalidEnvelope("x".to_string()).is_retryable());
        assert!(AuraRelayError::Upstream(Value::Null).is_retryable());
        assert!(AuraRelayError::Publish("x".to_string()).is_retryable());
    }
}
