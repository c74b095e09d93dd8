use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domains::response::integral;
use crate::error::{AuraRelayError, Result};

/// Opcode asking the relay to forward the envelope to the gateway.
pub const OP_DISPATCH: i64 = 0;

const REQUIRED_FIELDS: [&str; 4] = ["op", "d", "t", "s"];

/// Message unit travelling over the gateway queues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub op: i64,
    pub d: Value,
    pub t: String,
    pub s: i64,
    /// Object exactly as delivered, including keys the relay does not read.
    #[serde(skip)]
    delivered: Map<String, Value>,
}

impl Envelope {
    pub fn new(op: i64, d: Value, t: impl Into<String>, s: i64) -> Self {
        Self {
            op,
            d,
            t: t.into(),
            s,
            delivered: Map::new(),
        }
    }

    pub fn is_dispatch(&self) -> bool {
        self.op == OP_DISPATCH
    }

    /// The delivered object, untouched. Envelopes built in code fall back to
    /// their typed fields.
    pub fn delivered(&self) -> Value {
        if self.delivered.is_empty() {
            serde_json::json!({"op": self.op, "d": self.d, "t": self.t, "s": self.s})
        } else {
            Value::Object(self.delivered.clone())
        }
    }
}

/// Raw delivery as handed over by the queue trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Text(String),
    Structured(Value),
}

impl From<String> for InboundMessage {
    fn from(value: String) -> Self {
        InboundMessage::Text(value)
    }
}

impl From<&str> for InboundMessage {
    fn from(value: &str) -> Self {
        InboundMessage::Text(value.to_string())
    }
}

impl From<Value> for InboundMessage {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => InboundMessage::Text(text),
            other => InboundMessage::Structured(other),
        }
    }
}

impl InboundMessage {
    /// Resolves the delivery into an [`Envelope`].
    ///
    /// With `strict` set, all of `op`, `d`, `t` and `s` must be present and
    /// non-null. Zero is a valid value for `op` and `s`.
    pub fn parse(self, strict: bool) -> Result<Envelope> {
        let candidate = match self {
            InboundMessage::Text(text) => serde_json::from_str::<Value>(&text)
                .map_err(|e| AuraRelayError::Parse(e.to_string()))?,
            InboundMessage::Structured(value) => value,
        };

        let Value::Object(fields) = candidate else {
            return Err(AuraRelayError::InvalidEnvelope(format!(
                "expected an object, got {}",
                kind_of(&candidate)
            )));
        };

        if strict {
            let missing = missing_fields(&fields);
            if !missing.is_empty() {
                return Err(AuraRelayError::InvalidEnvelopeFields(missing));
            }
        }

        envelope_from_fields(fields)
    }
}

fn missing_fields(fields: &Map<String, Value>) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|name| fields.get(**name).map_or(true, Value::is_null))
        .map(|name| name.to_string())
        .collect()
}

fn envelope_from_fields(fields: Map<String, Value>) -> Result<Envelope> {
    let op = match fields.get("op") {
        Some(value) => integral(value).ok_or_else(|| {
            AuraRelayError::InvalidEnvelope(format!("op must be an integer, got {}", kind_of(value)))
        })?,
        None => return Err(AuraRelayError::InvalidEnvelopeFields(vec!["op".to_string()])),
    };
    let t = match fields.get("t") {
        Some(Value::String(t)) => t.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => {
            return Err(AuraRelayError::InvalidEnvelope(format!(
                "t must be a string, got {}",
                kind_of(other)
            )))
        }
    };
    let s = match fields.get("s") {
        Some(Value::Null) | None => 0,
        Some(value) => integral(value).ok_or_else(|| {
            AuraRelayError::InvalidEnvelope(format!("s must be an integer, got {}", kind_of(value)))
        })?,
    };
    let d = fields.get("d").cloned().unwrap_or(Value::Null);

    Ok(Envelope {
        op,
        d,
        t,
        s,
        delivered: fields,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Delivery metadata supplied by the host alongside the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryContext {
    pub delivery_count: u32,
    pub message_id: Option<String>,
}

impl Default for DeliveryContext {
    fn default() -> Self {
        Self {
            delivery_count: 1,
            message_id: None,
        }
    }
}

impl DeliveryContext {
    pub fn with_delivery_count(delivery_count: u32) -> Self {
        Self {
            delivery_count,
            message_id: None,
        }
    }
}
