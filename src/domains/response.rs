use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reply decoded from the gateway, kept as the raw JSON document.
///
/// Only `success` and the `op`/`d` pair are ever interpreted, either nested
/// under `body` or at the top level. Everything else is carried untouched for
/// diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    raw: Value,
}

impl GatewayResponse {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// `true` only for a literal JSON `true`.
    pub fn success(&self) -> bool {
        self.raw.get("success").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// The `(op, d)` pair to republish, preferring the nested body.
    pub fn dispatch_body(&self) -> Option<(i64, Value)> {
        self.raw
            .get("body")
            .and_then(op_and_payload)
            .or_else(|| op_and_payload(&self.raw))
    }
}

fn op_and_payload(value: &Value) -> Option<(i64, Value)> {
    let op = value.get("op").and_then(integral)?;
    let d = value.get("d").filter(|d| !d.is_null())?.clone();
    Some((op, d))
}

/// Integer value of a JSON number, accepting integral floats such as `7.0`.
pub(crate) fn integral(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Message placed on the outbound queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    pub success: bool,
    pub body: OutboundBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundBody {
    pub op: i64,
    pub d: Value,
}

impl OutboundEnvelope {
    pub fn success(op: i64, d: Value) -> Self {
        Self {
            success: true,
            body: OutboundBody { op, d },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_and_nested_shapes() {
        let flat = GatewayResponse::new(json!({"success": true, "op": 7, "d": {"y": 2}}));
        assert!(flat.success());
        assert_eq!(flat.dispatch_body(), Some((7, json!({"y": 2}))));

        let nested = GatewayResponse::new(json!({
            "success": true,
            "op": 1,
            "d": "top",
            "body": {"op": 0, "d": {"z": 3}}
        }));
        assert_eq!(nested.dispatch_body(), Some((0, json!({"z": 3}))));
    }

    #[test]
    fn incomplete_or_odd_nested_body_falls_back_to_top_level() {
        let resp = GatewayResponse::new(json!({"success": true, "op": 4, "d": [1], "body": {"op": 9}}));
        assert_eq!(resp.dispatch_body(), Some((4, json!([1]))));

        let resp = GatewayResponse::new(json!({"success": true, "op": 4.0, "d": 1, "body": "text"}));
        assert_eq!(resp.dispatch_body(), Some((4, json!(1))));
    }

    #[test]
    fn missing_or_null_payload_is_unrecognised() {
        assert_eq!(GatewayResponse::new(json!({"success": true})).dispatch_body(), None);
        assert_eq!(
            GatewayResponse::new(json!({"success": true, "op": 1, "d": null})).dispatch_body(),
            None
        );
        assert_eq!(
            GatewayResponse::new(json!({"success": true, "op": "1", "d": 2})).dispatch_body(),
            None
        );
    }

    #[test]
    fn success_requires_boolean_true() {
        assert!(!GatewayResponse::new(json!({"success": "yes"})).success());
        assert!(!GatewayResponse::new(json!([true])).success());
        assert!(!GatewayResponse::new(json!({"success": false, "body": "user not found"})).success());
    }

    #[test]
    fn integral_accepts_whole_floats_only() {
        assert_eq!(integral(&json!(0.0)), Some(0));
        assert_eq!(integral(&json!(-3)), Some(-3));
        assert_eq!(integral(&json!(0.5)), None);
        assert_eq!(integral(&json!("0")), None);
    }

    #[test]
    fn outbound_wire_shape() {
        let out = OutboundEnvelope::success(7, json!({"y": 2}));
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({"success": true, "body": {"op": 7, "d": {"y": 2}}})
        );
    }
}
