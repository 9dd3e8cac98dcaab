//! Response envelope classification.
//!
//! Backends answer with one of several wrapper shapes:
//!
//! - `{ code, message | msg, data }`
//! - `{ success, message, data }`
//! - a bare page `{ records, total }`
//! - anything else (plain arrays, strings, foreign objects)
//!
//! [`classify`] decides which one applies and reduces the body to a payload, a
//! failure, or an untouched pass-through.

use serde_json::{Map, Value};

/// Codes that mean "OK" across the heterogeneous backends.
pub const OK_CODES: [i64; 2] = [0, 200];

/// Session is missing or expired.
pub const UNAUTHENTICATED: i64 = 401;

/// Session is valid but lacks rights.
pub const FORBIDDEN: i64 = 403;

pub const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

const CODE: &str = "code";
const SUCCESS: &str = "success";
const DATA: &str = "data";
const MESSAGE: &str = "message";
const MSG: &str = "msg";
const RECORDS: &str = "records";
const TOTAL: &str = "total";

/// Outcome of classifying a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Recognized envelope reporting success; holds the unwrapped payload.
    Success(Value),
    /// Recognized envelope reporting failure.
    Failure { code: Option<i64>, message: String },
    /// No envelope recognized; the body is returned as-is.
    PassThrough(Value),
}

impl Classified {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Classify a decoded response body.
///
/// Pure: no side effects, no logging.
pub fn classify(body: Value) -> Classified {
    let Value::Object(map) = body else {
        return Classified::PassThrough(body);
    };

    if let Some(code) = map.get(CODE) {
        let code = parse_code(code);
        return if code.is_some_and(|c| OK_CODES.contains(&c)) {
            Classified::Success(unwrap_payload(map))
        } else {
            Classified::Failure {
                code,
                message: failure_message(&map),
            }
        };
    }

    if let Some(flag) = map.get(SUCCESS) {
        return if truthy(flag) {
            Classified::Success(unwrap_payload(map))
        } else {
            Classified::Failure {
                code: None,
                message: failure_message(&map),
            }
        };
    }

    // Bare pages (`records` + `total`) fall through here untouched as well.
    Classified::PassThrough(Value::Object(map))
}

/// Returns true when `body` is a bare page without envelope fields.
pub fn is_bare_page(body: &Value) -> bool {
    body.as_object().is_some_and(|map| {
        map.contains_key(RECORDS)
            && map.contains_key(TOTAL)
            && !map.contains_key(CODE)
            && !map.contains_key(SUCCESS)
    })
}

/// Numeric code from a JSON number or a numeric string.
pub fn parse_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `data` when the key is present (even as `null`), otherwise the whole envelope.
fn unwrap_payload(mut map: Map<String, Value>) -> Value {
    match map.remove(DATA) {
        Some(data) => data,
        None => Value::Object(map),
    }
}

fn failure_message(map: &Map<String, Value>) -> String {
    first_message(map)
        .unwrap_or(DEFAULT_FAILURE_MESSAGE)
        .to_string()
}

fn first_message(map: &Map<String, Value>) -> Option<&str> {
    [MESSAGE, MSG]
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

/// Non-empty `message`, else `msg`, of an object body.
pub fn body_message(body: &Value) -> Option<&str> {
    body.as_object().and_then(first_message)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_codes_unwrap_data() {
        for code in [json!(0), json!(200), json!("200")] {
            let body = json!({ "code": code, "message": "ok", "data": { "balance": 12.5 } });
            assert_eq!(classify(body), Classified::Success(json!({ "balance": 12.5 })));
        }
    }

    #[test]
    fn null_data_is_returned_as_null() {
        let body = json!({ "code": 0, "data": null });
        assert_eq!(classify(body), Classified::Success(Value::Null));
    }

    #[test]
    fn missing_data_falls_back_to_envelope() {
        let body = json!({ "code": 200, "message": "saved" });
        assert_eq!(
            classify(body),
            Classified::Success(json!({ "code": 200, "message": "saved" }))
        );
    }

    #[test]
    fn failure_code_carries_message_and_code() {
        let body = json!({ "code": 4001, "message": "card already reported lost", "data": null });
        assert_eq!(
            classify(body),
            Classified::Failure {
                code: Some(4001),
                message: "card already reported lost".into()
            }
        );
    }

    #[test]
    fn failure_uses_msg_then_default() {
        let with_msg = json!({ "code": 500, "msg": "internal" });
        assert_eq!(
            classify(with_msg),
            Classified::Failure {
                code: Some(500),
                message: "internal".into()
            }
        );

        let bare = json!({ "code": 500 });
        assert_eq!(
            classify(bare),
            Classified::Failure {
                code: Some(500),
                message: DEFAULT_FAILURE_MESSAGE.into()
            }
        );
    }

    #[test]
    fn unparsable_code_is_a_failure_without_code() {
        let body = json!({ "code": "E_FROZEN", "message": "frozen" });
        assert_eq!(
            classify(body),
            Classified::Failure {
                code: None,
                message: "frozen".into()
            }
        );
    }

    #[test]
    fn success_flag_variant() {
        let ok = json!({ "success": true, "data": [1, 2, 3] });
        assert_eq!(classify(ok), Classified::Success(json!([1, 2, 3])));

        let failed = json!({ "success": false, "message": "code mismatch" });
        assert_eq!(
            classify(failed),
            Classified::Failure {
                code: None,
                message: "code mismatch".into()
            }
        );
    }

    #[test]
    fn bare_page_passes_through_unchanged() {
        let page = json!({ "records": [{ "id": 1 }, { "id": 2 }], "total": 42 });
        assert!(is_bare_page(&page));
        assert_eq!(classify(page.clone()), Classified::PassThrough(page));
    }

    #[test]
    fn unrecognized_bodies_pass_through() {
        for body in [json!([1, 2]), json!("plain"), json!(7), Value::Null, json!({ "foo": 1 })] {
            assert_eq!(classify(body.clone()), Classified::PassThrough(body));
        }
    }

    #[test]
    fn body_message_prefers_message_then_msg() {
        assert_eq!(body_message(&json!({ "message": "a", "msg": "b" })), Some("a"));
        assert_eq!(body_message(&json!({ "message": "", "msg": "b" })), Some("b"));
        assert_eq!(body_message(&json!({ "error": "x" })), None);
        assert_eq!(body_message(&json!("plain")), None);
    }

    #[test]
    fn parse_code_accepts_integral_floats() {
        assert_eq!(parse_code(&json!(200.0)), Some(200));
        assert_eq!(parse_code(&json!(200.5)), None);
        assert_eq!(parse_code(&json!(" 401 ")), Some(401));
        assert_eq!(parse_code(&json!(true)), None);
    }
}
