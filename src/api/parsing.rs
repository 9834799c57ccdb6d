use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::core::models::SpeakRequest;
use crate::errors::RelayError;

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// HTTP method of a proxy event, from either the HTTP API (v2) or REST (v1)
/// payload shape.
pub fn request_method(payload: &Value) -> Option<&str> {
    v_str(payload, &["requestContext", "http", "method"]).or_else(|| v_str(payload, &["httpMethod"]))
}

pub fn is_preflight(payload: &Value) -> bool {
    request_method(payload).is_some_and(|m| m.eq_ignore_ascii_case("OPTIONS"))
}

/// Extracts the speak request from a proxy event.
///
/// A missing body means "use the default text". A string body is JSON (base64
/// encoded first when `isBase64Encoded` is set); a body that is already an
/// object is taken as-is. Anything else is a parse error.
pub fn parse_speak_request(payload: &Value) -> Result<SpeakRequest, RelayError> {
    let Some(body) = payload.get("body") else {
        return Ok(SpeakRequest::default());
    };

    match body {
        Value::String(raw) => {
            let decoded;
            let json_text = if payload
                .get("isBase64Encoded")
                .and_then(Value::as_bool)
                .unwrap_or(false)
            {
                let bytes = STANDARD.decode(raw)?;
                decoded = String::from_utf8(bytes).map_err(|e| {
                    RelayError::ParseError(format!("body is not valid UTF-8: {e}"))
                })?;
                decoded.as_str()
            } else {
                raw.as_str()
            };
            let value: Value = serde_json::from_str(json_text)?;
            request_from_value(value)
        }
        Value::Object(_) => request_from_value(body.clone()),
        Value::Null => Err(RelayError::ParseError("body is null".to_string())),
        _ => Err(RelayError::ParseError(
            "body must be a JSON string or object".to_string(),
        )),
    }
}

fn request_from_value(value: Value) -> Result<SpeakRequest, RelayError> {
    if !value.is_object() {
        return Err(RelayError::ParseError(
            "request body must be a JSON object".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}
