//! Response builders for the API Gateway proxy integration.
//!
//! Every response carries permissive CORS headers so a browser page can call
//! the function directly.

use serde_json::{Value, json};

use crate::core::models::ReplyPackage;

pub const ALLOW_ORIGIN: &str = "*";

fn json_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": ALLOW_ORIGIN
    })
}

/// Returns a 200 OK response carrying the reply text and audio URL.
#[must_use]
pub fn ok_spoken(reply: &ReplyPackage) -> Value {
    json!({
        "statusCode": 200,
        "headers": json_headers(),
        "body": json!({
            "message": "Success",
            "url": reply.audio_url,
            "text": reply.text
        })
        .to_string()
    })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": json_headers(),
        "body": json!({ "error": message }).to_string()
    })
}

/// Returns a 204 answer to a CORS preflight request.
#[must_use]
pub fn preflight() -> Value {
    json!({
        "statusCode": 204,
        "headers": {
            "Access-Control-Allow-Origin": ALLOW_ORIGIN,
            "Access-Control-Allow-Methods": "POST, OPTIONS",
            "Access-Control-Allow-Headers": "Content-Type"
        },
        "body": ""
    })
}
