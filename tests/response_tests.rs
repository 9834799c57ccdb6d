use serde_json::Value;
use speechcast::api::helpers::{err_response, ok_spoken, preflight};
use speechcast::core::models::ReplyPackage;

fn body_of(response: &Value) -> Value {
    let raw = response.get("body").and_then(Value::as_str).unwrap();
    serde_json::from_str(raw).unwrap()
}

#[test]
fn test_success_payload() {
    let reply = ReplyPackage {
        audio_url: "http://b.s3-website-ap-northeast-1.amazonaws.com/speech_1.mp3".to_string(),
        text: "こんにちは！".to_string(),
    };
    let response = ok_spoken(&reply);

    assert_eq!(response["statusCode"], 200);
    assert_eq!(response["headers"]["Content-Type"], "application/json");
    assert_eq!(response["headers"]["Access-Control-Allow-Origin"], "*");

    let body = body_of(&response);
    assert_eq!(body["message"], "Success");
    assert_eq!(body["url"], reply.audio_url.as_str());
    assert_eq!(body["text"], "こんにちは！");
}

#[test]
fn test_error_payload() {
    let response = err_response(500, "Failed to access OpenAI API: boom");

    assert_eq!(response["statusCode"], 500);
    assert_eq!(response["headers"]["Content-Type"], "application/json");
    assert_eq!(response["headers"]["Access-Control-Allow-Origin"], "*");

    let body = body_of(&response);
    assert_eq!(body["error"], "Failed to access OpenAI API: boom");
    assert!(body.get("url").is_none(), "errors carry no partial results");
}

#[test]
fn test_preflight_payload() {
    let response = preflight();

    assert_eq!(response["statusCode"], 204);
    assert_eq!(response["headers"]["Access-Control-Allow-Origin"], "*");
    assert!(
        response["headers"]["Access-Control-Allow-Methods"]
            .as_str()
            .unwrap()
            .contains("POST")
    );
}
