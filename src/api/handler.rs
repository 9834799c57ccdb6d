//! API Lambda handler.
//!
//! This module handles:
//! - CORS preflight
//! - Request body extraction (delegated to `parsing`)
//! - The speak flow (delegated to `features::speak`)
//! - Mapping any failure to the uniform 500 response

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{error, info};

use super::{helpers, parsing};
use crate::core::config::AppConfig;
use crate::errors::RelayError;
use crate::features::Speaker;

pub use self::function_handler as handler;

static SPEAKER: OnceCell<Speaker> = OnceCell::const_new();

/// Process-wide clients, built on first use and reused by warm invocations.
/// A failed build is retried on the next invocation.
async fn speaker() -> Result<&'static Speaker, RelayError> {
    SPEAKER
        .get_or_try_init(|| async {
            let config = AppConfig::from_env()?;
            Speaker::from_config(&config).await
        })
        .await
}

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never returns `Err`: every failure becomes a 500 response with a JSON body.
#[tracing::instrument(level = "info", skip(event), fields(request_id = %event.context.request_id))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    #[cfg(feature = "debug-logs")]
    info!("API Lambda received request: {:?}", event.payload);

    let response = match speaker().await {
        Ok(speaker) => handle_request(speaker, &event.payload).await,
        Err(e) => failure(&e),
    };
    Ok(response)
}

/// Runs one request against `speaker` and builds the proxy response.
pub async fn handle_request(speaker: &Speaker, payload: &Value) -> Value {
    if parsing::is_preflight(payload) {
        return helpers::preflight();
    }

    let request = match parsing::parse_speak_request(payload) {
        Ok(request) => request,
        Err(e) => return failure(&e),
    };

    match speaker.speak(&request).await {
        Ok(reply) => {
            info!(url = %reply.audio_url, "Request handled successfully");
            helpers::ok_spoken(&reply)
        }
        Err(e) => failure(&e),
    }
}

fn failure(e: &RelayError) -> Value {
    error!(kind = e.kind(), "Error: {}", e);
    helpers::err_response(500, &e.to_string())
}
