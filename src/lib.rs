//! Speechcast - turns a short text prompt into a spoken notification for a
//! listening device.
//!
//! A single AWS Lambda receives `{"text": "..."}`, asks ChatGPT for a very
//! short reply, synthesizes it to MP3, stores the file in S3 and publishes the
//! public URL over MQTT so the device can fetch and play it.
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda for serverless execution
//! - openai-api-rs and reqwest for chat completion and text-to-speech
//! - S3 static website hosting for the audio files
//! - rumqttc for the one-shot MQTT publish
//! - Tokio for async runtime
//!
//! # Example
//!
//! ```no_run
//! use speechcast::core::config::AppConfig;
//! use speechcast::core::models::SpeakRequest;
//! use speechcast::features::Speaker;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     speechcast::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let speaker = Speaker::from_config(&config).await?;
//!
//!     let reply = speaker
//!         .speak(&SpeakRequest { text: Some("おはよう".to_string()) })
//!         .await?;
//!     println!("{} -> {}", reply.text, reply.audio_url);
//!
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod features;
pub mod mqtt;
pub mod storage;
pub mod utils;

pub use errors::RelayError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. It should be called once at process start.
///
/// # Example
///
/// ```
/// speechcast::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    tracing_subscriber::registry().with(fmt_layer).init();
}
