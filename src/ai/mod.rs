//! All AI/LLM functionality

pub mod client;
pub mod prompt;

// Re-export main types for convenience
pub use client::{LlmClient, ReplyGenerator, SpeechSynthesizer};
