use serde::{Deserialize, Serialize};

/// Body accepted from the caller. A missing or `null` text falls back to the
/// configured default.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SpeakRequest {
    #[serde(default)]
    pub text: Option<String>,
}

impl SpeakRequest {
    #[must_use]
    pub fn text_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.text.as_deref().unwrap_or(default)
    }
}

/// Result of a completed invocation, filled in step by step.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplyPackage {
    pub audio_url: String,
    pub text: String,
}

/// Payload published to the broker for the listening device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub url: String,
    pub text: String,
    pub magic: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Acknowledged,
    TimedOut,
}
