use openai_api_rs::v1::error::APIError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to parse request: {0}")]
    ParseError(String),

    #[error("Failed to access OpenAI API: {0}")]
    OpenAIError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("Failed to publish MQTT message: {0}")]
    MqttError(String),

    #[error("Failed to access scratch file: {0}")]
    IoError(String),
}

impl RelayError {
    /// Short tag used as the `kind` field in structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            RelayError::ConfigError(_) => "config",
            RelayError::ParseError(_) => "parse",
            RelayError::OpenAIError(_) => "openai",
            RelayError::HttpError(_) => "http",
            RelayError::AwsError(_) => "aws",
            RelayError::MqttError(_) => "mqtt",
            RelayError::IoError(_) => "io",
        }
    }
}

impl From<APIError> for RelayError {
    fn from(error: APIError) -> Self {
        RelayError::OpenAIError(format!("OpenAI API error: {}", error))
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(error: reqwest::Error) -> Self {
        RelayError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(error: serde_json::Error) -> Self {
        RelayError::ParseError(error.to_string())
    }
}

impl From<base64::DecodeError> for RelayError {
    fn from(error: base64::DecodeError) -> Self {
        RelayError::ParseError(format!("invalid base64 body: {error}"))
    }
}

impl From<std::io::Error> for RelayError {
    fn from(error: std::io::Error) -> Self {
        RelayError::IoError(error.to_string())
    }
}

impl From<rumqttc::ClientError> for RelayError {
    fn from(error: rumqttc::ClientError) -> Self {
        RelayError::MqttError(error.to_string())
    }
}
