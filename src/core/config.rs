use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::RelayError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SYSTEM_PROMPT: &str = "30文字以内で返答してください。";
pub const DEFAULT_TEXT: &str = "こんにちは";
pub const DEFAULT_TTS_MODEL: &str = "tts-1";
pub const DEFAULT_TTS_VOICE: &str = "alloy";
pub const DEFAULT_BUCKET_REGION: &str = "ap-northeast-1";
pub const DEFAULT_BUCKET_NAME: &str = "YOUR_BUCKET_NAME";
pub const DEFAULT_MQTT_SERVER: &str = "broker.emqx.io";
pub const DEFAULT_MQTT_PORT: u16 = 1883;
pub const DEFAULT_MQTT_TOPIC: &str = "YOUR_PATH";
pub const DEFAULT_CLIENT_ID_PREFIX: &str = "LambdaSender";
pub const DEFAULT_ACK_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_org_id: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub system_prompt: String,
    pub default_text: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub aws_region: String,
    pub bucket_name: String,
    pub mqtt: MqttConfig,
    pub secret_pass: Option<String>,
    pub scratch_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub server: String,
    pub port: u16,
    pub topic: String,
    pub qos: u8,
    pub keep_alive: Duration,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id_prefix: String,
    pub ack_timeout: Duration,
    pub require_ack: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values
    /// count as unset, except `SECRET_PASS` which is forwarded verbatim.
    /// The bucket region comes from `BUCKET_REGION`; Lambda reserves
    /// `AWS_REGION` for the function's own region.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let qos: u8 = parse_or(&get, "MQTT_QOS", 0)?;
        if qos > 2 {
            return Err(RelayError::ConfigError(format!(
                "MQTT_QOS must be 0, 1 or 2 (got {qos})"
            )));
        }

        let mqtt = MqttConfig {
            server: or("MQTT_SERVER", DEFAULT_MQTT_SERVER),
            port: parse_or(&get, "MQTT_PORT", DEFAULT_MQTT_PORT)?,
            topic: or("MQTT_TOPIC", DEFAULT_MQTT_TOPIC),
            qos,
            keep_alive: Duration::from_secs(parse_or(
                &get,
                "MQTT_KEEP_ALIVE_SECS",
                DEFAULT_KEEP_ALIVE_SECS,
            )?),
            username: get("MQTT_USERNAME"),
            password: get("MQTT_PASSWORD"),
            client_id_prefix: or("MQTT_CLIENT_ID_PREFIX", DEFAULT_CLIENT_ID_PREFIX),
            ack_timeout: Duration::from_secs(parse_or(
                &get,
                "MQTT_ACK_TIMEOUT_SECS",
                DEFAULT_ACK_TIMEOUT_SECS,
            )?),
            require_ack: parse_or(&get, "MQTT_REQUIRE_ACK", false)?,
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_org_id: get("OPENAI_ORG_ID"),
            openai_base_url: or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            openai_model: or("OPENAI_MODEL", DEFAULT_CHAT_MODEL),
            system_prompt: or("SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT),
            default_text: or("DEFAULT_TEXT", DEFAULT_TEXT),
            tts_model: or("TTS_MODEL", DEFAULT_TTS_MODEL),
            tts_voice: or("TTS_VOICE", DEFAULT_TTS_VOICE),
            aws_region: or("BUCKET_REGION", DEFAULT_BUCKET_REGION),
            bucket_name: or("BUCKET_NAME", DEFAULT_BUCKET_NAME),
            mqtt,
            secret_pass: lookup("SECRET_PASS"),
            scratch_dir: PathBuf::from(or("SCRATCH_DIR", "/tmp")),
        })
    }

    /// Returns the API key or a configuration error when it is missing.
    pub fn require_openai_api_key(&self) -> Result<&str, RelayError> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| RelayError::ConfigError("OPENAI_API_KEY is not set".to_string()))
    }
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T, RelayError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| RelayError::ConfigError(format!("{key}: {e}"))),
        None => Ok(default),
    }
}
