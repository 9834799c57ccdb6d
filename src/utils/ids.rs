//! Per-invocation identifiers: storage keys and MQTT client ids.
//!
//! Both start with the unix timestamp and add a random part so concurrent
//! invocations within the same second do not collide.

use chrono::{DateTime, Utc};
use rand::Rng;

pub const AUDIO_KEY_PREFIX: &str = "speech_";
pub const AUDIO_KEY_EXTENSION: &str = ".mp3";

const KEY_NONCE_RANGE: u32 = 1_000_000;
const CLIENT_ID_NONCE_MAX: u32 = 1000;

/// `speech_<unix seconds><6-digit nonce>.mp3`
#[must_use]
pub fn audio_object_key_at(now: DateTime<Utc>, nonce: u32) -> String {
    format!(
        "{AUDIO_KEY_PREFIX}{}{:06}{AUDIO_KEY_EXTENSION}",
        now.timestamp(),
        nonce % KEY_NONCE_RANGE
    )
}

#[must_use]
pub fn audio_object_key() -> String {
    let nonce = rand::thread_rng().gen_range(0..KEY_NONCE_RANGE);
    audio_object_key_at(Utc::now(), nonce)
}

/// `<prefix>-<unix seconds>-<0..=1000>`
#[must_use]
pub fn mqtt_client_id_at(prefix: &str, now: DateTime<Utc>, nonce: u32) -> String {
    format!("{prefix}-{}-{nonce}", now.timestamp())
}

#[must_use]
pub fn mqtt_client_id(prefix: &str) -> String {
    let nonce = rand::thread_rng().gen_range(0..=CLIENT_ID_NONCE_MAX);
    mqtt_client_id_at(prefix, Utc::now(), nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_audio_key_format() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(audio_object_key_at(now, 42), "speech_1700000000000042.mp3");
    }

    #[test]
    fn test_audio_key_is_digits_only() {
        let key = audio_object_key();
        let digits = key
            .strip_prefix(AUDIO_KEY_PREFIX)
            .and_then(|rest| rest.strip_suffix(AUDIO_KEY_EXTENSION))
            .unwrap();
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_same_second_keys_differ() {
        let keys: HashSet<String> = (0..50).map(|_| audio_object_key()).collect();
        // 50 draws from a million-wide nonce space
        assert!(keys.len() >= 49);
    }

    #[test]
    fn test_client_id_format() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(
            mqtt_client_id_at("LambdaSender", now, 1000),
            "LambdaSender-1700000000-1000"
        );

        let id = mqtt_client_id("LambdaSender");
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        let nonce: u32 = parts[2].parse().unwrap();
        assert!(nonce <= 1000);
    }
}
