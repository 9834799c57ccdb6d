//! The speak flow: reply → speech → upload → publish.
//!
//! Steps run strictly in order and the first error ends the invocation. The
//! scratch audio file lives only as long as the call.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::ai::{LlmClient, ReplyGenerator, SpeechSynthesizer};
use crate::core::config::AppConfig;
use crate::core::models::{Notification, ReplyPackage, SpeakRequest};
use crate::errors::RelayError;
use crate::mqtt::{MqttPublisher, NotificationPublisher};
use crate::storage::{AudioStore, S3AudioStore};
use crate::utils::{ids, mime};

#[derive(Debug, Clone)]
pub struct SpeakSettings {
    pub default_text: String,
    pub secret: Option<String>,
    pub scratch_dir: PathBuf,
}

impl SpeakSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_text: config.default_text.clone(),
            secret: config.secret_pass.clone(),
            scratch_dir: config.scratch_dir.clone(),
        }
    }
}

pub struct Speaker {
    replies: Arc<dyn ReplyGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn AudioStore>,
    publisher: Arc<dyn NotificationPublisher>,
    settings: SpeakSettings,
}

impl Speaker {
    #[must_use]
    pub fn new(
        replies: Arc<dyn ReplyGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn AudioStore>,
        publisher: Arc<dyn NotificationPublisher>,
        settings: SpeakSettings,
    ) -> Self {
        Self {
            replies,
            speech,
            store,
            publisher,
            settings,
        }
    }

    /// Wires the production clients: `OpenAI` for reply and speech, S3 for
    /// storage, MQTT for delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the `OpenAI` client cannot be built.
    pub async fn from_config(config: &AppConfig) -> Result<Self, RelayError> {
        let llm = Arc::new(LlmClient::new(config)?);
        let store = Arc::new(S3AudioStore::from_config(config).await);
        let publisher = Arc::new(MqttPublisher::new(config.mqtt.clone()));

        Ok(Self::new(
            llm.clone(),
            llm,
            store,
            publisher,
            SpeakSettings::from_config(config),
        ))
    }

    /// # Errors
    ///
    /// Returns the first error raised by any step; later steps are skipped.
    pub async fn speak(&self, request: &SpeakRequest) -> Result<ReplyPackage, RelayError> {
        let user_text = request.text_or(&self.settings.default_text);
        info!("User Input: {}", user_text);

        let mut reply = ReplyPackage {
            text: self.replies.generate_reply(user_text).await?,
            ..ReplyPackage::default()
        };

        let scratch = tempfile::Builder::new()
            .prefix(ids::AUDIO_KEY_PREFIX)
            .suffix(ids::AUDIO_KEY_EXTENSION)
            .tempfile_in(&self.settings.scratch_dir)?;
        self.speech
            .synthesize_to_file(&reply.text, scratch.path())
            .await?;

        let key = ids::audio_object_key();
        let content_type = mime::content_type_for_key(&key);
        self.store
            .upload(scratch.path(), &key, &content_type)
            .await?;
        reply.audio_url = self.store.public_url(&key);

        let notification = Notification {
            url: reply.audio_url.clone(),
            text: reply.text.clone(),
            magic: self.settings.secret.clone(),
        };
        let outcome = self.publisher.publish(&notification).await?;
        info!(outcome = ?outcome, url = %reply.audio_url, "Notification published");

        Ok(reply)
    }
}
