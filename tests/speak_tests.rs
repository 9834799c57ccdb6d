use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use speechcast::ai::{ReplyGenerator, SpeechSynthesizer};
use speechcast::api::handler::handle_request;
use speechcast::core::models::{Notification, PublishOutcome, SpeakRequest};
use speechcast::errors::RelayError;
use speechcast::features::{SpeakSettings, Speaker};
use speechcast::mqtt::NotificationPublisher;
use speechcast::storage::{AudioStore, website_url};

const BUCKET: &str = "speech-bucket";
const REGION: &str = "ap-northeast-1";

#[derive(Default)]
struct FakeReplies {
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl ReplyGenerator for FakeReplies {
    async fn generate_reply(&self, user_text: &str) -> Result<String, RelayError> {
        self.prompts.lock().unwrap().push(user_text.to_string());
        if self.fail {
            return Err(RelayError::OpenAIError("model overloaded".to_string()));
        }
        Ok(format!("reply to {user_text}"))
    }
}

#[derive(Default)]
struct FakeSpeech {
    paths: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize_to_file(&self, text: &str, output: &Path) -> Result<(), RelayError> {
        std::fs::write(output, format!("ID3 {text}"))?;
        self.paths.lock().unwrap().push(output.to_path_buf());
        Ok(())
    }
}

#[derive(Default)]
struct FakeStore {
    uploads: Mutex<Vec<(String, String, Vec<u8>)>>,
    fail: bool,
}

#[async_trait]
impl AudioStore for FakeStore {
    async fn upload(&self, path: &Path, key: &str, content_type: &str) -> Result<(), RelayError> {
        if self.fail {
            return Err(RelayError::AwsError("s3 put_object: AccessDenied".to_string()));
        }
        let bytes = std::fs::read(path)?;
        // Yield so concurrent invocations interleave.
        tokio::task::yield_now().await;
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string(), bytes));
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        website_url(BUCKET, REGION, key)
    }
}

enum PublishBehavior {
    Ack,
    Timeout,
    Fail,
}

struct FakePublisher {
    behavior: PublishBehavior,
    published: Mutex<Vec<Notification>>,
    calls: AtomicUsize,
}

impl FakePublisher {
    fn new(behavior: PublishBehavior) -> Self {
        Self {
            behavior,
            published: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NotificationPublisher for FakePublisher {
    async fn publish(&self, notification: &Notification) -> Result<PublishOutcome, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            PublishBehavior::Ack => {
                self.published.lock().unwrap().push(notification.clone());
                Ok(PublishOutcome::Acknowledged)
            }
            PublishBehavior::Timeout => {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(PublishOutcome::TimedOut)
            }
            PublishBehavior::Fail => Err(RelayError::MqttError("connection refused".to_string())),
        }
    }
}

struct Harness {
    replies: Arc<FakeReplies>,
    speech: Arc<FakeSpeech>,
    store: Arc<FakeStore>,
    publisher: Arc<FakePublisher>,
    speaker: Speaker,
    _scratch: tempfile::TempDir,
}

fn harness(replies: FakeReplies, store: FakeStore, publisher: FakePublisher) -> Harness {
    let scratch = tempfile::tempdir().unwrap();
    let replies = Arc::new(replies);
    let speech = Arc::new(FakeSpeech::default());
    let store = Arc::new(store);
    let publisher = Arc::new(publisher);

    let speaker = Speaker::new(
        replies.clone(),
        speech.clone(),
        store.clone(),
        publisher.clone(),
        SpeakSettings {
            default_text: "こんにちは".to_string(),
            secret: Some("open-sesame".to_string()),
            scratch_dir: scratch.path().to_path_buf(),
        },
    );

    Harness {
        replies,
        speech,
        store,
        publisher,
        speaker,
        _scratch: scratch,
    }
}

fn happy_harness() -> Harness {
    harness(
        FakeReplies::default(),
        FakeStore::default(),
        FakePublisher::new(PublishBehavior::Ack),
    )
}

fn assert_website_url(url: &str) {
    let prefix = format!("http://{BUCKET}.s3-website-{REGION}.amazonaws.com/speech_");
    let digits = url
        .strip_prefix(&prefix)
        .and_then(|rest| rest.strip_suffix(".mp3"))
        .unwrap_or_else(|| panic!("unexpected url shape: {url}"));
    assert!(!digits.is_empty());
    assert!(digits.chars().all(|c| c.is_ascii_digit()), "{url}");
}

fn body_of(response: &Value) -> Value {
    serde_json::from_str(response["body"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_success_returns_reply_and_url() {
    let h = happy_harness();
    let request = SpeakRequest {
        text: Some("天気は？".to_string()),
    };

    let reply = h.speaker.speak(&request).await.unwrap();

    assert_eq!(reply.text, "reply to 天気は？");
    assert_website_url(&reply.audio_url);

    let uploads = h.store.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].1, "audio/mpeg");
    assert_eq!(uploads[0].2, "ID3 reply to 天気は？".as_bytes());
    assert!(reply.audio_url.ends_with(&uploads[0].0));

    let published = h.publisher.published.lock().unwrap();
    assert_eq!(
        published.as_slice(),
        &[Notification {
            url: reply.audio_url.clone(),
            text: reply.text.clone(),
            magic: Some("open-sesame".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_missing_text_uses_default() {
    let h = happy_harness();

    h.speaker.speak(&SpeakRequest::default()).await.unwrap();

    assert_eq!(
        h.replies.prompts.lock().unwrap().as_slice(),
        &["こんにちは".to_string()]
    );
}

#[tokio::test]
async fn test_completion_failure_skips_upload_and_publish() {
    let h = harness(
        FakeReplies {
            fail: true,
            ..FakeReplies::default()
        },
        FakeStore::default(),
        FakePublisher::new(PublishBehavior::Ack),
    );

    let response = handle_request(&h.speaker, &json!({ "body": "{\"text\":\"hi\"}" })).await;

    assert_eq!(response["statusCode"], 500);
    assert!(body_of(&response)["error"].as_str().unwrap().contains("model overloaded"));
    assert!(h.speech.paths.lock().unwrap().is_empty());
    assert!(h.store.uploads.lock().unwrap().is_empty());
    assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upload_failure_skips_publish() {
    let h = harness(
        FakeReplies::default(),
        FakeStore {
            fail: true,
            ..FakeStore::default()
        },
        FakePublisher::new(PublishBehavior::Ack),
    );

    let response = handle_request(&h.speaker, &json!({ "body": "{\"text\":\"hi\"}" })).await;

    assert_eq!(response["statusCode"], 500);
    assert_eq!(h.speech.paths.lock().unwrap().len(), 1);
    assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_publish_failure_hides_uploaded_url() {
    let h = harness(
        FakeReplies::default(),
        FakeStore::default(),
        FakePublisher::new(PublishBehavior::Fail),
    );

    let response = handle_request(&h.speaker, &json!({ "body": "{\"text\":\"hi\"}" })).await;

    assert_eq!(response["statusCode"], 500);
    assert_eq!(h.store.uploads.lock().unwrap().len(), 1);
    let body = body_of(&response);
    assert!(body.get("url").is_none());
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_publish_timeout_still_responds() {
    let h = harness(
        FakeReplies::default(),
        FakeStore::default(),
        FakePublisher::new(PublishBehavior::Timeout),
    );

    let response = tokio::time::timeout(
        Duration::from_secs(5),
        handle_request(&h.speaker, &json!({ "body": "{\"text\":\"hi\"}" })),
    )
    .await
    .expect("handler should return within a bounded time");

    assert_eq!(response["statusCode"], 200);
    assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_every_response_allows_any_origin() {
    let ok = happy_harness();
    let failing = harness(
        FakeReplies {
            fail: true,
            ..FakeReplies::default()
        },
        FakeStore::default(),
        FakePublisher::new(PublishBehavior::Ack),
    );

    let responses = [
        handle_request(&ok.speaker, &json!({ "body": "{\"text\":\"hi\"}" })).await,
        handle_request(&ok.speaker, &json!({ "body": "{broken" })).await,
        handle_request(&failing.speaker, &json!({})).await,
        handle_request(&ok.speaker, &json!({ "httpMethod": "OPTIONS" })).await,
    ];

    for response in &responses {
        assert_eq!(
            response["headers"]["Access-Control-Allow-Origin"], "*",
            "missing CORS header on {response}"
        );
    }
    assert_eq!(responses[0]["statusCode"], 200);
    assert_eq!(responses[1]["statusCode"], 500);
    assert_eq!(responses[2]["statusCode"], 500);
    assert_eq!(responses[3]["statusCode"], 204);
}

#[tokio::test]
async fn test_malformed_body_makes_no_external_calls() {
    let h = happy_harness();

    let response = handle_request(&h.speaker, &json!({ "body": "{broken" })).await;

    assert_eq!(response["statusCode"], 500);
    assert!(h.replies.prompts.lock().unwrap().is_empty());
    assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_invocations_use_distinct_keys() {
    let h = happy_harness();
    let request = SpeakRequest {
        text: Some("same text".to_string()),
    };

    let (a, b) = tokio::join!(h.speaker.speak(&request), h.speaker.speak(&request));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.audio_url, b.audio_url);
    let uploads = h.store.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 2);
    assert_ne!(uploads[0].0, uploads[1].0);
}

#[tokio::test]
async fn test_scratch_file_is_removed_after_invocation() {
    let h = happy_harness();

    h.speaker.speak(&SpeakRequest::default()).await.unwrap();

    let paths = h.speech.paths.lock().unwrap();
    assert_eq!(paths.len(), 1);
    assert!(!paths[0].exists());
}

#[tokio::test]
async fn test_preflight_is_answered_without_service_calls() {
    let h = happy_harness();

    let response = handle_request(
        &h.speaker,
        &json!({ "requestContext": { "http": { "method": "OPTIONS" } } }),
    )
    .await;

    assert_eq!(response["statusCode"], 204);
    assert!(h.replies.prompts.lock().unwrap().is_empty());
    assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
}
