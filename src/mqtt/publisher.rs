//! One-shot MQTT publisher.
//!
//! Every publish opens its own connection, drives the event loop on a
//! background task, waits a bounded time for the publish to complete and then
//! tears the connection down again.

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::core::config::MqttConfig;
use crate::core::models::{Notification, PublishOutcome};
use crate::errors::RelayError;
use crate::utils::ids;

const REQUEST_CAPACITY: usize = 10;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    async fn publish(&self, notification: &Notification) -> Result<PublishOutcome, RelayError>;
}

pub struct MqttPublisher {
    config: MqttConfig,
}

impl MqttPublisher {
    #[must_use]
    pub fn new(config: MqttConfig) -> Self {
        Self { config }
    }

    async fn publish_and_wait(
        &self,
        client: &AsyncClient,
        qos: QoS,
        payload: Vec<u8>,
        done: oneshot::Receiver<Result<(), String>>,
    ) -> Result<PublishOutcome, RelayError> {
        client
            .publish(self.config.topic.clone(), qos, false, payload)
            .await?;

        match tokio::time::timeout(self.config.ack_timeout, done).await {
            Ok(Ok(Ok(()))) => Ok(PublishOutcome::Acknowledged),
            Ok(Ok(Err(e))) => Err(RelayError::MqttError(format!(
                "connection to {}:{} failed: {e}",
                self.config.server, self.config.port
            ))),
            Ok(Err(_)) => Err(RelayError::MqttError(
                "network loop ended before publish completed".to_string(),
            )),
            Err(_) => Ok(PublishOutcome::TimedOut),
        }
    }

    fn options(&self, client_id: &str) -> MqttOptions {
        let mut options = MqttOptions::new(client_id, self.config.server.clone(), self.config.port);
        options.set_keep_alive(self.config.keep_alive);
        options.set_clean_session(true);
        if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
            options.set_credentials(user.clone(), pass.clone());
        }
        options
    }
}

#[must_use]
pub fn qos_from_level(level: u8) -> QoS {
    match level {
        2 => QoS::ExactlyOnce,
        1 => QoS::AtLeastOnce,
        _ => QoS::AtMostOnce,
    }
}

/// Whether `event` marks the end of our publish for the given QoS: the packet
/// leaving the socket for QoS 0, `PUBACK` for QoS 1, `PUBCOMP` for QoS 2.
#[must_use]
pub fn is_publish_complete(event: &Event, qos: QoS) -> bool {
    match qos {
        QoS::AtMostOnce => matches!(event, Event::Outgoing(Outgoing::Publish(_))),
        QoS::AtLeastOnce => matches!(event, Event::Incoming(Packet::PubAck(_))),
        QoS::ExactlyOnce => matches!(event, Event::Incoming(Packet::PubComp(_))),
    }
}

async fn drive_event_loop(
    mut eventloop: EventLoop,
    qos: QoS,
    done: oneshot::Sender<Result<(), String>>,
) {
    let mut done = Some(done);
    loop {
        match eventloop.poll().await {
            Ok(event) => {
                if is_publish_complete(&event, qos) {
                    if let Some(tx) = done.take() {
                        let _ = tx.send(Ok(()));
                    }
                }
                if matches!(event, Event::Outgoing(Outgoing::Disconnect)) {
                    break;
                }
            }
            Err(e) => {
                if let Some(tx) = done.take() {
                    let _ = tx.send(Err(e.to_string()));
                }
                break;
            }
        }
    }
}

async fn stop_network_loop(client: &AsyncClient, mut network: JoinHandle<()>) {
    if let Err(e) = client.try_disconnect() {
        warn!("MQTT disconnect request failed: {}", e);
    }
    if tokio::time::timeout(SHUTDOWN_GRACE, &mut network).await.is_err() {
        network.abort();
    }
}

#[async_trait]
impl NotificationPublisher for MqttPublisher {
    async fn publish(&self, notification: &Notification) -> Result<PublishOutcome, RelayError> {
        let client_id = ids::mqtt_client_id(&self.config.client_id_prefix);
        let qos = qos_from_level(self.config.qos);
        let payload = serde_json::to_vec(notification)?;

        let (client, eventloop) = AsyncClient::new(self.options(&client_id), REQUEST_CAPACITY);
        let (done_tx, done_rx) = oneshot::channel();
        let network = tokio::spawn(drive_event_loop(eventloop, qos, done_tx));

        info!(
            client_id = %client_id,
            server = %self.config.server,
            topic = %self.config.topic,
            "Publishing to {}...",
            self.config.topic
        );

        let result = self.publish_and_wait(&client, qos, payload, done_rx).await;

        stop_network_loop(&client, network).await;

        match result {
            Ok(PublishOutcome::TimedOut) if self.config.require_ack => {
                Err(RelayError::MqttError(format!(
                    "publish to {} not acknowledged within {}s",
                    self.config.topic,
                    self.config.ack_timeout.as_secs()
                )))
            }
            Ok(PublishOutcome::TimedOut) => {
                warn!(
                    topic = %self.config.topic,
                    timeout_secs = self.config.ack_timeout.as_secs(),
                    "Publish not confirmed before timeout; continuing"
                );
                Ok(PublishOutcome::TimedOut)
            }
            other => other,
        }
    }
}
