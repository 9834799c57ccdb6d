//! MQTT delivery of notifications to the listening device

pub mod publisher;

pub use publisher::{MqttPublisher, NotificationPublisher};
