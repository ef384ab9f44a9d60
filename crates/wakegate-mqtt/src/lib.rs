//! MQTT transport for wakegate.
//!
//! Publishes the three outbound message kinds (session start, session end
//! request, audio chunk) and forwards confirmed-end control messages into
//! the engine's control channel. Connection management, reconnection and
//! redelivery are rumqttc's job; the core never retries a publish.

pub mod config;
pub mod connection;
pub mod messages;
pub mod publisher;

pub use config::MqttConfig;
pub use connection::{BrokerHealth, MqttConnection};
pub use publisher::EventPublisher;
