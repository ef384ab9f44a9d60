use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker address.
    pub broker_host: String,
    pub broker_port: u16,
    /// Device identifier; appears in every topic and payload.
    pub device_id: String,
    pub keep_alive_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            device_id: "RP0001".to_string(),
            keep_alive_secs: 60,
        }
    }
}
