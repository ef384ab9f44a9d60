use serde::{Deserialize, Serialize};
use std::path::Path;

use wakegate_foundation::AppError;
use wakegate_kws::KwsConfig;
use wakegate_mqtt::MqttConfig;
use wakegate_vad::GateConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Input device name; `None` uses the host default.
    pub device: Option<String>,
    pub sample_rate_hz: u32,
    /// Capture block size: 640 samples = 40 ms at 16 kHz, the gating unit.
    pub block_samples: usize,
    /// Ring between the audio callback and the block reader, in samples.
    pub ring_capacity: usize,
    /// Bounded hand-off queue between reader and engine, in blocks.
    pub queue_blocks: usize,
    /// WebRTC classifier aggressiveness (0..=3).
    pub vad_aggressiveness: u8,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate_hz: 16_000,
            block_samples: 640,
            ring_capacity: 16_384 * 4,
            queue_blocks: 64,
            vad_aggressiveness: 2,
        }
    }
}

/// Whole-process configuration: defaults match the deployed device, a TOML
/// file overrides them, CLI/env flags override the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub device_id: Option<String>,
    pub broker_host: Option<String>,
    pub broker_port: Option<u16>,
    pub model_path: Option<String>,
    pub audio: AudioSettings,
    pub gate: GateConfig,
    pub kws: KwsConfig,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Config(format!("Cannot read {}: {}", path.display(), e))
                })?;
                toml::from_str(&raw)
                    .map_err(|e| AppError::Config(format!("Invalid {}: {}", path.display(), e)))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn device_id(&self) -> &str {
        self.device_id.as_deref().unwrap_or("RP0001")
    }

    pub fn model_path(&self) -> &str {
        self.model_path.as_deref().unwrap_or("model")
    }

    pub fn mqtt(&self) -> MqttConfig {
        let defaults = MqttConfig::default();
        MqttConfig {
            broker_host: self
                .broker_host
                .clone()
                .unwrap_or(defaults.broker_host),
            broker_port: self.broker_port.unwrap_or(defaults.broker_port),
            device_id: self.device_id().to_string(),
            keep_alive_secs: defaults.keep_alive_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_deployed_device() {
        let settings = Settings::default();
        assert_eq!(settings.device_id(), "RP0001");
        assert_eq!(settings.audio.sample_rate_hz, 16_000);
        assert_eq!(settings.audio.block_samples, 640);
        assert_eq!(settings.kws.window, 5);
        assert_eq!(settings.kws.start_threshold, 2);
        assert_eq!(settings.kws.end_threshold, 4);
        assert_eq!(settings.kws.cooldown_ms, 800);
        assert_eq!(settings.kws.chunk_samples, 16_000);
        assert_eq!(settings.gate.min_dbfs, -35.0);
        assert_eq!(settings.gate.voice_ratio, 0.4);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
device_id = "RP0042"
broker_host = "10.0.0.5"

[kws]
cooldown_ms = 500

[gate]
min_dbfs = -40.0
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.device_id(), "RP0042");
        assert_eq!(settings.mqtt().broker_host, "10.0.0.5");
        assert_eq!(settings.kws.cooldown_ms, 500);
        assert_eq!(settings.gate.min_dbfs, -40.0);
        // Untouched sections keep their defaults.
        assert_eq!(settings.kws.end_threshold, 4);
        assert_eq!(settings.audio.block_samples, 640);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/wakegate.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
