use serde::{Deserialize, Serialize};

/// Transcriber configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Path to the model directory.
    pub model_path: String,
    /// Fixed vocabulary the recognizer is constrained to. For keyword
    /// spotting this is the union of both trigger vocabularies; keeping the
    /// grammar this small is what makes recognition fast enough for the
    /// real-time budget.
    pub grammar: Vec<String>,
    /// Input sample rate in Hz.
    pub sample_rate_hz: u32,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            model_path: "model".to_string(),
            grammar: Vec::new(),
            sample_rate_hz: 16_000,
        }
    }
}
