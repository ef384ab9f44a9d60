use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KwsConfig {
    /// Token window capacity; only the most recent tokens are scored.
    pub window: usize,
    /// Start-vocabulary hits needed in the window to open a session.
    pub start_threshold: usize,
    /// End-vocabulary hits needed in the window to request session end.
    pub end_threshold: usize,
    /// Minimum time between two state-changing events. Shared by both
    /// vocabularies: one debounce for the whole session.
    pub cooldown_ms: u64,
    /// Samples per outgoing audio chunk. One second at 16 kHz.
    pub chunk_samples: usize,
    /// Intended lower bound on session length before an end request is
    /// honored. Declared for parity with the deployed device config; not
    /// applied to any transition.
    pub min_session_time_ms: u64,
    /// Intended minimum chunk count before an end request is honored.
    /// Declared, not applied (see min_session_time_ms).
    pub min_chunks_before_end: u32,
}

impl Default for KwsConfig {
    fn default() -> Self {
        Self {
            window: 5,
            start_threshold: 2,
            end_threshold: 4,
            cooldown_ms: 800,
            chunk_samples: 16_000,
            min_session_time_ms: 1_200,
            min_chunks_before_end: 2,
        }
    }
}

impl KwsConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}
