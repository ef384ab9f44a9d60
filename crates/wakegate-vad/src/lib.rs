pub mod constants;
pub mod energy;
pub mod gate;

pub use constants::{SAMPLE_RATE_HZ, SUB_FRAME_MS, SUB_FRAME_SAMPLES};
pub use gate::{FrameGate, GateConfig, GateDecision};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VadError {
    #[error("Sub-frame length not supported: {samples} samples")]
    BadFrameLength { samples: usize },

    #[error("Classifier failure: {0}")]
    Classifier(String),
}

/// Binary speech/non-speech classification of a short PCM sub-frame.
///
/// The acoustic model behind the decision is an external collaborator;
/// implementations live in sibling crates. Implementations may be `!Send`
/// (the WebRTC classifier is) and are owned by a single processing thread.
pub trait VoiceDetector {
    fn is_speech(&mut self, sub_frame: &[i16]) -> Result<bool, VadError>;
}
