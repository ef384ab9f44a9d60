//! Speech-to-text abstraction layer for wakegate.
//!
//! The recognition engine is an external collaborator: it accepts raw PCM
//! and reports finalized text when it decides an utterance is complete.
//! Engine implementations live in sibling crates (`wakegate-stt-vosk`).

pub mod noop;
pub mod types;

pub use noop::NoopTranscriber;
pub use types::TranscriberConfig;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SttError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Streaming transcription interface.
///
/// Feed 16 kHz mono S16LE PCM; `Some(text)` is returned exactly when the
/// engine reached an utterance boundary and finalized a non-empty result.
pub trait Transcriber {
    fn accept_pcm16(&mut self, pcm: &[i16]) -> Result<Option<String>, SttError>;

    /// Signal end of input for the current utterance and get the final
    /// result if any.
    fn finalize(&mut self) -> Result<Option<String>, SttError>;
}
