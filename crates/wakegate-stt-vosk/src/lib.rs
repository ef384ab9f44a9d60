//! Vosk recognition engine for wakegate.
//!
//! Feature-gated behind "vosk": the binding needs libvosk at link time, so
//! builds without the native library fall back to `NoopTranscriber`.

#[cfg(feature = "vosk")]
pub mod transcriber;

#[cfg(feature = "vosk")]
pub use transcriber::VoskTranscriber;

pub use wakegate_stt::{SttError, Transcriber, TranscriberConfig};
