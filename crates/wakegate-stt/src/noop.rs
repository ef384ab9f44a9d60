//! No-operation transcriber for testing and fallback.

use crate::{SttError, Transcriber};

/// A transcriber that never yields text. Used when no engine feature is
/// enabled so the rest of the pipeline still runs end to end.
#[derive(Debug, Clone, Default)]
pub struct NoopTranscriber;

impl NoopTranscriber {
    pub fn new() -> Self {
        tracing::warn!("No STT engine compiled in; recognition is disabled");
        Self
    }
}

impl Transcriber for NoopTranscriber {
    fn accept_pcm16(&mut self, _pcm: &[i16]) -> Result<Option<String>, SttError> {
        Ok(None)
    }

    fn finalize(&mut self) -> Result<Option<String>, SttError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_transcribes() {
        let mut t = NoopTranscriber;
        assert!(t.accept_pcm16(&[0i16; 640]).unwrap().is_none());
        assert!(t.finalize().unwrap().is_none());
    }
}
