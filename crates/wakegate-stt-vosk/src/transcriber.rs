use tracing::warn;
use vosk::{CompleteResult, DecodingState, Model, Recognizer};
use wakegate_stt::{SttError, Transcriber, TranscriberConfig};

/// Grammar-constrained Vosk recognizer.
///
/// The recognizer only ever has to distinguish the trigger words, so it is
/// built with a fixed grammar (the union of both keyword vocabularies)
/// rather than the model's full language model.
pub struct VoskTranscriber {
    recognizer: Recognizer,
    config: TranscriberConfig,
}

impl VoskTranscriber {
    pub fn new(config: TranscriberConfig) -> Result<Self, SttError> {
        if (config.sample_rate_hz as f32 - 16000.0).abs() > 0.1 {
            warn!(
                "VoskTranscriber: sample rate {}Hz differs from expected 16000Hz. \
                This may affect recognition quality.",
                config.sample_rate_hz
            );
        }

        if !std::path::Path::new(&config.model_path).exists() {
            return Err(SttError::Model(format!(
                "Vosk model not found at '{}'",
                config.model_path
            )));
        }

        let model = Model::new(&config.model_path).ok_or_else(|| {
            SttError::Model(format!(
                "Failed to load Vosk model from: {}",
                config.model_path
            ))
        })?;

        let recognizer = if config.grammar.is_empty() {
            Recognizer::new(&model, config.sample_rate_hz as f32)
        } else {
            let grammar: Vec<&str> = config.grammar.iter().map(String::as_str).collect();
            Recognizer::new_with_grammar(&model, config.sample_rate_hz as f32, &grammar)
        }
        .ok_or_else(|| {
            SttError::Model(format!(
                "Failed to create Vosk recognizer with sample rate: {}",
                config.sample_rate_hz
            ))
        })?;

        let mut this = Self { recognizer, config };
        this.recognizer.set_words(false);
        this.recognizer.set_partial_words(false);
        Ok(this)
    }

    fn parse_complete_result(result: CompleteResult) -> Option<String> {
        match result {
            CompleteResult::Single(single) => {
                let text = single.text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(text.to_string())
                }
            }
            CompleteResult::Multiple(multiple) => multiple
                .alternatives
                .first()
                .map(|alt| alt.text.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }
}

impl Transcriber for VoskTranscriber {
    fn accept_pcm16(&mut self, pcm: &[i16]) -> Result<Option<String>, SttError> {
        let state = self
            .recognizer
            .accept_waveform(pcm)
            .map_err(|e| SttError::Decode(format!("Vosk waveform acceptance failed: {:?}", e)))?;

        match state {
            DecodingState::Finalized => Ok(Self::parse_complete_result(self.recognizer.result())),
            DecodingState::Running => Ok(None),
            DecodingState::Failed => Err(SttError::Decode(
                "Vosk recognition failed for current chunk".to_string(),
            )),
        }
    }

    fn finalize(&mut self) -> Result<Option<String>, SttError> {
        Ok(Self::parse_complete_result(self.recognizer.final_result()))
    }
}

impl std::fmt::Debug for VoskTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoskTranscriber")
            .field("model_path", &self.config.model_path)
            .field("grammar_len", &self.config.grammar.len())
            .finish()
    }
}
