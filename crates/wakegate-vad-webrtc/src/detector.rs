use wakegate_vad::{VadError, VoiceDetector};
use webrtc_vad::{SampleRate, Vad, VadMode};

/// Operating point of the WebRTC classifier, from least to most likely to
/// reject a frame as non-speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggressiveness {
    Quality,
    LowBitrate,
    Aggressive,
    VeryAggressive,
}

impl Default for Aggressiveness {
    fn default() -> Self {
        Self::Aggressive
    }
}

impl From<u8> for Aggressiveness {
    fn from(level: u8) -> Self {
        match level {
            0 => Self::Quality,
            1 => Self::LowBitrate,
            2 => Self::Aggressive,
            _ => Self::VeryAggressive,
        }
    }
}

impl From<Aggressiveness> for VadMode {
    fn from(a: Aggressiveness) -> Self {
        match a {
            Aggressiveness::Quality => VadMode::Quality,
            Aggressiveness::LowBitrate => VadMode::LowBitrate,
            Aggressiveness::Aggressive => VadMode::Aggressive,
            Aggressiveness::VeryAggressive => VadMode::VeryAggressive,
        }
    }
}

/// WebRTC VAD behind the `VoiceDetector` seam.
///
/// The underlying `Vad` is `!Send`; construct this detector on the thread
/// that will use it.
pub struct WebRtcDetector {
    vad: Vad,
}

impl WebRtcDetector {
    pub fn new(aggressiveness: Aggressiveness) -> Self {
        Self {
            vad: Vad::new_with_rate_and_mode(SampleRate::Rate16kHz, aggressiveness.into()),
        }
    }
}

impl Default for WebRtcDetector {
    fn default() -> Self {
        Self::new(Aggressiveness::default())
    }
}

impl VoiceDetector for WebRtcDetector {
    fn is_speech(&mut self, sub_frame: &[i16]) -> Result<bool, VadError> {
        // The classifier accepts 10/20/30 ms frames only.
        self.vad
            .is_voice_segment(sub_frame)
            .map_err(|()| VadError::BadFrameLength {
                samples: sub_frame.len(),
            })
    }
}
