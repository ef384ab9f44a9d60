//! Audio constants shared across the gating pipeline.

/// Sample rate for all processing (Hz). Capture is pinned to this rate.
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Duration of one voice-activity sub-frame (ms).
pub const SUB_FRAME_MS: u32 = 20;

/// Samples per voice-activity sub-frame. 20 ms at 16 kHz.
pub const SUB_FRAME_SAMPLES: usize = (SAMPLE_RATE_HZ as usize / 1000) * SUB_FRAME_MS as usize;
