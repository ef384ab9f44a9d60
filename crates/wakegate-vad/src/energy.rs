//! Frame loudness in dBFS, derived from RMS amplitude.

/// Floor reported for empty or fully silent frames.
pub const SILENCE_DBFS: f32 = -100.0;

/// RMS amplitude of a PCM frame, normalized to full scale (0.0..=1.0).
pub fn frame_rms(frame: &[i16]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }

    let sum_squares: i64 = frame
        .iter()
        .map(|&sample| {
            let s = sample as i64;
            s * s
        })
        .sum();

    let mean_square = sum_squares as f64 / frame.len() as f64;
    (mean_square.sqrt() / 32768.0) as f32
}

/// Loudness of a PCM frame in dBFS. 0 dBFS is full scale.
pub fn frame_dbfs(frame: &[i16]) -> f32 {
    let rms = frame_rms(frame);
    if rms <= 1e-10 {
        return SILENCE_DBFS;
    }
    20.0 * rms.log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SUB_FRAME_SAMPLES;

    #[test]
    fn silence_hits_the_floor() {
        let silence = vec![0i16; SUB_FRAME_SAMPLES];
        assert_eq!(frame_dbfs(&silence), SILENCE_DBFS);
    }

    #[test]
    fn empty_frame_hits_the_floor() {
        assert_eq!(frame_dbfs(&[]), SILENCE_DBFS);
    }

    #[test]
    fn full_scale_is_zero_dbfs() {
        let full_scale = vec![32767i16; SUB_FRAME_SAMPLES];
        let db = frame_dbfs(&full_scale);
        assert!(db.abs() < 0.1);
    }

    #[test]
    fn sine_rms_matches_theory() {
        // A sine at half scale has RMS = 0.5 / sqrt(2) ~ 0.354.
        let sine: Vec<i16> = (0..SUB_FRAME_SAMPLES)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / SUB_FRAME_SAMPLES as f32;
                (phase.sin() * 16384.0) as i16
            })
            .collect();
        let rms = frame_rms(&sine);
        assert!((rms - 0.354).abs() < 0.01);
    }
}
