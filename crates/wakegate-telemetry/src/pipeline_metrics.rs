use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicI16, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared metrics for cross-thread pipeline monitoring
#[derive(Clone)]
pub struct PipelineMetrics {
    // Audio level monitoring
    pub current_peak: Arc<AtomicI16>,   // Peak sample value in current block
    pub audio_level_db: Arc<AtomicI16>, // Current level in dBFS * 10

    // Capture side
    pub capture_blocks: Arc<AtomicU64>,
    pub ring_overflows: Arc<AtomicU64>,
    pub capture_fps: Arc<AtomicU64>, // Blocks per second * 10

    // Frame gate verdicts
    pub gate_passed: Arc<AtomicU64>,
    pub gate_rejected_loudness: Arc<AtomicU64>,
    pub gate_rejected_voice: Arc<AtomicU64>,

    // Recognition
    pub utterances_finalized: Arc<AtomicU64>,
    pub empty_results: Arc<AtomicU64>,
    pub stt_errors: Arc<AtomicU64>,

    // Session lifecycle
    pub session_starts: Arc<AtomicU64>,
    pub session_end_requests: Arc<AtomicU64>,
    pub session_confirms: Arc<AtomicU64>,
    pub session_active: Arc<AtomicBool>,
    pub last_session_start: Arc<RwLock<Option<Instant>>>,

    // Chunk streaming
    pub chunks_emitted: Arc<AtomicU64>,
    pub chunks_dropped: Arc<AtomicU64>, // Slices that failed the re-gate
    pub buffered_samples: Arc<AtomicUsize>,

    // Stage liveness
    pub stage_capture: Arc<AtomicBool>,
    pub stage_gate: Arc<AtomicBool>,
    pub stage_recognize: Arc<AtomicBool>,
    pub stage_stream: Arc<AtomicBool>,

    // Transport
    pub publish_failures: Arc<AtomicU64>,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self {
            current_peak: Arc::new(AtomicI16::new(0)),
            audio_level_db: Arc::new(AtomicI16::new(-1000)),

            capture_blocks: Arc::new(AtomicU64::new(0)),
            ring_overflows: Arc::new(AtomicU64::new(0)),
            capture_fps: Arc::new(AtomicU64::new(0)),

            gate_passed: Arc::new(AtomicU64::new(0)),
            gate_rejected_loudness: Arc::new(AtomicU64::new(0)),
            gate_rejected_voice: Arc::new(AtomicU64::new(0)),

            utterances_finalized: Arc::new(AtomicU64::new(0)),
            empty_results: Arc::new(AtomicU64::new(0)),
            stt_errors: Arc::new(AtomicU64::new(0)),

            session_starts: Arc::new(AtomicU64::new(0)),
            session_end_requests: Arc::new(AtomicU64::new(0)),
            session_confirms: Arc::new(AtomicU64::new(0)),
            session_active: Arc::new(AtomicBool::new(false)),
            last_session_start: Arc::new(RwLock::new(None)),

            chunks_emitted: Arc::new(AtomicU64::new(0)),
            chunks_dropped: Arc::new(AtomicU64::new(0)),
            buffered_samples: Arc::new(AtomicUsize::new(0)),

            stage_capture: Arc::new(AtomicBool::new(false)),
            stage_gate: Arc::new(AtomicBool::new(false)),
            stage_recognize: Arc::new(AtomicBool::new(false)),
            stage_stream: Arc::new(AtomicBool::new(false)),

            publish_failures: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl PipelineMetrics {
    pub fn update_audio_level(&self, samples: &[i16]) {
        if samples.is_empty() {
            return;
        }

        let peak = samples
            .iter()
            .map(|&s| (s as i32).abs())
            .max()
            .unwrap_or(0)
            .min(i16::MAX as i32) as i16;
        self.current_peak.store(peak, Ordering::Relaxed);

        let db = if peak > 0 {
            (20.0 * (peak as f64 / 32768.0).log10() * 10.0) as i16
        } else {
            -1000
        };
        self.audio_level_db.store(db, Ordering::Relaxed);
    }

    pub fn mark_stage_active(&self, stage: PipelineStage) {
        match stage {
            PipelineStage::Capture => self.stage_capture.store(true, Ordering::Relaxed),
            PipelineStage::Gate => self.stage_gate.store(true, Ordering::Relaxed),
            PipelineStage::Recognize => self.stage_recognize.store(true, Ordering::Relaxed),
            PipelineStage::Stream => self.stage_stream.store(true, Ordering::Relaxed),
        }
    }

    pub fn decay_stages(&self) {
        self.stage_capture.store(false, Ordering::Relaxed);
        self.stage_gate.store(false, Ordering::Relaxed);
        self.stage_recognize.store(false, Ordering::Relaxed);
        self.stage_stream.store(false, Ordering::Relaxed);
    }

    pub fn update_capture_fps(&self, fps: f64) {
        self.capture_fps.store((fps * 10.0) as u64, Ordering::Relaxed);
    }

    pub fn mark_session_start(&self, at: Instant) {
        self.session_starts.fetch_add(1, Ordering::Relaxed);
        self.session_active.store(true, Ordering::Relaxed);
        *self.last_session_start.write() = Some(at);
    }

    pub fn mark_session_confirm(&self) {
        self.session_confirms.fetch_add(1, Ordering::Relaxed);
        self.session_active.store(false, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PipelineStage {
    Capture,
    Gate,
    Recognize,
    Stream,
}

#[derive(Debug)]
pub struct FpsTracker {
    last_update: Instant,
    frame_count: u64,
}

impl FpsTracker {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed >= Duration::from_secs(1) {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.last_update = Instant::now();
            self.frame_count = 0;
            Some(fps)
        } else {
            None
        }
    }
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}
