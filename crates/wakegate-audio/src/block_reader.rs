use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::ring_buffer::AudioConsumer;
use wakegate_telemetry::{FpsTracker, PipelineMetrics, PipelineStage};

/// One fixed-size capture block, the unit the gate and recognizer see.
#[derive(Debug, Clone)]
pub struct AudioBlock {
    pub samples: Vec<i16>,
    /// Stream position reconstructed from the sample count.
    pub timestamp_ms: u64,
}

/// Assembles fixed-size blocks from the capture ring and feeds the bounded
/// hand-off channel. The channel is the producer/consumer boundary of the
/// pipeline: this thread only enqueues, the engine thread only dequeues.
pub struct BlockReader {
    consumer: AudioConsumer,
    block_samples: usize,
    sample_rate_hz: u32,
}

pub struct BlockReaderHandle {
    handle: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
}

impl BlockReaderHandle {
    pub fn stop(self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.handle.join();
    }
}

impl BlockReader {
    pub fn new(consumer: AudioConsumer, block_samples: usize, sample_rate_hz: u32) -> Self {
        Self {
            consumer,
            block_samples,
            sample_rate_hz,
        }
    }

    pub fn spawn(
        self,
        tx: Sender<AudioBlock>,
        metrics: Option<Arc<PipelineMetrics>>,
    ) -> std::io::Result<BlockReaderHandle> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("block-reader".to_string())
            .spawn(move || self.run(tx, metrics, shutdown_flag))?;

        Ok(BlockReaderHandle { handle, shutdown })
    }

    fn run(
        mut self,
        tx: Sender<AudioBlock>,
        metrics: Option<Arc<PipelineMetrics>>,
        shutdown: Arc<AtomicBool>,
    ) {
        tracing::info!(
            block_samples = self.block_samples,
            "Block reader started"
        );

        let mut scratch = vec![0i16; self.block_samples];
        let mut pending: Vec<i16> = Vec::with_capacity(self.block_samples * 2);
        let mut samples_emitted: u64 = 0;
        let mut fps = FpsTracker::new();

        while !shutdown.load(Ordering::SeqCst) {
            let n = self.consumer.read(&mut scratch);
            if n == 0 {
                // Blocks arrive every 40 ms at the default size; a short
                // sleep keeps the poll cheap without risking ring overflow.
                thread::sleep(Duration::from_millis(10));
                continue;
            }
            pending.extend_from_slice(&scratch[..n]);

            while pending.len() >= self.block_samples {
                let samples: Vec<i16> = pending.drain(..self.block_samples).collect();
                let timestamp_ms = samples_emitted * 1000 / self.sample_rate_hz as u64;
                samples_emitted += self.block_samples as u64;

                if let Some(m) = &metrics {
                    m.mark_stage_active(PipelineStage::Capture);
                    if let Some(rate) = fps.tick() {
                        m.update_capture_fps(rate);
                    }
                }

                let block = AudioBlock {
                    samples,
                    timestamp_ms,
                };
                if tx.send(block).is_err() {
                    tracing::info!("Block channel closed, reader exiting");
                    return;
                }
            }
        }

        tracing::info!("Block reader stopped");
    }
}
