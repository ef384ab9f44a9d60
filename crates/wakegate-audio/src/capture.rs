use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig};

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::ring_buffer::AudioProducer;
use wakegate_foundation::AudioError;
use wakegate_telemetry::PipelineMetrics;

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Requested input device name; `None` uses the host default.
    pub device: Option<String>,
    /// Capture is pinned to this rate; the device must support it.
    pub sample_rate_hz: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate_hz: 16_000,
        }
    }
}

/// Handle to the dedicated audio thread. The cpal stream lives entirely on
/// that thread; dropping the handle does not stop it — call `stop`.
pub struct CaptureThread {
    handle: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
}

impl CaptureThread {
    pub fn spawn(
        config: CaptureConfig,
        producer: AudioProducer,
        metrics: Option<Arc<PipelineMetrics>>,
    ) -> Result<Self, AudioError> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let startup: Arc<RwLock<Option<Result<(), String>>>> = Arc::new(RwLock::new(None));
        let startup_flag = Arc::clone(&startup);

        let handle = thread::Builder::new()
            .name("audio-capture".to_string())
            .spawn(move || {
                // The stream must be built on the thread that owns it.
                let stream = match build_stream(&config, producer, metrics) {
                    Ok(stream) => stream,
                    Err(e) => {
                        *startup_flag.write() = Some(Err(e.to_string()));
                        return;
                    }
                };

                if let Err(e) = stream.play() {
                    *startup_flag.write() = Some(Err(e.to_string()));
                    return;
                }
                *startup_flag.write() = Some(Ok(()));
                tracing::info!("Audio capture started");

                while !shutdown_flag.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(100));
                }

                drop(stream);
                tracing::info!("Audio capture thread shutting down");
            })
            .map_err(|e| AudioError::Fatal(format!("Failed to spawn audio thread: {}", e)))?;

        // Wait for the stream to come up (or fail) before reporting success.
        let deadline = Instant::now() + Duration::from_secs(3);
        loop {
            if let Some(result) = startup.read().clone() {
                result.map_err(AudioError::Fatal)?;
                break;
            }
            if Instant::now() >= deadline {
                return Err(AudioError::NoDataTimeout {
                    duration: Duration::from_secs(3),
                });
            }
            thread::sleep(Duration::from_millis(20));
        }

        Ok(Self { handle, shutdown })
    }

    pub fn stop(self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.handle.join();
    }
}

fn build_stream(
    config: &CaptureConfig,
    mut producer: AudioProducer,
    metrics: Option<Arc<PipelineMetrics>>,
) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();

    let device = match &config.device {
        Some(name) => host
            .input_devices()?
            .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
            .ok_or_else(|| AudioError::DeviceNotFound {
                name: Some(name.clone()),
            })?,
        None => host
            .default_input_device()
            .ok_or(AudioError::DeviceNotFound { name: None })?,
    };

    if let Ok(name) = device.name() {
        tracing::info!("Selected input device: {}", name);
    }

    let sample_format = device.default_input_config()?.sample_format();
    let stream_config = StreamConfig {
        channels: 1,
        sample_rate: SampleRate(config.sample_rate_hz),
        buffer_size: BufferSize::Default,
    };

    let err_fn = |err: cpal::StreamError| {
        tracing::error!("Audio stream error: {}", err);
    };

    let overflow_metrics = metrics.clone();
    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            &stream_config,
            move |data: &[i16], _: &_| {
                if let Some(m) = &overflow_metrics {
                    m.capture_blocks.fetch_add(1, Ordering::Relaxed);
                    m.update_audio_level(data);
                }
                if producer.write(data) == 0 {
                    if let Some(m) = &overflow_metrics {
                        m.ring_overflows.fetch_add(1, Ordering::Relaxed);
                    }
                }
            },
            err_fn,
            None,
        )?,
        SampleFormat::F32 => {
            // Convert in the callback; the scratch buffer is owned by the
            // closure so the hot path never allocates after warm-up.
            let mut scratch: Vec<i16> = Vec::new();
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &_| {
                    scratch.clear();
                    scratch.extend(
                        data.iter()
                            .map(|&s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16),
                    );
                    if let Some(m) = &overflow_metrics {
                        m.capture_blocks.fetch_add(1, Ordering::Relaxed);
                        m.update_audio_level(&scratch);
                    }
                    if producer.write(&scratch) == 0 {
                        if let Some(m) = &overflow_metrics {
                            m.ring_overflows.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                },
                err_fn,
                None,
            )?
        }
        other => {
            return Err(AudioError::FormatNotSupported {
                format: format!("{:?}", other),
            });
        }
    };

    Ok(stream)
}
