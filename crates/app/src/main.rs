use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use wakegate_app::config::Settings;
use wakegate_app::runtime::spawn_engine;
use wakegate_audio::{AudioRingBuffer, BlockReader, CaptureConfig, CaptureThread};
use wakegate_foundation::{AppState, HealthMonitor, ShutdownHandler, StateManager};
use wakegate_kws::{KwsConfig, KwsEngine, Vocabulary};
use wakegate_mqtt::{EventPublisher, MqttConnection};
use wakegate_telemetry::PipelineMetrics;
use wakegate_vad::FrameGate;
use wakegate_vad_webrtc::WebRtcDetector;

#[derive(Parser, Debug)]
#[command(name = "wakegate", about = "Edge-device voice-activated session detector")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "WAKEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Device identifier used in topics and payloads.
    #[arg(long, env = "WAKEGATE_DEVICE_ID")]
    device_id: Option<String>,

    /// MQTT broker host.
    #[arg(long, env = "WAKEGATE_BROKER")]
    broker: Option<String>,

    /// MQTT broker port.
    #[arg(long, env = "WAKEGATE_BROKER_PORT")]
    broker_port: Option<u16>,

    /// Path to the recognition model directory.
    #[arg(long, env = "WAKEGATE_MODEL")]
    model: Option<String>,

    /// Input device name (host default when omitted).
    #[arg(long)]
    input_device: Option<String>,
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("logs")?;
    let file_appender = tracing_appender::rolling::daily("logs", "wakegate.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();
    std::mem::forget(guard);
    Ok(())
}

#[cfg(feature = "vosk")]
fn build_transcriber(
    settings: &Settings,
    grammar: Vec<String>,
) -> anyhow::Result<wakegate_stt_vosk::VoskTranscriber> {
    use anyhow::Context;

    let config = wakegate_stt::TranscriberConfig {
        model_path: settings.model_path().to_string(),
        grammar,
        sample_rate_hz: settings.audio.sample_rate_hz,
    };
    wakegate_stt_vosk::VoskTranscriber::new(config).context("vosk transcriber")
}

#[cfg(not(feature = "vosk"))]
fn build_transcriber(
    _settings: &Settings,
    _grammar: Vec<String>,
) -> anyhow::Result<wakegate_stt::NoopTranscriber> {
    Ok(wakegate_stt::NoopTranscriber::new())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;
    tracing::info!("Starting wakegate");

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.device_id.is_some() {
        settings.device_id = cli.device_id;
    }
    if cli.broker.is_some() {
        settings.broker_host = cli.broker;
    }
    if cli.broker_port.is_some() {
        settings.broker_port = cli.broker_port;
    }
    if cli.model.is_some() {
        settings.model_path = cli.model;
    }
    if cli.input_device.is_some() {
        settings.audio.device = cli.input_device;
    }

    let state_manager = StateManager::new();
    let health_monitor = HealthMonitor::new(Duration::from_secs(10));
    let shutdown = ShutdownHandler::new().install().await;
    let metrics = Arc::new(PipelineMetrics::default());

    // --- 1. Audio capture ---
    let ring = AudioRingBuffer::new(settings.audio.ring_capacity);
    let (producer, consumer) = ring.split();
    let capture = CaptureThread::spawn(
        CaptureConfig {
            device: settings.audio.device.clone(),
            sample_rate_hz: settings.audio.sample_rate_hz,
        },
        producer,
        Some(metrics.clone()),
    )?;
    tracing::info!("Audio capture thread started");

    // --- 2. Block reader ---
    let (block_tx, block_rx) = crossbeam_channel::bounded(settings.audio.queue_blocks);
    let reader = BlockReader::new(
        consumer,
        settings.audio.block_samples,
        settings.audio.sample_rate_hz,
    );
    let reader_handle = reader.spawn(block_tx, Some(metrics.clone()))?;
    tracing::info!("Block reader thread started");

    // --- 3. Transport ---
    let (control_tx, control_rx) = crossbeam_channel::unbounded();
    let connection = MqttConnection::spawn(&settings.mqtt(), control_tx);
    health_monitor.register(Box::new(connection.health_check()));
    let publisher = EventPublisher::new(
        connection.client.clone(),
        settings.mqtt().device_id,
        settings.audio.sample_rate_hz,
    )
    .with_metrics(metrics.clone());
    let _health_monitor = health_monitor.start();

    // --- 4. KWS engine ---
    let vocab = Vocabulary::default_command_set();
    let grammar = vocab.grammar();
    let engine_settings = settings.clone();
    let engine_metrics = metrics.clone();
    let engine_handle = spawn_engine(
        move || {
            let detector =
                WebRtcDetector::new(engine_settings.audio.vad_aggressiveness.into());
            let gate = FrameGate::new(engine_settings.gate.clone(), detector);
            let transcriber = build_transcriber(&engine_settings, grammar)?;
            let kws: KwsConfig = engine_settings.kws.clone();
            Ok(KwsEngine::new(
                kws,
                vocab,
                gate,
                transcriber,
                wakegate_foundation::real_clock(),
            )
            .with_metrics(engine_metrics))
        },
        block_rx,
        control_rx,
        move |event| publisher.publish(event),
    )?;

    state_manager.transition(AppState::Running)?;
    tracing::info!("wakegate ready, listening for trigger words");

    // --- Main loop ---
    let mut stats_interval = tokio::time::interval(Duration::from_secs(30));
    loop {
        tokio::select! {
            _ = shutdown.wait() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            _ = stats_interval.tick() => {
                tracing::info!(
                    gate_passed = metrics.gate_passed.load(Ordering::Relaxed),
                    utterances = metrics.utterances_finalized.load(Ordering::Relaxed),
                    sessions = metrics.session_starts.load(Ordering::Relaxed),
                    chunks = metrics.chunks_emitted.load(Ordering::Relaxed),
                    chunks_dropped = metrics.chunks_dropped.load(Ordering::Relaxed),
                    "Pipeline running"
                );
            }
        }
    }

    // --- Graceful shutdown ---
    tracing::info!("Beginning graceful shutdown");
    state_manager.transition(AppState::Stopping)?;

    // Stopping the capture and reader drops the block sender, which lets the
    // engine loop drain and exit on its own.
    capture.stop();
    reader_handle.stop();
    let _ = engine_handle.join();
    connection.abort();

    state_manager.transition(AppState::Stopped)?;
    tracing::info!("Shutdown complete");

    Ok(())
}
