//! The engine consumer: one thread that performs every stateful mutation of
//! the session, token window and audio buffer.
//!
//! Block and control channels are the only seams. The detector and
//! recognizer are built inside the thread because neither is `Send`.

use crossbeam_channel::{never, select, Receiver};
use std::thread::{self, JoinHandle};
use tracing::{error, info};

use wakegate_audio::AudioBlock;
use wakegate_kws::{ControlCommand, KwsEngine, SessionEvent};
use wakegate_stt::Transcriber;
use wakegate_vad::VoiceDetector;

/// Build the engine on a fresh thread and run it until the block channel
/// closes. Events are handed to `emit` in order.
pub fn spawn_engine<D, T, F, E>(
    make_engine: F,
    blocks: Receiver<AudioBlock>,
    control: Receiver<ControlCommand>,
    emit: E,
) -> std::io::Result<JoinHandle<()>>
where
    D: VoiceDetector + 'static,
    T: Transcriber + 'static,
    F: FnOnce() -> anyhow::Result<KwsEngine<D, T>> + Send + 'static,
    E: FnMut(&SessionEvent) + Send + 'static,
{
    thread::Builder::new()
        .name("kws-engine".to_string())
        .spawn(move || {
            let engine = match make_engine() {
                Ok(engine) => engine,
                Err(e) => {
                    error!("Failed to build KWS engine: {:#}", e);
                    return;
                }
            };
            run_engine_loop(engine, blocks, control, emit);
        })
}

/// The consumer loop of the pipeline. Suspends only while both channels are
/// empty; each block runs to completion before the next is taken.
pub fn run_engine_loop<D, T, E>(
    mut engine: KwsEngine<D, T>,
    blocks: Receiver<AudioBlock>,
    mut control: Receiver<ControlCommand>,
    mut emit: E,
) where
    D: VoiceDetector,
    T: Transcriber,
    E: FnMut(&SessionEvent),
{
    info!("KWS engine loop started");
    let mut blocks_processed: u64 = 0;

    loop {
        select! {
            recv(blocks) -> block => match block {
                Ok(block) => {
                    for event in engine.process_block(&block.samples) {
                        emit(&event);
                    }
                    blocks_processed += 1;
                }
                Err(_) => {
                    info!(blocks_processed, "Block channel closed, engine loop exiting");
                    break;
                }
            },
            recv(control) -> command => match command {
                Ok(command) => engine.handle_control(command),
                Err(_) => {
                    // Transport side is gone; keep gating and recognizing,
                    // confirmations just can't arrive anymore.
                    control = never();
                }
            },
        }
    }
}
