//! Wire format of outbound messages.
//!
//! Every payload carries the common envelope (`rp_id`, `format`,
//! `sample_rate`, `audio`) so the consumer can treat all three kinds
//! uniformly; lifecycle events ship an empty audio field.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const AUDIO_FORMAT: &str = "pcm_s16le";

/// Session lifecycle message ("start" / "end").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleMessage {
    pub rp_id: String,
    pub event: String,
    pub chunk_number: u32,
    pub timestamp: String,
    pub audio: String,
    pub format: String,
    pub sample_rate: u32,
}

/// One second of session audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioChunkMessage {
    pub rp_id: String,
    pub chunk_number: u32,
    pub timestamp: String,
    pub audio: String,
    pub format: String,
    pub sample_rate: u32,
}

pub fn start_topic(device_id: &str) -> String {
    format!("rp/{}/event/kws/start", device_id)
}

pub fn end_topic(device_id: &str) -> String {
    format!("rp/{}/event/kws/end", device_id)
}

pub fn audio_topic(device_id: &str) -> String {
    format!("rp/{}/audio/stream", device_id)
}

/// Subscription filter for inbound control messages.
pub fn control_filter(device_id: &str) -> String {
    format!("server/control/{}/#", device_id)
}

/// The only control topic currently recognized.
pub fn control_end_topic(device_id: &str) -> String {
    format!("server/control/{}/end", device_id)
}

/// Second-resolution UTC timestamp, matching the consumer's expectations.
pub fn utc_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Little-endian S16 PCM, base64-encoded for the JSON payload.
pub fn encode_pcm(pcm: &[i16]) -> String {
    let mut bytes = Vec::with_capacity(pcm.len() * 2);
    for sample in pcm {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    STANDARD.encode(bytes)
}
