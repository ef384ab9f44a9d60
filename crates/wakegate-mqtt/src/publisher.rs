use rumqttc::{AsyncClient, QoS};
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, warn};

use wakegate_kws::SessionEvent;
use wakegate_telemetry::PipelineMetrics;

use crate::messages::{
    audio_topic, encode_pcm, end_topic, start_topic, utc_timestamp, AudioChunkMessage,
    LifecycleMessage, AUDIO_FORMAT,
};

/// Maps engine events to wire messages and hands them to the client's
/// outgoing queue. Called from the engine thread; `try_publish` never
/// blocks the real-time path.
#[derive(Clone)]
pub struct EventPublisher {
    client: AsyncClient,
    device_id: String,
    sample_rate_hz: u32,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl EventPublisher {
    pub fn new(client: AsyncClient, device_id: String, sample_rate_hz: u32) -> Self {
        Self {
            client,
            device_id,
            sample_rate_hz,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn publish(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Started => {
                let msg = self.lifecycle_message("start", 0);
                self.publish_json(&start_topic(&self.device_id), &msg);
            }
            SessionEvent::EndRequested { chunk_number } => {
                let msg = self.lifecycle_message("end", *chunk_number);
                self.publish_json(&end_topic(&self.device_id), &msg);
            }
            SessionEvent::Chunk { chunk_number, pcm } => {
                let msg = AudioChunkMessage {
                    rp_id: self.device_id.clone(),
                    chunk_number: *chunk_number,
                    timestamp: utc_timestamp(),
                    audio: encode_pcm(pcm),
                    format: AUDIO_FORMAT.to_string(),
                    sample_rate: self.sample_rate_hz,
                };
                self.publish_json(&audio_topic(&self.device_id), &msg);
            }
        }
    }

    fn lifecycle_message(&self, event: &str, chunk_number: u32) -> LifecycleMessage {
        LifecycleMessage {
            rp_id: self.device_id.clone(),
            event: event.to_string(),
            chunk_number,
            timestamp: utc_timestamp(),
            audio: String::new(),
            format: AUDIO_FORMAT.to_string(),
            sample_rate: self.sample_rate_hz,
        }
    }

    fn publish_json<M: Serialize>(&self, topic: &str, message: &M) {
        let payload = match serde_json::to_vec(message) {
            Ok(payload) => payload,
            Err(e) => {
                error!(topic, "Failed to serialize payload: {}", e);
                return;
            }
        };

        // Delivery and reconnection belong to the transport; a failed
        // enqueue is logged and forgotten.
        if let Err(e) = self
            .client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)
        {
            if let Some(m) = &self.metrics {
                m.publish_failures.fetch_add(1, Ordering::Relaxed);
            }
            warn!(topic, "Publish failed: {}", e);
        }
    }
}
