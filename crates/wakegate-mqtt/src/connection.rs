use crossbeam_channel::Sender;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use wakegate_foundation::HealthCheck;
use wakegate_kws::ControlCommand;

use crate::config::MqttConfig;
use crate::messages::{control_end_topic, control_filter};

/// Owns the rumqttc event loop task. Outbound publishing goes through the
/// cloned `AsyncClient`; inbound control messages are forwarded into the
/// engine's control channel.
pub struct MqttConnection {
    pub client: AsyncClient,
    connected: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl MqttConnection {
    pub fn spawn(config: &MqttConfig, control_tx: Sender<ControlCommand>) -> Self {
        let mut options = MqttOptions::new(
            format!("RP_{}", config.device_id),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));

        let (client, mut eventloop) = AsyncClient::new(options, 32);
        let connected = Arc::new(AtomicBool::new(false));

        let connected_flag = Arc::clone(&connected);
        let loop_client = client.clone();
        let filter = control_filter(&config.device_id);
        let end_topic = control_end_topic(&config.device_id);

        let handle = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        connected_flag.store(true, Ordering::SeqCst);
                        info!("MQTT connected");
                        if let Err(e) = loop_client
                            .subscribe(filter.clone(), QoS::AtLeastOnce)
                            .await
                        {
                            warn!("Control subscription failed: {}", e);
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        if publish.topic == end_topic {
                            info!("Session end confirmed by consumer");
                            if control_tx.send(ControlCommand::ConfirmEnd).is_err() {
                                info!("Control channel closed, connection task exiting");
                                return;
                            }
                        } else {
                            // Nothing else is recognized on the control tree.
                            debug!(topic = %publish.topic, "Ignoring control message");
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        connected_flag.store(false, Ordering::SeqCst);
                        warn!("MQTT connection error: {}, retrying", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Self {
            client,
            connected,
            handle,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Health probe handle for the monitor.
    pub fn health_check(&self) -> BrokerHealth {
        BrokerHealth {
            connected: Arc::clone(&self.connected),
        }
    }

    pub fn abort(self) {
        self.handle.abort();
    }
}

pub struct BrokerHealth {
    connected: Arc<AtomicBool>,
}

impl HealthCheck for BrokerHealth {
    fn check(&self) -> Result<(), String> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err("broker not connected".to_string())
        }
    }

    fn name(&self) -> &str {
        "mqtt-broker"
    }
}
