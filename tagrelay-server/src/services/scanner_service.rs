use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use serde::Deserialize;
use tagrelay_api::{decode_advertisement, decode_manufacturer_data, DecodeError, Measurement};
use tokio::sync::mpsc::UnboundedSender;

use crate::configs::Scanner;
use crate::errors::ScannerError;

/// Message published by a Ruuvi gateway for every advertisement it hears
#[derive(Debug, Deserialize)]
struct GatewayMessage {
    data: String,
}

/// MQTT bridge from a BLE gateway to the measurement channel
pub struct ScannerService {
    client: AsyncClient,
    event_loop: EventLoop,
    topic: String,
}

impl ScannerService {
    pub fn new(scanner: &Scanner) -> Self {
        let mut options = MqttOptions::new(&scanner.client_id, &scanner.host, scanner.port);
        options.set_keep_alive(Duration::from_secs(5));

        if let (Some(username), Some(password)) = (&scanner.username, &scanner.password) {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, 10);

        Self {
            client,
            event_loop,
            topic: scanner.topic.clone(),
        }
    }

    /// Polls the broker and forwards decoded measurements until the receiver is dropped.
    ///
    /// The subscription is renewed on every connection acknowledgement, so it survives
    /// reconnects.
    pub async fn run(mut self, sender: UnboundedSender<Measurement>) {
        tracing::info!("scanning {} for advertisements", self.topic);

        loop {
            match self.event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    match self.client.try_subscribe(&self.topic, QoS::AtMostOnce) {
                        Ok(()) => tracing::debug!("subscribe topic {}", self.topic),
                        Err(e) => tracing::error!(
                            "Failed to subscribe {}: {}",
                            self.topic,
                            ScannerError::from(e)
                        ),
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    match parse_gateway_message(&publish.topic, &publish.payload) {
                        Ok(measurement) => {
                            if sender.send(measurement).is_err() {
                                tracing::info!("measurement channel closed, stopping scanner");
                                return;
                            }
                        }
                        Err(e) => tracing::warn!("Dropping message on {}: {}", publish.topic, e),
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("MQTT error: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }

            if sender.is_closed() {
                tracing::info!("measurement channel closed, stopping scanner");
                return;
            }
        }
    }
}

/// Decodes a gateway message published on `topic`.
///
/// The device id comes from the last topic segment when it is a MAC address,
/// otherwise from the MAC carried in the advertisement.
pub fn parse_gateway_message(topic: &str, payload: &[u8]) -> Result<Measurement, ScannerError> {
    let message: GatewayMessage = serde_json::from_slice(payload)?;
    let data = hex::decode(message.data.trim())?;

    let mut measurement = match decode_advertisement(&data) {
        Ok(measurement) => measurement,
        // Some gateways strip the AD structures and send the manufacturer data only
        Err(DecodeError::MissingManufacturerData | DecodeError::Malformed(_)) => {
            decode_manufacturer_data(&data)?
        }
        Err(e) => return Err(e.into()),
    };

    match topic.rsplit('/').next().filter(|segment| is_mac(segment)) {
        Some(mac) => measurement.device_id = mac.to_uppercase(),
        None if measurement.device_id.is_empty() => {
            return Err(ScannerError::MissingDeviceId(topic.to_string()));
        }
        None => {}
    }

    Ok(measurement)
}

// Six hex octets separated by colons
fn is_mac(segment: &str) -> bool {
    let octets: Vec<&str> = segment.split(':').collect();

    octets.len() == 6
        && octets
            .iter()
            .all(|octet| octet.len() == 2 && octet.chars().all(|c| c.is_ascii_hexdigit()))
}
