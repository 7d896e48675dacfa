//! MQTT broker adapter (ESP-IDF only).
//!
//! Implements [`MessagePort`] on top of `esp_idf_svc::mqtt::client`. The
//! client runs its own task; its callback never touches gate state. It
//! turns each client event into a [`TransportEvent`] and pushes it into
//! an [`EventQueue`] that the main loop drains.
//!
//! ```text
//! ┌────────────────────┐ TransportEvent ┌─────────────┐
//! │ EspMqttClient task │───────────────▶│  Main Loop  │
//! │  (new_cb callback) │                │ GateService │
//! └────────────────────┘ ◀──────────────└─────────────┘
//!                   publish / subscribe / unsubscribe
//! ```

use core::time::Duration;

use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EspMqttEvent, EventPayload, LwtConfiguration, MqttClientConfiguration,
    QoS as MqttQoS,
};
use log::{debug, info, warn};

use crate::app::ports::{MessagePort, QoS, TransportError};
use crate::config::NetworkSettings;
use crate::events::{EventQueue, InboundMessage, TransportEvent};

/// Payload the broker publishes on the will topic if we vanish.
const WILL_PAYLOAD: &[u8] = b"0";

fn to_mqtt_qos(qos: QoS) -> MqttQoS {
    match qos {
        QoS::AtMostOnce => MqttQoS::AtMostOnce,
        QoS::AtLeastOnce => MqttQoS::AtLeastOnce,
        QoS::ExactlyOnce => MqttQoS::ExactlyOnce,
    }
}

pub struct MqttAdapter {
    /// `None` once disconnected.
    client: Option<EspMqttClient<'static>>,
    events: &'static EventQueue,
}

impl MqttAdapter {
    /// Start the client. The connection completes asynchronously with a
    /// `Connected` or `Disconnected` event on `events`.
    pub fn connect(
        settings: &NetworkSettings,
        client_id: &str,
        will_topic: &str,
        keep_alive_secs: u16,
        events: &'static EventQueue,
    ) -> Result<Self, TransportError> {
        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            keep_alive_interval: Some(Duration::from_secs(u64::from(keep_alive_secs))),
            username: settings.broker_user,
            password: settings.broker_password,
            lwt: Some(LwtConfiguration {
                topic: will_topic,
                payload: WILL_PAYLOAD,
                qos: MqttQoS::AtLeastOnce,
                retain: true,
            }),
            ..Default::default()
        };

        info!("MQTT: connecting to {} as '{}'", settings.broker_url, client_id);
        let client = EspMqttClient::new_cb(settings.broker_url, &conf, move |event| {
            Self::on_event(&event, events);
        })
        .map_err(|e| {
            warn!("MQTT: client init failed: {}", e);
            TransportError::Rejected(e.code())
        })?;

        Ok(Self {
            client: Some(client),
            events,
        })
    }

    /// Runs on the client task.
    fn on_event(event: &EspMqttEvent<'_>, events: &EventQueue) {
        let mapped = match event.payload() {
            EventPayload::Connected(_) => Some(TransportEvent::Connected),
            EventPayload::Disconnected => Some(TransportEvent::Disconnected),
            EventPayload::Subscribed(_) => Some(TransportEvent::SubscribeAck(Ok(()))),
            EventPayload::Unsubscribed(_) => Some(TransportEvent::UnsubscribeAck(Ok(()))),
            EventPayload::Received {
                topic,
                data,
                details,
                ..
            } => match details {
                // Only the first chunk carries the topic; the tail of an
                // oversized payload is beyond MAX_PAYLOAD_LEN anyway.
                Details::Complete | Details::InitialChunk(_) => topic
                    .and_then(|t| InboundMessage::new(t, data))
                    .map(|mut msg| {
                        if matches!(details, Details::InitialChunk(_)) {
                            msg.truncated = true;
                        }
                        TransportEvent::Message(msg)
                    }),
                Details::SubsequentChunk(_) => None,
            },
            EventPayload::Error(e) => Some(TransportEvent::Error(e.code())),
            other => {
                debug!("MQTT: {:?}", other);
                None
            }
        };

        // Control events that do not fit are latched by the queue itself.
        if let Some(ev) = mapped {
            let control = ev.is_control();
            if !events.push(ev) && !control {
                warn!("MQTT: event queue busy, message dropped");
            }
        }
    }

    fn client(&mut self) -> Result<&mut EspMqttClient<'static>, TransportError> {
        self.client.as_mut().ok_or(TransportError::NotConnected)
    }
}

impl MessagePort for MqttAdapter {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), TransportError> {
        self.client()?
            .publish(topic, to_mqtt_qos(qos), retain, payload)
            .map(|_| ())
            .map_err(|e| TransportError::Rejected(e.code()))
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), TransportError> {
        debug!("MQTT: subscribe {}", topic);
        self.client()?
            .subscribe(topic, to_mqtt_qos(qos))
            .map(|_| ())
            .map_err(|e| TransportError::Rejected(e.code()))
    }

    fn unsubscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        debug!("MQTT: unsubscribe {}", topic);
        self.client()?
            .unsubscribe(topic)
            .map(|_| ())
            .map_err(|e| TransportError::Rejected(e.code()))
    }

    /// Dropping the client stops its task without a callback, so the
    /// `Disconnected` event is queued here.
    fn disconnect(&mut self) -> Result<(), TransportError> {
        let client = self.client.take().ok_or(TransportError::NotConnected)?;
        drop(client);
        info!("MQTT: client stopped");
        self.events.push(TransportEvent::Disconnected);
        Ok(())
    }
}
