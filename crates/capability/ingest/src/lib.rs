use async_trait::async_trait;
use domain::RawEvent;
use iot_telemetry::{new_event_id, record_raw_event};
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, MqttOptions, Packet, QoS,
    SubscribeReasonCode,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, info, info_span, warn};

/// 采集错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("handler error: {0}")]
    Handler(String),
}

/// RawEvent 处理器（每条消息同步调用一次）。
#[async_trait]
pub trait RawEventHandler: Send + Sync {
    async fn handle(&self, event: RawEvent) -> Result<(), IngestError>;
}

/// 采集源抽象。
#[async_trait]
pub trait Source: Send + Sync {
    async fn run(&self, handler: Arc<dyn RawEventHandler>) -> Result<(), IngestError>;
}

/// 将一条消息交给处理器；任何失败都在这里记录并吞掉，调用方继续处理下一条。
pub async fn dispatch(handler: &dyn RawEventHandler, event: RawEvent) {
    record_raw_event();
    let topic = event.topic.clone();
    let span = info_span!("message", event_id = %new_event_id(), topic = %topic);
    async {
        if let Err(err) = handler.handle(event).await {
            warn!(target: "iot.ingest", topic = %topic, error = %err, "message_processing_failed");
        }
    }
    .instrument(span)
    .await
}

/// 回放源：按顺序回放固定的消息列表（用于接线与测试）。
#[derive(Debug, Default)]
pub struct ReplaySource {
    events: Vec<RawEvent>,
}

impl ReplaySource {
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl Source for ReplaySource {
    async fn run(&self, handler: Arc<dyn RawEventHandler>) -> Result<(), IngestError> {
        for event in &self.events {
            dispatch(handler.as_ref(), event.clone()).await;
        }
        Ok(())
    }
}

/// broker 拒绝连接时的返回码；其它连接错误返回 None。
///
/// 被拒绝的 ConnAck 不会作为事件出现，而是由 `poll` 以错误返回。
pub fn refusal_code(err: &ConnectionError) -> Option<ConnectReturnCode> {
    match err {
        ConnectionError::ConnectionRefused(code) => Some(*code),
        _ => None,
    }
}

/// MQTT 采集源配置。
#[derive(Debug, Clone)]
pub struct MqttSourceConfig {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub client_id: String,
    pub keep_alive: Duration,
    pub reconnect_delay: Duration,
}

/// MQTT 采集源。
///
/// 每次连接成功（ConnAck）后重新订阅；连接失败时按固定间隔无限重连，
/// 从不主动退出。
#[derive(Debug, Clone)]
pub struct MqttSource {
    config: MqttSourceConfig,
}

impl MqttSource {
    pub fn new(config: MqttSourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MqttSourceConfig {
        &self.config
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(
            self.config.client_id.clone(),
            self.config.host.clone(),
            self.config.port,
        );
        options.set_keep_alive(self.config.keep_alive);
        options.set_clean_session(true);
        options
    }
}

#[async_trait]
impl Source for MqttSource {
    async fn run(&self, handler: Arc<dyn RawEventHandler>) -> Result<(), IngestError> {
        let (client, mut eventloop) = AsyncClient::new(self.options(), 10);
        let topic = self.config.topic.as_str();

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    match client.subscribe(topic, QoS::AtMostOnce).await {
                        Ok(()) => info!(
                            target: "iot.ingest",
                            host = %self.config.host,
                            port = self.config.port,
                            topic = %topic,
                            "mqtt_connected_subscribing"
                        ),
                        Err(err) => warn!(
                            target: "iot.ingest",
                            topic = %topic,
                            error = %err,
                            "mqtt_subscribe_failed"
                        ),
                    }
                }
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    if ack
                        .return_codes
                        .iter()
                        .any(|code| matches!(code, SubscribeReasonCode::Failure))
                    {
                        warn!(target: "iot.ingest", topic = %topic, "mqtt_subscribe_rejected");
                    } else {
                        info!(target: "iot.ingest", topic = %topic, "mqtt_subscribed");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let event = RawEvent::new(publish.topic.clone(), publish.payload.to_vec());
                    dispatch(handler.as_ref(), event).await;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(
                        target: "iot.ingest",
                        host = %self.config.host,
                        port = self.config.port,
                        refused = ?refusal_code(&err),
                        error = %err,
                        retry_in_ms = self.config.reconnect_delay.as_millis() as u64,
                        "mqtt_connection_error"
                    );
                    tokio::time::sleep(self.config.reconnect_delay).await;
                }
            }
        }
    }
}
