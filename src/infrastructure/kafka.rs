use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use serde::Serialize;

use crate::domain::errors::PublishError;
use crate::domain::ports::InventoryPublisher;

/// Value published for each ordered item. Consumed by the inventory service,
/// which expects camelCase keys.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOrderMessage<'a> {
    pub product_id: &'a str,
    pub quantity: i32,
}

pub struct KafkaInventoryPublisher {
    producer: FutureProducer,
    topic: String,
    delivery_timeout: Duration,
}

impl KafkaInventoryPublisher {
    pub fn new(brokers: &str, topic: &str, delivery_timeout: Duration) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", delivery_timeout.as_millis().to_string())
            .set("acks", "all")
            .create()?;

        Ok(Self {
            producer,
            topic: topic.to_string(),
            delivery_timeout,
        })
    }
}

pub fn encode_message(product_id: &str, quantity: i32) -> Result<String, PublishError> {
    serde_json::to_string(&ProductOrderMessage {
        product_id,
        quantity,
    })
    .map_err(|e| PublishError::Encoding(e.to_string()))
}

#[async_trait]
impl InventoryPublisher for KafkaInventoryPublisher {
    async fn publish(&self, product_id: &str, quantity: i32) -> Result<(), PublishError> {
        let payload = encode_message(product_id, quantity)?;
        log::debug!("Sending message to Kafka topic {}: {}", self.topic, payload);

        let record = FutureRecord::to(&self.topic).key(product_id).payload(&payload);
        self.producer
            .send(record, Timeout::After(self.delivery_timeout))
            .await
            .map_err(|(e, _)| PublishError::Rejected(e.to_string()))?;

        log::info!(
            "Sent order item with product ID {} and quantity {}",
            product_id,
            quantity
        );
        Ok(())
    }
}
