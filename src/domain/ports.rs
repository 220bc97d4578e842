use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::{DomainError, PublishError};
use super::order::Order;
use super::status::OrderStatus;

/// Durable store for order aggregates.
///
/// `save` is the only multi-row write: a new order and all of its items are
/// written together or not at all. After that only `status` and `updated_at`
/// ever change, through `update_status`, which never creates a row.
#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Stores a new aggregate. An id that is already stored is a
    /// `DomainError::Persistence` failure.
    async fn save(&self, order: Order) -> Result<Order, DomainError>;
    /// Changes the lifecycle columns of a stored order and returns it.
    /// `DomainError::NotFound` if the order is gone.
    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Order, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    async fn find_all(&self) -> Result<Vec<Order>, DomainError>;
    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError>;
    async fn find_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, DomainError>;
    /// Removes the order and its items. `DomainError::NotFound` if absent.
    async fn delete_by_id(&self, id: Uuid) -> Result<(), DomainError>;
}

/// Outbound notification of stock consumption to the inventory subsystem.
#[async_trait]
pub trait InventoryPublisher: Send + Sync + 'static {
    async fn publish(&self, product_id: &str, quantity: i32) -> Result<(), PublishError>;
}
