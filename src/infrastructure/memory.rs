//! In-memory implementations of the order ports.
//!
//! Useful for tests and local development where neither PostgreSQL nor Kafka
//! is available. Both adapters are cheap to clone; clones share state.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::{DomainError, PublishError};
use crate::domain::order::Order;
use crate::domain::ports::{InventoryPublisher, OrderRepository};
use crate::domain::status::OrderStatus;

#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
    unavailable: Arc<RwLock<bool>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with `DomainError::Persistence`.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut flag) = self.unavailable.write() {
            *flag = unavailable;
        }
    }

    pub fn len(&self) -> usize {
        self.orders.read().map(|o| o.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), DomainError> {
        let unavailable = self
            .unavailable
            .read()
            .map_err(|_| DomainError::Persistence("lock poisoned".to_string()))?;
        if *unavailable {
            return Err(DomainError::Persistence("store unavailable".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, Order>>, DomainError> {
        self.check_available()?;
        self.orders
            .read()
            .map_err(|_| DomainError::Persistence("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, Order>>, DomainError> {
        self.check_available()?;
        self.orders
            .write()
            .map_err(|_| DomainError::Persistence("lock poisoned".to_string()))
    }

    fn select(&self, keep: impl Fn(&Order) -> bool) -> Result<Vec<Order>, DomainError> {
        let orders = self.read()?;
        let mut found: Vec<Order> = orders.values().filter(|o| keep(o)).cloned().collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: Order) -> Result<Order, DomainError> {
        let mut orders = self.write()?;
        if orders.contains_key(&order.id) {
            return Err(DomainError::Persistence(format!(
                "order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Order, DomainError> {
        let mut orders = self.write()?;
        let existing = orders.get_mut(&id).ok_or(DomainError::NotFound(id))?;
        existing.status = status;
        existing.updated_at = updated_at;
        Ok(existing.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        self.select(|_| true)
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        self.select(|o| o.status == status)
    }

    async fn find_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, DomainError> {
        self.select(|o| o.customer_id == customer_id)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), DomainError> {
        match self.write()?.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DomainError::NotFound(id)),
        }
    }
}

/// A notification the in-memory publisher accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedItem {
    pub product_id: String,
    pub quantity: i32,
}

/// Records every accepted notification. Products registered with
/// [`InMemoryInventoryPublisher::fail_product`] are rejected.
#[derive(Clone, Default)]
pub struct InMemoryInventoryPublisher {
    published: Arc<RwLock<Vec<PublishedItem>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    attempts: Arc<RwLock<usize>>,
}

impl InMemoryInventoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_product(&self, product_id: impl Into<String>) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(product_id.into());
        }
    }

    pub fn published(&self) -> Vec<PublishedItem> {
        self.published
            .read()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Accepted and rejected calls alike.
    pub fn attempts(&self) -> usize {
        self.attempts.read().map(|a| *a).unwrap_or_default()
    }
}

#[async_trait]
impl InventoryPublisher for InMemoryInventoryPublisher {
    async fn publish(&self, product_id: &str, quantity: i32) -> Result<(), PublishError> {
        if let Ok(mut attempts) = self.attempts.write() {
            *attempts += 1;
        }

        let rejected = self
            .failing
            .read()
            .map(|f| f.contains(product_id))
            .unwrap_or(false);
        if rejected {
            return Err(PublishError::Rejected(format!(
                "product {product_id} is not accepted"
            )));
        }

        self.published
            .write()
            .map_err(|_| PublishError::Rejected("lock poisoned".to_string()))?
            .push(PublishedItem {
                product_id: product_id.to_string(),
                quantity,
            });
        Ok(())
    }
}
