use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use uuid::Uuid;

use crate::domain::errors::{DomainError, PublishError};
use crate::domain::order::{timestamp_now, Order, OrderCreateRequest};
use crate::domain::ports::{InventoryPublisher, OrderRepository};
use crate::domain::status::{self, OrderStatus};

/// Upper bounds for calls into the ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub repository: Duration,
    pub publish: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            repository: Duration::from_secs(5),
            publish: Duration::from_secs(5),
        }
    }
}

/// An item whose inventory notification did not go out after the order was
/// stored. Needs operator follow-up; nothing here retries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingNotification {
    pub item_id: Uuid,
    pub product_id: String,
    pub quantity: i32,
    pub reason: PublishError,
}

#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order: Order,
    pub outstanding_notifications: Vec<OutstandingNotification>,
}

impl CreatedOrder {
    /// Stored, but at least one notification is outstanding.
    pub fn is_degraded(&self) -> bool {
        !self.outstanding_notifications.is_empty()
    }
}

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    publisher: Arc<dyn InventoryPublisher>,
    timeouts: Timeouts,
}

impl OrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        publisher: Arc<dyn InventoryPublisher>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            repo,
            publisher,
            timeouts,
        }
    }

    /// Validate and store a new order, then notify inventory once per item.
    ///
    /// Storing is the success criterion. Notifications are only attempted
    /// after the store accepted the aggregate, and a failed notification never
    /// undoes the order: it is returned in
    /// [`CreatedOrder::outstanding_notifications`].
    pub async fn create_order(
        &self,
        request: OrderCreateRequest,
    ) -> Result<CreatedOrder, DomainError> {
        log::info!(
            "Creating a new order for customer {} with {} item(s)",
            request.customer_id,
            request.items.len()
        );

        let order = Order::create(request, timestamp_now()).map_err(|e| {
            log::warn!("Rejected order request: {}", e);
            e
        })?;

        let order = self.bounded(self.repo.save(order)).await.map_err(|e| {
            log::error!("Failed to store new order: {}", e);
            e
        })?;
        log::info!(
            "Order {} stored with {} item(s)",
            order.id,
            order.items.len()
        );

        let outstanding_notifications = self.notify_inventory(&order).await;
        if outstanding_notifications.is_empty() {
            log::info!("Inventory notified for all items of order {}", order.id);
        } else {
            log::warn!(
                "Order {} stored but {} of {} inventory notification(s) are outstanding",
                order.id,
                outstanding_notifications.len(),
                order.items.len()
            );
        }

        Ok(CreatedOrder {
            order,
            outstanding_notifications,
        })
    }

    /// Publish every item concurrently and wait for all attempts.
    async fn notify_inventory(&self, order: &Order) -> Vec<OutstandingNotification> {
        let attempts = order.items.iter().map(|item| async move {
            let outcome = match tokio::time::timeout(
                self.timeouts.publish,
                self.publisher.publish(&item.product_id, item.quantity),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(PublishError::TimedOut(self.timeouts.publish.as_millis())),
            };

            match outcome {
                Ok(()) => {
                    log::debug!(
                        "Published product {} quantity {} for order {}",
                        item.product_id,
                        item.quantity,
                        order.id
                    );
                    None
                }
                Err(reason) => {
                    log::warn!(
                        "Inventory notification for product {} (order {}, item {}) failed: {}",
                        item.product_id,
                        order.id,
                        item.id,
                        reason
                    );
                    Some(OutstandingNotification {
                        item_id: item.id,
                        product_id: item.product_id.clone(),
                        quantity: item.quantity,
                        reason,
                    })
                }
            }
        });

        join_all(attempts).await.into_iter().flatten().collect()
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        requested: OrderStatus,
    ) -> Result<Order, DomainError> {
        log::info!("Updating order {} to status {}", id, requested);

        let mut order = self.get_order(id).await?;
        let next = status::transition(id, order.status, requested, order.fulfillment())
            .map_err(|e| {
                log::warn!("{}", e);
                e
            })?;

        order.apply_status(next, timestamp_now());
        let updated = self
            .bounded(self.repo.update_status(id, order.status, order.updated_at))
            .await
            .map_err(|e| {
                if matches!(e, DomainError::NotFound(_)) {
                    log::warn!("Order {} was deleted before its status could change", id);
                }
                e
            })?;
        log::info!("Order {} updated to status {}", id, updated.status);
        Ok(updated)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        log::info!("Fetching order {}", id);
        self.bounded(self.repo.find_by_id(id))
            .await?
            .ok_or_else(|| {
                log::warn!("Order {} not found", id);
                DomainError::NotFound(id)
            })
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        let orders = self.bounded(self.repo.find_all()).await?;
        log::debug!("Retrieved {} orders", orders.len());
        Ok(orders)
    }

    pub async fn list_orders_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<Order>, DomainError> {
        let orders = self.bounded(self.repo.find_by_status(status)).await?;
        log::debug!("Found {} orders with status {}", orders.len(), status);
        Ok(orders)
    }

    pub async fn list_orders_by_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Order>, DomainError> {
        let orders = self.bounded(self.repo.find_by_customer(customer_id)).await?;
        log::debug!("Found {} orders for customer {}", orders.len(), customer_id);
        Ok(orders)
    }

    /// Remove the order record and its items. Inventory is not told: a
    /// deletion does not reverse notifications already sent.
    pub async fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        log::warn!("Deleting order {}", id);
        self.bounded(self.repo.delete_by_id(id)).await?;
        log::info!("Order {} deleted", id);
        Ok(())
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        tokio::time::timeout(self.timeouts.repository, call)
            .await
            .map_err(|_| {
                DomainError::Persistence(format!(
                    "repository call timed out after {} ms",
                    self.timeouts.repository.as_millis()
                ))
            })?
    }
}
