use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::InvalidTransition;

/// How an order reaches the customer. Derived from the order's delivery and
/// collection flags; decides which branch of the lifecycle is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fulfillment {
    Delivery,
    Collection,
    /// Neither flag set. Only the common and cancellation paths apply.
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Submitted,
    Preparing,
    ReadyForCollection,
    OutForDelivery,
    Delivered,
    Collected,
    Complete,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Submitted,
        OrderStatus::Preparing,
        OrderStatus::ReadyForCollection,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Collected,
        OrderStatus::Complete,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Submitted => "SUBMITTED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::ReadyForCollection => "READY_FOR_COLLECTION",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Collected => "COLLECTED",
            OrderStatus::Complete => "COMPLETE",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Complete | OrderStatus::Cancelled)
    }

    /// Destinations reachable in one step from `self` for the given mode.
    pub fn allowed_next(&self, fulfillment: Fulfillment) -> Vec<OrderStatus> {
        use OrderStatus::*;

        match self {
            Submitted => vec![Preparing, Cancelled],
            Preparing => {
                let mut next = Vec::with_capacity(2);
                match fulfillment {
                    Fulfillment::Collection => next.push(ReadyForCollection),
                    Fulfillment::Delivery => next.push(OutForDelivery),
                    Fulfillment::Unspecified => {}
                }
                next.push(Cancelled);
                next
            }
            ReadyForCollection => vec![Collected, Cancelled],
            OutForDelivery => vec![Delivered, Cancelled],
            Collected | Delivered => vec![Complete],
            Complete | Cancelled => vec![],
        }
    }

    /// Whether an order in this mode can ever be in this status. Used to vet
    /// an explicit status supplied at creation.
    pub fn is_reachable_for(&self, fulfillment: Fulfillment) -> bool {
        match self {
            OrderStatus::ReadyForCollection | OrderStatus::Collected => {
                fulfillment == Fulfillment::Collection
            }
            OrderStatus::OutForDelivery | OrderStatus::Delivered => {
                fulfillment == Fulfillment::Delivery
            }
            OrderStatus::Complete => fulfillment != Fulfillment::Unspecified,
            OrderStatus::Submitted | OrderStatus::Preparing | OrderStatus::Cancelled => true,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Validate a requested status change for `order_id`.
///
/// Pure: no I/O, no state. Returns the new status when the change is listed in
/// the lifecycle table for this fulfillment mode, otherwise an
/// [`InvalidTransition`] naming both states.
pub fn transition(
    order_id: Uuid,
    current: OrderStatus,
    requested: OrderStatus,
    fulfillment: Fulfillment,
) -> Result<OrderStatus, InvalidTransition> {
    if current.allowed_next(fulfillment).contains(&requested) {
        Ok(requested)
    } else {
        Err(InvalidTransition {
            order_id,
            from: current,
            to: requested,
        })
    }
}
