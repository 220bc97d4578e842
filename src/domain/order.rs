use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use super::errors::ValidationError;
use super::status::{Fulfillment, OrderStatus};

/// Widest value the store accepts for identifiers, names and email.
pub const MAX_TEXT_LEN: usize = 255;
pub const MAX_PHONE_LEN: usize = 50;

/// Current time at the precision the store keeps (microseconds), so a value
/// handed back at creation matches every later read.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[derive(Debug, Clone)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub price: BigDecimal,
}

/// A decoded order-creation request, not yet checked against the aggregate
/// invariants.
#[derive(Debug, Clone)]
pub struct OrderCreateRequest {
    pub customer_id: String,
    pub customer_email: String,
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub phone_number: Option<String>,
    pub billing_address: Option<String>,
    pub store_id: String,
    pub total_item_cost: BigDecimal,
    pub is_delivery: bool,
    pub is_collection: bool,
    pub delivery_fee: Option<BigDecimal>,
    pub delivery_address: Option<String>,
    pub total_cost: BigDecimal,
    pub status: Option<OrderStatus>,
    pub customer_lat: f64,
    pub customer_lng: f64,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: String,
    /// Snapshot of the product name when the order was placed.
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: String,
    pub customer_email: String,
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub phone_number: Option<String>,
    pub billing_address: Option<String>,
    pub store_id: String,
    pub total_item_cost: BigDecimal,
    pub is_delivery: bool,
    pub is_collection: bool,
    pub delivery_fee: Option<BigDecimal>,
    pub delivery_address: Option<String>,
    pub total_cost: BigDecimal,
    pub status: OrderStatus,
    pub customer_lat: f64,
    pub customer_lng: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Build a new aggregate from `request`, assigning fresh identifiers and
    /// stamping both timestamps with `now`.
    ///
    /// Every violated invariant is reported in the returned
    /// [`ValidationError`], not only the first one.
    pub fn create(request: OrderCreateRequest, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        validate(&request)?;

        let id = Uuid::new_v4();
        let items = request
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: Uuid::new_v4(),
                order_id: id,
                product_id: item.product_id.trim().to_string(),
                product_name: item.product_name.trim().to_string(),
                quantity: item.quantity,
                unit_price: item.price,
            })
            .collect();

        Ok(Order {
            id,
            customer_id: request.customer_id.trim().to_string(),
            customer_email: request.customer_email.trim().to_string(),
            forename: non_blank(request.forename),
            surname: non_blank(request.surname),
            phone_number: non_blank(request.phone_number),
            billing_address: non_blank(request.billing_address),
            store_id: request.store_id.trim().to_string(),
            total_item_cost: request.total_item_cost,
            is_delivery: request.is_delivery,
            is_collection: request.is_collection,
            delivery_fee: request.delivery_fee,
            delivery_address: non_blank(request.delivery_address),
            total_cost: request.total_cost,
            status: request.status.unwrap_or(OrderStatus::Submitted),
            customer_lat: request.customer_lat,
            customer_lng: request.customer_lng,
            created_at: now,
            updated_at: now,
            items,
        })
    }

    pub fn fulfillment(&self) -> Fulfillment {
        fulfillment_of(self.is_delivery, self.is_collection)
    }

    /// Record a status change at `at`. `updated_at` never moves backwards.
    pub fn apply_status(&mut self, status: OrderStatus, at: DateTime<Utc>) {
        self.status = status;
        if at > self.updated_at {
            self.updated_at = at;
        }
    }
}

fn fulfillment_of(is_delivery: bool, is_collection: bool) -> Fulfillment {
    if is_delivery {
        Fulfillment::Delivery
    } else if is_collection {
        Fulfillment::Collection
    } else {
        Fulfillment::Unspecified
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !is_blank(v))
}

impl OrderCreateRequest {
    /// Check every aggregate invariant without building the order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self)
    }
}

fn check_length(err: &mut ValidationError, field: impl Into<String>, value: &str, max: usize) {
    if value.trim().chars().count() > max {
        err.push(field, format!("must be at most {max} characters"));
    }
}

fn validate(request: &OrderCreateRequest) -> Result<(), ValidationError> {
    let mut err = ValidationError::default();
    let zero = BigDecimal::zero();

    if is_blank(&request.customer_id) {
        err.push("customer_id", "must not be blank");
    }
    if is_blank(&request.customer_email) {
        err.push("customer_email", "must not be blank");
    } else if !request.customer_email.contains('@') {
        err.push("customer_email", "must be an email address");
    }
    if is_blank(&request.store_id) {
        err.push("store_id", "must not be blank");
    }
    check_length(&mut err, "customer_id", &request.customer_id, MAX_TEXT_LEN);
    check_length(&mut err, "customer_email", &request.customer_email, MAX_TEXT_LEN);
    check_length(&mut err, "store_id", &request.store_id, MAX_TEXT_LEN);
    for (field, value) in [("forename", &request.forename), ("surname", &request.surname)] {
        if let Some(value) = value {
            check_length(&mut err, field, value, MAX_TEXT_LEN);
        }
    }
    if let Some(phone) = &request.phone_number {
        check_length(&mut err, "phone_number", phone, MAX_PHONE_LEN);
    }

    if request.is_delivery && request.is_collection {
        err.push("is_collection", "an order cannot be both delivery and collection");
    }
    if request.is_delivery {
        match &request.delivery_fee {
            None => err.push("delivery_fee", "required for delivery orders"),
            Some(fee) if *fee < zero => err.push("delivery_fee", "must not be negative"),
            Some(_) => {}
        }
    } else {
        if request.delivery_fee.is_some() {
            err.push("delivery_fee", "only allowed on delivery orders");
        }
        if has_text(&request.delivery_address) {
            err.push("delivery_address", "only allowed on delivery orders");
        }
    }

    if request.total_item_cost < zero {
        err.push("total_item_cost", "must not be negative");
    }
    if request.total_cost < request.total_item_cost {
        err.push("total_cost", "must be at least total_item_cost");
    }

    if request.items.is_empty() {
        err.push("items", "an order needs at least one item");
    }
    let mut item_sum = BigDecimal::zero();
    for (i, item) in request.items.iter().enumerate() {
        if is_blank(&item.product_id) {
            err.push(format!("items[{i}].product_id"), "must not be blank");
        }
        if is_blank(&item.product_name) {
            err.push(format!("items[{i}].product_name"), "must not be blank");
        }
        check_length(&mut err, format!("items[{i}].product_id"), &item.product_id, MAX_TEXT_LEN);
        check_length(
            &mut err,
            format!("items[{i}].product_name"),
            &item.product_name,
            MAX_TEXT_LEN,
        );
        if item.quantity <= 0 {
            err.push(format!("items[{i}].quantity"), "must be greater than zero");
        }
        if item.price < zero {
            err.push(format!("items[{i}].price"), "must not be negative");
        }
        item_sum = item_sum + item.price.clone() * BigDecimal::from(item.quantity);
    }
    if !request.items.is_empty() && item_sum != request.total_item_cost {
        err.push(
            "total_item_cost",
            format!("must equal the sum of item prices ({item_sum})"),
        );
    }

    if !request.customer_lat.is_finite() || !(-90.0..=90.0).contains(&request.customer_lat) {
        err.push("customer_lat", "must be between -90 and 90");
    }
    if !request.customer_lng.is_finite() || !(-180.0..=180.0).contains(&request.customer_lng) {
        err.push("customer_lng", "must be between -180 and 180");
    }

    if let Some(status) = request.status {
        let mode = fulfillment_of(request.is_delivery, request.is_collection);
        if status.is_terminal() {
            err.push("status", format!("{status} is not allowed when creating an order"));
        } else if !status.is_reachable_for(mode) {
            err.push("status", format!("{status} does not apply to this fulfillment mode"));
        }
    }

    err.into_result()
}
