use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::{CreatedOrder, OrderService, OutstandingNotification};
use crate::domain::errors::{DomainError, ValidationError};
use crate::domain::order::{Order, OrderCreateRequest, OrderItem, OrderItemRequest};
use crate::domain::status::OrderStatus;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub customer_email: String,
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub phone_number: Option<String>,
    pub billing_address: Option<String>,
    pub store_id: String,
    /// Decimal, e.g. "13.00"
    pub total_item_cost: String,
    #[serde(default)]
    pub is_delivery: bool,
    #[serde(default)]
    pub is_collection: bool,
    /// Decimal; required when `is_delivery` is true
    pub delivery_fee: Option<String>,
    pub delivery_address: Option<String>,
    /// Decimal, at least `total_item_cost`
    pub total_cost: String,
    /// Initial status; defaults to SUBMITTED
    pub status: Option<String>,
    pub customer_lat: f64,
    pub customer_lng: f64,
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: String,
    pub customer_email: String,
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub phone_number: Option<String>,
    pub billing_address: Option<String>,
    pub store_id: String,
    pub total_item_cost: String,
    pub is_delivery: bool,
    pub is_collection: bool,
    pub delivery_fee: Option<String>,
    pub delivery_address: Option<String>,
    pub total_cost: String,
    pub status: String,
    pub customer_lat: f64,
    pub customer_lng: f64,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OutstandingNotificationResponse {
    pub item_id: Uuid,
    pub product_id: String,
    pub quantity: i32,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order: OrderResponse,
    /// Items whose inventory notification could not be sent. The order is
    /// stored regardless.
    pub outstanding_notifications: Vec<OutstandingNotificationResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusParams {
    pub status: String,
}

// ── Conversions ──────────────────────────────────────────────────────────────

fn parse_decimal(field: String, value: &str, err: &mut ValidationError) -> BigDecimal {
    match BigDecimal::from_str(value.trim()) {
        Ok(d) => d,
        Err(_) => {
            err.push(field, format!("'{value}' is not a decimal number"));
            BigDecimal::default()
        }
    }
}

fn parse_status(value: &str) -> Result<OrderStatus, ValidationError> {
    OrderStatus::from_str(value).map_err(|e| ValidationError::single("status", e.to_string()))
}

impl CreateOrderRequest {
    /// Decode string-typed fields.
    ///
    /// When a field cannot be decoded the remaining rules are still checked,
    /// so one response lists every problem with the request.
    pub fn into_domain(self) -> Result<OrderCreateRequest, ValidationError> {
        let mut err = ValidationError::default();

        let total_item_cost =
            parse_decimal("total_item_cost".to_string(), &self.total_item_cost, &mut err);
        let total_cost = parse_decimal("total_cost".to_string(), &self.total_cost, &mut err);
        let delivery_fee = self
            .delivery_fee
            .as_deref()
            .map(|fee| parse_decimal("delivery_fee".to_string(), fee, &mut err));
        let status = match self.status.as_deref() {
            Some(s) => match OrderStatus::from_str(s) {
                Ok(status) => Some(status),
                Err(e) => {
                    err.push("status", e.to_string());
                    None
                }
            },
            None => None,
        };
        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| OrderItemRequest {
                price: parse_decimal(format!("items[{i}].price"), &item.price, &mut err),
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
            })
            .collect();

        let request = OrderCreateRequest {
            customer_id: self.customer_id,
            customer_email: self.customer_email,
            forename: self.forename,
            surname: self.surname,
            phone_number: self.phone_number,
            billing_address: self.billing_address,
            store_id: self.store_id,
            total_item_cost,
            is_delivery: self.is_delivery,
            is_collection: self.is_collection,
            delivery_fee,
            delivery_address: self.delivery_address,
            total_cost,
            status,
            customer_lat: self.customer_lat,
            customer_lng: self.customer_lng,
            items,
        };

        if err.is_empty() {
            return Ok(request);
        }
        let mut merged = err.clone();
        if let Err(domain) = request.validate() {
            merged.violations.extend(
                domain
                    .violations
                    .into_iter()
                    .filter(|v| !masked_by_decode_failure(&err, &v.field)),
            );
        }
        Err(merged)
    }
}

/// Whether a rule on `field` was evaluated against a placeholder for a value
/// that failed to decode.
fn masked_by_decode_failure(decode: &ValidationError, field: &str) -> bool {
    let price_failed = decode
        .violations
        .iter()
        .any(|v| v.field.starts_with("items[") && v.field.ends_with(".price"));
    decode.has_field(field)
        || (field == "total_item_cost" && price_failed)
        || (field == "total_cost" && decode.has_field("total_item_cost"))
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        OrderItemResponse {
            id: i.id,
            product_id: i.product_id,
            product_name: i.product_name,
            quantity: i.quantity,
            unit_price: i.unit_price.to_string(),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            customer_id: o.customer_id,
            customer_email: o.customer_email,
            forename: o.forename,
            surname: o.surname,
            phone_number: o.phone_number,
            billing_address: o.billing_address,
            store_id: o.store_id,
            total_item_cost: o.total_item_cost.to_string(),
            is_delivery: o.is_delivery,
            is_collection: o.is_collection,
            delivery_fee: o.delivery_fee.map(|f| f.to_string()),
            delivery_address: o.delivery_address,
            total_cost: o.total_cost.to_string(),
            status: o.status.to_string(),
            customer_lat: o.customer_lat,
            customer_lng: o.customer_lng,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
            items: o.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

impl From<OutstandingNotification> for OutstandingNotificationResponse {
    fn from(n: OutstandingNotification) -> Self {
        OutstandingNotificationResponse {
            item_id: n.item_id,
            product_id: n.product_id,
            quantity: n.quantity,
            reason: n.reason.to_string(),
        }
    }
}

impl From<CreatedOrder> for CreateOrderResponse {
    fn from(c: CreatedOrder) -> Self {
        CreateOrderResponse {
            order: c.order.into(),
            outstanding_notifications: c
                .outstanding_notifications
                .into_iter()
                .map(OutstandingNotificationResponse::from)
                .collect(),
        }
    }
}

fn order_list(orders: Vec<Order>) -> Vec<OrderResponse> {
    orders.into_iter().map(OrderResponse::from).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates a new order together with its items, then notifies inventory once
/// per item. Notifications that fail are listed in
/// `outstanding_notifications`; the order is stored either way.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Invalid order request"),
        (status = 503, description = "Order could not be stored"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().into_domain().map_err(DomainError::from)?;
    let created = service.create_order(request).await?;
    Ok(HttpResponse::Created().json(CreateOrderResponse::from(created)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = service.get_order(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Returns every order, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders", body = [OrderResponse]),
    ),
    tag = "orders"
)]
pub async fn list_orders(service: web::Data<OrderService>) -> Result<HttpResponse, AppError> {
    let orders = service.list_orders().await?;
    Ok(HttpResponse::Ok().json(order_list(orders)))
}

#[utoipa::path(
    get,
    path = "/orders/status/{status}",
    params(
        ("status" = String, Path, description = "Status name, e.g. PREPARING"),
    ),
    responses(
        (status = 200, description = "Orders in the given status", body = [OrderResponse]),
        (status = 400, description = "Unknown status"),
    ),
    tag = "orders"
)]
pub async fn list_orders_by_status(
    service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let status = parse_status(&path.into_inner()).map_err(DomainError::from)?;
    let orders = service.list_orders_by_status(status).await?;
    Ok(HttpResponse::Ok().json(order_list(orders)))
}

#[utoipa::path(
    get,
    path = "/orders/customer/{customer_id}",
    params(
        ("customer_id" = String, Path, description = "Customer identifier"),
    ),
    responses(
        (status = 200, description = "Orders placed by the customer", body = [OrderResponse]),
    ),
    tag = "orders"
)]
pub async fn list_orders_by_customer(
    service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let orders = service.list_orders_by_customer(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order_list(orders)))
}

/// PATCH /orders/{id}/status?status=...
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("status" = String, Query, description = "Requested status"),
    ),
    responses(
        (status = 200, description = "Status changed", body = OrderResponse),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed from the current status"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
    query: web::Query<UpdateStatusParams>,
) -> Result<HttpResponse, AppError> {
    let status = parse_status(&query.status).map_err(DomainError::from)?;
    let order = service.update_status(path.into_inner(), status).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /orders/{id}
///
/// Removes the order record and its items. No inventory event is sent.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    service.delete_order(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
