use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem};
use crate::domain::status::OrderStatus;
use crate::schema::{order_items, orders};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
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
    pub status: String,
    pub customer_lat: f64,
    pub customer_lng: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Queryable, Selectable, Identifiable, Associations, Insertable,
)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    /// Index of the item within its order, as requested.
    pub position: i32,
}

impl From<&Order> for OrderRow {
    fn from(o: &Order) -> Self {
        OrderRow {
            id: o.id,
            customer_id: o.customer_id.clone(),
            customer_email: o.customer_email.clone(),
            forename: o.forename.clone(),
            surname: o.surname.clone(),
            phone_number: o.phone_number.clone(),
            billing_address: o.billing_address.clone(),
            store_id: o.store_id.clone(),
            total_item_cost: o.total_item_cost.clone(),
            is_delivery: o.is_delivery,
            is_collection: o.is_collection,
            delivery_fee: o.delivery_fee.clone(),
            delivery_address: o.delivery_address.clone(),
            total_cost: o.total_cost.clone(),
            status: o.status.as_str().to_string(),
            customer_lat: o.customer_lat,
            customer_lng: o.customer_lng,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

impl OrderItemRow {
    fn from_item(i: &OrderItem, position: i32) -> Self {
        OrderItemRow {
            id: i.id,
            order_id: i.order_id,
            product_id: i.product_id.clone(),
            product_name: i.product_name.clone(),
            quantity: i.quantity,
            unit_price: i.unit_price.clone(),
            position,
        }
    }

    /// Item rows of `order`, numbered in the order's item order.
    pub fn for_order(order: &Order) -> Result<Vec<OrderItemRow>, DomainError> {
        order
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let position = i32::try_from(index).map_err(|_| {
                    DomainError::Persistence(format!("order {} has too many items", order.id))
                })?;
                Ok(OrderItemRow::from_item(item, position))
            })
            .collect()
    }
}

impl OrderRow {
    /// Reassemble the aggregate from its order row and item rows.
    pub fn into_order(self, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
        let status = self.status.parse::<OrderStatus>().map_err(|e| {
            DomainError::Persistence(format!("order {} has a corrupt status: {}", self.id, e))
        })?;

        Ok(Order {
            id: self.id,
            customer_id: self.customer_id,
            customer_email: self.customer_email,
            forename: self.forename,
            surname: self.surname,
            phone_number: self.phone_number,
            billing_address: self.billing_address,
            store_id: self.store_id,
            total_item_cost: self.total_item_cost,
            is_delivery: self.is_delivery,
            is_collection: self.is_collection,
            delivery_fee: self.delivery_fee,
            delivery_address: self.delivery_address,
            total_cost: self.total_cost,
            status,
            customer_lat: self.customer_lat,
            customer_lng: self.customer_lng,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items: items
                .into_iter()
                .map(|i| OrderItem {
                    id: i.id,
                    order_id: i.order_id,
                    product_id: i.product_id,
                    product_name: i.product_name,
                    quantity: i.quantity,
                    unit_price: i.unit_price,
                })
                .collect(),
        })
    }
}
