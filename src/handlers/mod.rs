pub mod orders;

use actix_web::web;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::list_orders,
        orders::list_orders_by_status,
        orders::list_orders_by_customer,
        orders::get_order,
        orders::update_order_status,
        orders::delete_order,
    ),
    components(schemas(
        orders::CreateOrderRequest,
        orders::CreateOrderItemRequest,
        orders::CreateOrderResponse,
        orders::OrderResponse,
        orders::OrderItemResponse,
        orders::OutstandingNotificationResponse,
    )),
    tags((name = "orders", description = "Order lifecycle"))
)]
pub struct ApiDoc;

/// Register the `/orders` routes. Literal segments come before `/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(orders::create_order))
            .route("", web::get().to(orders::list_orders))
            .route(
                "/status/{status}",
                web::get().to(orders::list_orders_by_status),
            )
            .route(
                "/customer/{customer_id}",
                web::get().to(orders::list_orders_by_customer),
            )
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}", web::delete().to(orders::delete_order))
            .route("/{id}/status", web::patch().to(orders::update_order_status)),
    );
}
