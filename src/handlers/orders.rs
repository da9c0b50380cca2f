use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CustomerId;
use crate::context;
use crate::domain::order::Order;
use crate::errors::AppError;
use crate::validation::{validate_cancel, validate_create_from_cart, validate_update_status};
use crate::AppService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Shipping address UUID; omit for pickup orders.
    #[serde(rename = "direccionEnvioId")]
    pub shipping_address_id: Option<String>,
    /// One of `efectivo`, `tarjeta`, `transferencia`, `pse`.
    #[serde(rename = "metodoPago")]
    pub payment_method: Option<String>,
    #[serde(rename = "referenciaPago")]
    pub payment_reference: Option<String>,
    #[serde(rename = "notas")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// Target status; one of `pendiente`, `confirmada`, `en_proceso`,
    /// `enviada`, `entregada`, `cancelada`, `reembolsada`.
    #[serde(rename = "estado")]
    pub status: Option<String>,
    #[serde(rename = "notas")]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    #[serde(rename = "productoId")]
    pub product_id: Uuid,
    #[serde(rename = "cantidad")]
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    #[serde(rename = "precioUnitario")]
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLinks {
    /// Absolute URL of this order when the request's base URL is known.
    #[serde(rename = "self")]
    pub self_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    #[serde(rename = "clienteId")]
    pub customer_id: Uuid,
    #[serde(rename = "direccionEnvioId")]
    pub shipping_address_id: Option<Uuid>,
    #[serde(rename = "metodoPago")]
    pub payment_method: Option<String>,
    #[serde(rename = "referenciaPago")]
    pub payment_reference: Option<String>,
    #[serde(rename = "notas")]
    pub notes: Option<String>,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "motivoCancelacion")]
    pub cancellation_reason: Option<String>,
    pub items: Vec<OrderItemResponse>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    pub links: OrderLinks,
}

impl OrderResponse {
    /// Build the wire representation, resolving `links.self` against the
    /// current request's base URL (best-effort; `null` when unknown).
    fn from_order(order: Order) -> Self {
        let self_url = context::base_url().map(|base| format!("{base}/orders/{}", order.id));
        Self {
            id: order.id,
            customer_id: order.customer_id,
            shipping_address_id: order.shipping_address_id,
            payment_method: order.payment_method.map(|m| m.as_str().to_owned()),
            payment_reference: order.payment_reference,
            notes: order.notes,
            status: order.status.as_str().to_owned(),
            cancellation_reason: order.cancellation_reason,
            items: order
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price: i.unit_price.to_string(),
                })
                .collect(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            links: OrderLinks { self_url },
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates an order from the customer's active cart. The cart is consumed;
/// the order starts in `pendiente`.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created from the active cart", body = OrderResponse),
        (status = 400, description = "Validation failed or customer header missing"),
        (status = 409, description = "Customer has no active cart"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<AppService>,
    customer: CustomerId,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let input = validate_create_from_cart(&body)?;
    let order = service.create_order_from_cart(customer.0, input)?;
    Ok(HttpResponse::Created().json(OrderResponse::from_order(order)))
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
    service: web::Data<AppService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = service.get_order(path.into_inner())?;
    match order {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from_order(order))),
        None => Err(AppError::NotFound),
    }
}

/// GET /orders
///
/// Paginated list of orders, newest first. Use `page` (1-based) and `limit`.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<AppService>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = service.list_orders(page, limit)?;
    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result
            .items
            .into_iter()
            .map(OrderResponse::from_order)
            .collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// POST /orders/{id}/cancel
///
/// Customer cancellation; allowed until the order reaches a terminal status.
#[utoipa::path(
    post,
    path = "/orders/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = CancelOrderRequest,
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already in a terminal status"),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    service: web::Data<AppService>,
    path: web::Path<Uuid>,
    body: web::Json<CancelOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let input = validate_cancel(&body)?;
    let order = service.cancel_order(path.into_inner(), input)?;
    Ok(HttpResponse::Ok().json(OrderResponse::from_order(order)))
}

/// PUT /orders/{id}/status
///
/// Administrative status update. Accepts any of the seven statuses as the
/// target; no transition table is enforced on this path.
#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    service: web::Data<AppService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let input = validate_update_status(&body)?;
    let order = service.update_status(path.into_inner(), input)?;
    Ok(HttpResponse::Ok().json(OrderResponse::from_order(order)))
}
