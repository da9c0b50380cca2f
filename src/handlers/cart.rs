use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CustomerId;
use crate::domain::cart::Cart;
use crate::errors::AppError;
use crate::validation::validate_add_cart_item;
use crate::AppService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    #[serde(rename = "productoId")]
    pub product_id: Option<String>,
    #[serde(rename = "cantidad")]
    pub quantity: Option<i32>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    #[serde(rename = "precioUnitario")]
    pub unit_price: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    #[serde(rename = "productoId")]
    pub product_id: Uuid,
    #[serde(rename = "cantidad")]
    pub quantity: i32,
    #[serde(rename = "precioUnitario")]
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub id: Option<Uuid>,
    #[serde(rename = "clienteId")]
    pub customer_id: Uuid,
    pub items: Vec<CartItemResponse>,
}

impl CartResponse {
    fn from_cart(cart: Cart) -> Self {
        Self {
            id: Some(cart.id),
            customer_id: cart.customer_id,
            items: cart
                .items
                .into_iter()
                .map(|i| CartItemResponse {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price: i.unit_price.to_string(),
                })
                .collect(),
        }
    }

    fn empty(customer_id: Uuid) -> Self {
        Self {
            id: None,
            customer_id,
            items: Vec::new(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /cart/items
///
/// Adds an item to the customer's active cart, creating the cart when needed.
/// Adding the same product again accumulates the quantity.
#[utoipa::path(
    post,
    path = "/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Item added to the cart", body = CartResponse),
        (status = 400, description = "Validation failed or customer header missing"),
    ),
    tag = "cart"
)]
pub async fn add_cart_item(
    service: web::Data<AppService>,
    customer: CustomerId,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let item = validate_add_cart_item(&body)?;
    let cart = service.add_to_cart(customer.0, item)?;
    Ok(HttpResponse::Created().json(CartResponse::from_cart(cart)))
}

/// GET /cart
///
/// Returns the customer's active cart; an empty cart when none is open.
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Active cart", body = CartResponse),
        (status = 400, description = "Customer header missing"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    service: web::Data<AppService>,
    customer: CustomerId,
) -> Result<HttpResponse, AppError> {
    let cart = service.get_cart(customer.0)?;
    let response = match cart {
        Some(cart) => CartResponse::from_cart(cart),
        None => CartResponse::empty(customer.0),
    };
    Ok(HttpResponse::Ok().json(response))
}
