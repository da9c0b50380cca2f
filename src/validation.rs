//! Field validation for the order-affecting requests.
//!
//! Each validator walks the raw request record rule by rule, collecting one
//! violation per offending field instead of stopping at the first, and
//! produces a typed input carrying the accepted values. Trimming is the only
//! transformation and is applied to the value that is kept, not just for the
//! length check. Validators are pure; calling one twice with the same input
//! yields the same outcome.

use bigdecimal::BigDecimal;
use serde::Serialize;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::CartItem;
use crate::domain::order::{OrderStatus, PaymentMethod};
use crate::handlers::cart::AddCartItemRequest;
use crate::handlers::orders::{CancelOrderRequest, CreateOrderRequest, UpdateOrderStatusRequest};

pub const MAX_PAYMENT_REFERENCE_LEN: usize = 100;
pub const MAX_NOTES_LEN: usize = 500;
pub const MAX_CANCEL_REASON_LEN: usize = 200;

/// One violated field rule, reported under the field's wire name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Default)]
struct Violations(Vec<Violation>);

impl Violations {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(Violation {
            field: field.to_owned(),
            message: message.into(),
        });
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ── Field rules ──────────────────────────────────────────────────────────────

/// Optional free text: trimmed, at most `max` characters.
fn optional_text(
    errors: &mut Violations,
    field: &str,
    raw: Option<&str>,
    max: usize,
) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.chars().count() > max {
        errors.push(field, format!("must be at most {max} characters"));
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn optional_uuid(errors: &mut Violations, field: &str, raw: Option<&str>) -> Option<Uuid> {
    let raw = raw?.trim();
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(field, "must be a valid UUID");
            None
        }
    }
}

fn required_uuid(errors: &mut Violations, field: &str, raw: Option<&str>) -> Option<Uuid> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(field, "must be a valid UUID");
                None
            }
        },
        None => {
            errors.push(field, "is required");
            None
        }
    }
}

fn optional_payment_method(
    errors: &mut Violations,
    field: &str,
    raw: Option<&str>,
) -> Option<PaymentMethod> {
    let raw = raw?.trim();
    match PaymentMethod::parse(raw) {
        Some(method) => Some(method),
        None => {
            errors.push(
                field,
                format!("must be one of: {}", wire_names(&PaymentMethod::ALL.map(|m| m.as_str()))),
            );
            None
        }
    }
}

fn required_status(errors: &mut Violations, field: &str, raw: Option<&str>) -> Option<OrderStatus> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match OrderStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                errors.push(
                    field,
                    format!("must be one of: {}", wire_names(&OrderStatus::ALL.map(|s| s.as_str()))),
                );
                None
            }
        },
        None => {
            errors.push(field, "is required");
            None
        }
    }
}

fn wire_names(names: &[&str]) -> String {
    names.join(", ")
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Accepted input for creating an order from the customer's active cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrderInput {
    pub shipping_address_id: Option<Uuid>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

pub fn validate_create_from_cart(
    raw: &CreateOrderRequest,
) -> Result<CreateOrderInput, Vec<Violation>> {
    let mut errors = Violations::default();

    let shipping_address_id =
        optional_uuid(&mut errors, "direccionEnvioId", raw.shipping_address_id.as_deref());
    let payment_method =
        optional_payment_method(&mut errors, "metodoPago", raw.payment_method.as_deref());
    let payment_reference = optional_text(
        &mut errors,
        "referenciaPago",
        raw.payment_reference.as_deref(),
        MAX_PAYMENT_REFERENCE_LEN,
    );
    let notes = optional_text(&mut errors, "notas", raw.notes.as_deref(), MAX_NOTES_LEN);

    if errors.is_empty() {
        Ok(CreateOrderInput {
            shipping_address_id,
            payment_method,
            payment_reference,
            notes,
        })
    } else {
        Err(errors.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelInput {
    pub reason: Option<String>,
}

pub fn validate_cancel(raw: &CancelOrderRequest) -> Result<CancelInput, Vec<Violation>> {
    let mut errors = Violations::default();

    let reason = optional_text(&mut errors, "reason", raw.reason.as_deref(), MAX_CANCEL_REASON_LEN);

    if errors.is_empty() {
        Ok(CancelInput { reason })
    } else {
        Err(errors.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatusInput {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

/// The admin path accepts any of the seven statuses as a target; which
/// transitions are legal is the order service's call, not this layer's.
pub fn validate_update_status(
    raw: &UpdateOrderStatusRequest,
) -> Result<UpdateStatusInput, Vec<Violation>> {
    let mut errors = Violations::default();

    let status = required_status(&mut errors, "estado", raw.status.as_deref());
    let notes = optional_text(&mut errors, "notas", raw.notes.as_deref(), MAX_NOTES_LEN);

    match (status, errors.is_empty()) {
        (Some(status), true) => Ok(UpdateStatusInput { status, notes }),
        _ => Err(errors.0),
    }
}

pub fn validate_add_cart_item(raw: &AddCartItemRequest) -> Result<CartItem, Vec<Violation>> {
    let mut errors = Violations::default();

    let product_id = required_uuid(&mut errors, "productoId", raw.product_id.as_deref());

    let quantity = match raw.quantity {
        Some(q) if q >= 1 => Some(q),
        Some(_) => {
            errors.push("cantidad", "must be at least 1");
            None
        }
        None => {
            errors.push("cantidad", "is required");
            None
        }
    };

    let unit_price = match raw.unit_price.as_deref().map(str::trim) {
        Some(raw_price) if !raw_price.is_empty() => match BigDecimal::from_str(raw_price) {
            Ok(price) => Some(price),
            Err(_) => {
                errors.push("precioUnitario", "must be a decimal number, e.g. \"9.99\"");
                None
            }
        },
        _ => {
            errors.push("precioUnitario", "is required");
            None
        }
    };

    match (product_id, quantity, unit_price) {
        (Some(product_id), Some(quantity), Some(unit_price)) => Ok(CartItem {
            product_id,
            quantity,
            unit_price,
        }),
        _ => Err(errors.0),
    }
}
