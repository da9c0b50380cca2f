use thiserror::Error;

use super::order::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Customer has no active cart")]
    NoActiveCart,
    #[error("Order in status '{0}' can no longer be cancelled")]
    CancelNotAllowed(OrderStatus),
    #[error("Internal error: {0}")]
    Internal(String),
}
