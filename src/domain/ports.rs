use uuid::Uuid;

use super::cart::{Cart, CartItem};
use super::errors::DomainError;
use super::order::{ListResult, Order};

pub trait OrderRepository: Send + Sync + 'static {
    fn insert(&self, order: Order) -> Result<(), DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn update(&self, order: Order) -> Result<(), DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    /// Add an item to the customer's active cart, creating the cart if the
    /// customer has none.
    fn add_item(&self, customer_id: Uuid, item: CartItem) -> Result<Cart, DomainError>;
    fn find_active(&self, customer_id: Uuid) -> Result<Option<Cart>, DomainError>;
    /// Remove and return the customer's active cart.
    fn take_active(&self, customer_id: Uuid) -> Result<Option<Cart>, DomainError>;
}
