//! In-memory repository implementations.
//!
//! The service keeps its working set in process memory behind the domain
//! ports; swapping in a database-backed implementation only touches this
//! module.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, Order};
use crate::domain::ports::{CartRepository, OrderRepository};

// A poisoned lock only means a writer panicked mid-update; recover the guard
// rather than propagating the panic.
fn read_guard<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_guard<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn insert(&self, order: Order) -> Result<(), DomainError> {
        write_guard(&self.orders).insert(order.id, order);
        Ok(())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(read_guard(&self.orders).get(&id).cloned())
    }

    fn update(&self, order: Order) -> Result<(), DomainError> {
        let mut orders = write_guard(&self.orders);
        if !orders.contains_key(&order.id) {
            return Err(DomainError::NotFound);
        }
        orders.insert(order.id, order);
        Ok(())
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let orders = read_guard(&self.orders);
        let total = orders.len() as i64;

        let mut items: Vec<Order> = orders.values().cloned().collect();
        // Newest first, id as tie-breaker so pagination is stable.
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let offset = ((page - 1) * limit).max(0) as usize;
        let items = items
            .into_iter()
            .skip(offset)
            .take(limit.max(0) as usize)
            .collect();

        Ok(ListResult { items, total })
    }
}

#[derive(Default)]
pub struct InMemoryCartRepository {
    carts: RwLock<HashMap<Uuid, Cart>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartRepository for InMemoryCartRepository {
    fn add_item(&self, customer_id: Uuid, item: CartItem) -> Result<Cart, DomainError> {
        let mut carts = write_guard(&self.carts);
        let cart = carts.entry(customer_id).or_insert_with(|| Cart {
            id: Uuid::new_v4(),
            customer_id,
            items: Vec::new(),
            created_at: Utc::now(),
        });

        match cart.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity += item.quantity;
                existing.unit_price = item.unit_price;
            }
            None => cart.items.push(item),
        }

        Ok(cart.clone())
    }

    fn find_active(&self, customer_id: Uuid) -> Result<Option<Cart>, DomainError> {
        Ok(read_guard(&self.carts).get(&customer_id).cloned())
    }

    fn take_active(&self, customer_id: Uuid) -> Result<Option<Cart>, DomainError> {
        Ok(write_guard(&self.carts).remove(&customer_id))
    }
}
