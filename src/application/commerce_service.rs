use chrono::Utc;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, Order, OrderItem, OrderStatus};
use crate::domain::ports::{CartRepository, OrderRepository};
use crate::validation::{CancelInput, CreateOrderInput, UpdateStatusInput};

/// Order and cart operations behind the HTTP layer.
pub struct CommerceService<O, C> {
    orders: O,
    carts: C,
}

impl<O: OrderRepository, C: CartRepository> CommerceService<O, C> {
    pub fn new(orders: O, carts: C) -> Self {
        Self { orders, carts }
    }

    pub fn add_to_cart(&self, customer_id: Uuid, item: CartItem) -> Result<Cart, DomainError> {
        self.carts.add_item(customer_id, item)
    }

    pub fn get_cart(&self, customer_id: Uuid) -> Result<Option<Cart>, DomainError> {
        self.carts.find_active(customer_id)
    }

    /// Create an order from the customer's active cart, consuming the cart.
    /// The order starts in `pendiente` with the cart lines snapshotted.
    pub fn create_order_from_cart(
        &self,
        customer_id: Uuid,
        input: CreateOrderInput,
    ) -> Result<Order, DomainError> {
        let cart = self
            .carts
            .take_active(customer_id)?
            .filter(|c| !c.items.is_empty())
            .ok_or(DomainError::NoActiveCart)?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            customer_id,
            shipping_address_id: input.shipping_address_id,
            payment_method: input.payment_method,
            payment_reference: input.payment_reference,
            notes: input.notes,
            status: OrderStatus::Pending,
            cancellation_reason: None,
            items: cart
                .items
                .into_iter()
                .map(|i| OrderItem {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price: i.unit_price,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };

        self.orders.insert(order.clone())?;
        log::info!("order {} created for customer {}", order.id, customer_id);
        Ok(order)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.orders.find_by_id(id)
    }

    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        self.orders.list(page, limit)
    }

    /// Customer-initiated cancellation. Allowed until the order reaches a
    /// terminal status; the trimmed reason is recorded on the order.
    pub fn cancel_order(&self, id: Uuid, input: CancelInput) -> Result<Order, DomainError> {
        let mut order = self.orders.find_by_id(id)?.ok_or(DomainError::NotFound)?;

        if order.status.is_terminal() {
            return Err(DomainError::CancelNotAllowed(order.status));
        }

        order.status = OrderStatus::Cancelled;
        order.cancellation_reason = input.reason;
        order.updated_at = Utc::now();
        self.orders.update(order.clone())?;
        log::info!("order {} cancelled", order.id);
        Ok(order)
    }

    /// Administrative status update. Any of the seven statuses is accepted as
    /// a target, including moving a delivered order back to `pendiente`; the
    /// admin surface is trusted to pick sensible targets.
    pub fn update_status(&self, id: Uuid, input: UpdateStatusInput) -> Result<Order, DomainError> {
        let mut order = self.orders.find_by_id(id)?.ok_or(DomainError::NotFound)?;

        order.status = input.status;
        if input.notes.is_some() {
            order.notes = input.notes;
        }
        order.updated_at = Utc::now();
        self.orders.update(order.clone())?;
        log::info!("order {} moved to status {}", order.id, order.status);
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::infrastructure::memory::{InMemoryCartRepository, InMemoryOrderRepository};

    fn service() -> CommerceService<InMemoryOrderRepository, InMemoryCartRepository> {
        CommerceService::new(
            InMemoryOrderRepository::new(),
            InMemoryCartRepository::new(),
        )
    }

    fn item(price: &str) -> CartItem {
        CartItem {
            product_id: Uuid::new_v4(),
            quantity: 2,
            unit_price: BigDecimal::from_str(price).expect("valid decimal"),
        }
    }

    fn empty_input() -> CreateOrderInput {
        CreateOrderInput {
            shipping_address_id: None,
            payment_method: None,
            payment_reference: None,
            notes: None,
        }
    }

    #[test]
    fn create_order_snapshots_and_consumes_the_cart() {
        let svc = service();
        let customer_id = Uuid::new_v4();
        let cart_item = item("9.99");
        svc.add_to_cart(customer_id, cart_item.clone()).expect("add failed");

        let order = svc
            .create_order_from_cart(customer_id, empty_input())
            .expect("create failed");

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer_id, customer_id);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id, cart_item.product_id);
        assert_eq!(order.items[0].quantity, 2);

        // The cart is gone; a second order needs a fresh one.
        assert!(svc.get_cart(customer_id).expect("get failed").is_none());
        let again = svc.create_order_from_cart(customer_id, empty_input());
        assert!(matches!(again, Err(DomainError::NoActiveCart)));
    }

    #[test]
    fn create_order_without_cart_is_rejected() {
        let svc = service();
        let result = svc.create_order_from_cart(Uuid::new_v4(), empty_input());
        assert!(matches!(result, Err(DomainError::NoActiveCart)));
    }

    #[test]
    fn cancel_before_delivery_records_the_reason() {
        let svc = service();
        let customer_id = Uuid::new_v4();
        svc.add_to_cart(customer_id, item("4.50")).expect("add failed");
        let order = svc
            .create_order_from_cart(customer_id, empty_input())
            .expect("create failed");

        let cancelled = svc
            .cancel_order(
                order.id,
                CancelInput {
                    reason: Some("changed my mind".to_owned()),
                },
            )
            .expect("cancel failed");

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("changed my mind"));
    }

    #[test]
    fn cancel_after_delivery_is_rejected() {
        let svc = service();
        let customer_id = Uuid::new_v4();
        svc.add_to_cart(customer_id, item("4.50")).expect("add failed");
        let order = svc
            .create_order_from_cart(customer_id, empty_input())
            .expect("create failed");
        svc.update_status(
            order.id,
            UpdateStatusInput {
                status: OrderStatus::Delivered,
                notes: None,
            },
        )
        .expect("update failed");

        let result = svc.cancel_order(order.id, CancelInput { reason: None });
        assert!(matches!(
            result,
            Err(DomainError::CancelNotAllowed(OrderStatus::Delivered))
        ));
    }

    #[test]
    fn cancel_unknown_order_is_not_found() {
        let svc = service();
        let result = svc.cancel_order(Uuid::new_v4(), CancelInput { reason: None });
        assert!(matches!(result, Err(DomainError::NotFound)));
    }

    #[test]
    fn admin_update_accepts_any_target_status() {
        let svc = service();
        let customer_id = Uuid::new_v4();
        svc.add_to_cart(customer_id, item("1.00")).expect("add failed");
        let order = svc
            .create_order_from_cart(customer_id, empty_input())
            .expect("create failed");

        svc.update_status(
            order.id,
            UpdateStatusInput {
                status: OrderStatus::Delivered,
                notes: None,
            },
        )
        .expect("update failed");

        // Delivered back to pending: the admin path has no transition table.
        let reopened = svc
            .update_status(
                order.id,
                UpdateStatusInput {
                    status: OrderStatus::Pending,
                    notes: None,
                },
            )
            .expect("update failed");
        assert_eq!(reopened.status, OrderStatus::Pending);
    }

    #[test]
    fn admin_update_replaces_notes_only_when_provided() {
        let svc = service();
        let customer_id = Uuid::new_v4();
        svc.add_to_cart(customer_id, item("1.00")).expect("add failed");
        let order = svc
            .create_order_from_cart(
                customer_id,
                CreateOrderInput {
                    notes: Some("original".to_owned()),
                    ..empty_input()
                },
            )
            .expect("create failed");

        let updated = svc
            .update_status(
                order.id,
                UpdateStatusInput {
                    status: OrderStatus::Confirmed,
                    notes: None,
                },
            )
            .expect("update failed");
        assert_eq!(updated.notes.as_deref(), Some("original"));

        let replaced = svc
            .update_status(
                order.id,
                UpdateStatusInput {
                    status: OrderStatus::InProcess,
                    notes: Some("packed".to_owned()),
                },
            )
            .expect("update failed");
        assert_eq!(replaced.notes.as_deref(), Some("packed"));
    }
}
