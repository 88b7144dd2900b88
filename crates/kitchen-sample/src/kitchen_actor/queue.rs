//! The kitchen's order book and wait-time scheduler.
//!
//! Plain state, no channels. Orders are served first-come first-served in id
//! order; every queued order ahead of yours (and yours) costs one
//! `prep_time` slot.

use order_tracker::{
    Clock, CustomerId, DirectoryError, Order, OrderId, OrderStatus, QueuePosition, QueueSummary,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub struct Kitchen {
    orders: BTreeMap<OrderId, Order>,
    next_id: u64,
    prep_time: Duration,
    clock: Arc<dyn Clock>,
}

impl Kitchen {
    pub fn new(prep_time: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders: BTreeMap::new(),
            next_id: 1,
            prep_time,
            clock,
        }
    }

    /// Records a paid order and returns its id. Ids start at 1.
    pub fn place(&mut self, customer: CustomerId, deliver_to: Option<String>) -> OrderId {
        let id = OrderId(self.next_id);
        self.next_id += 1;
        let mut order = Order::new(id, customer, self.clock.now());
        order.deliver_to = deliver_to;
        self.orders.insert(id, order);
        id
    }

    pub fn orders_for(&self, customer: &CustomerId) -> Vec<Order> {
        self.orders
            .values()
            .filter(|order| &order.customer == customer)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<Order> {
        self.orders.values().cloned().collect()
    }

    fn queued(&self) -> impl Iterator<Item = &Order> {
        self.orders.values().filter(|order| order.status.is_queued())
    }

    fn ready_after(&self, slots: u64) -> order_tracker::Timestamp {
        let wait = self.prep_time.saturating_mul(u32::try_from(slots).unwrap_or(u32::MAX));
        self.clock.now().saturating_add(wait)
    }

    pub fn queue_position(&self, id: OrderId) -> Result<QueuePosition, DirectoryError> {
        if !id.is_trackable() {
            return Err(DirectoryError::InvalidOrderId(id));
        }
        let order = self
            .orders
            .get(&id)
            .ok_or(DirectoryError::OrderNotFound(id))?;
        let total_orders = self.queued().count() as u64;

        if !order.status.is_queued() {
            return Ok(QueuePosition {
                position: 0,
                total_orders,
                estimated_wait_time: self.clock.now(),
            });
        }
        let position = self.queued().take_while(|queued| queued.id != id).count() as u64 + 1;
        Ok(QueuePosition {
            position,
            total_orders,
            estimated_wait_time: self.ready_after(position),
        })
    }

    pub fn summary(&self) -> QueueSummary {
        let total_orders = self.queued().count() as u64;
        QueueSummary {
            total_orders,
            estimated_wait_time: self.ready_after(total_orders),
        }
    }

    pub fn update_status(&mut self, id: OrderId, status: OrderStatus) -> Result<(), DirectoryError> {
        let order = self
            .orders
            .get_mut(&id)
            .ok_or(DirectoryError::OrderNotFound(id))?;
        if !order.status.can_transition_to(status) {
            return Err(DirectoryError::IllegalTransition {
                id,
                from: order.status,
                to: status,
            });
        }
        order.status = status;
        Ok(())
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}
