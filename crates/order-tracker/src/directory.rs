//! # Remote Order Directory
//!
//! The collaborator that owns orders and runs the kitchen scheduler. This crate
//! only consumes it; implementations live elsewhere (a network client, the
//! in-memory kitchen in `kitchen-sample`, or [`MockDirectory`](crate::mock::MockDirectory)
//! in tests).
//!
//! A directory is bound to one caller: `fetch_client_orders` returns *that
//! caller's* orders.

use crate::error::DirectoryError;
use crate::model::{Order, OrderId, QueuePosition, QueueSummary};
use crate::status::OrderStatus;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait OrderDirectory: Send + Sync + 'static {
    /// Every order placed by the caller.
    async fn fetch_client_orders(&self) -> Result<Vec<Order>, DirectoryError>;

    /// Where `id` currently sits in the kitchen queue.
    async fn fetch_queue_position(&self, id: OrderId) -> Result<QueuePosition, DirectoryError>;

    /// Pending-order count and wait estimate for the whole kitchen.
    async fn fetch_queue_summary(&self) -> Result<QueueSummary, DirectoryError>;

    /// Administrative status change.
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), DirectoryError>;

    /// Places a new order for the caller and returns its id.
    async fn create_order(&self, deliver_to: Option<String>) -> Result<OrderId, DirectoryError>;

    /// Every order in the kitchen, regardless of customer.
    async fn fetch_admin_queue(&self) -> Result<Vec<Order>, DirectoryError>;
}

#[async_trait]
impl<D: OrderDirectory + ?Sized> OrderDirectory for Arc<D> {
    async fn fetch_client_orders(&self) -> Result<Vec<Order>, DirectoryError> {
        (**self).fetch_client_orders().await
    }

    async fn fetch_queue_position(&self, id: OrderId) -> Result<QueuePosition, DirectoryError> {
        (**self).fetch_queue_position(id).await
    }

    async fn fetch_queue_summary(&self) -> Result<QueueSummary, DirectoryError> {
        (**self).fetch_queue_summary().await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), DirectoryError> {
        (**self).update_order_status(id, status).await
    }

    async fn create_order(&self, deliver_to: Option<String>) -> Result<OrderId, DirectoryError> {
        (**self).create_order(deliver_to).await
    }

    async fn fetch_admin_queue(&self) -> Result<Vec<Order>, DirectoryError> {
        (**self).fetch_admin_queue().await
    }
}
