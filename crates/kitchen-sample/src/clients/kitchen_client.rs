//! # Kitchen Clients
//!
//! [`KitchenClient`] is the staff-side handle: place orders for anyone, move
//! orders through the lifecycle, list the whole queue. [`CustomerClient`] binds a
//! customer identity to it and is what a tracker polls, via [`OrderDirectory`].
//!
//! Channel failures map the same way throughout: a closed request channel is
//! [`DirectoryError::Closed`], a dropped reply is [`DirectoryError::Dropped`].

use crate::kitchen_actor::{KitchenRequest, Responder};
use async_trait::async_trait;
use order_tracker::{
    CustomerId, DirectoryError, Order, OrderDirectory, OrderId, OrderStatus, QueuePosition,
    QueueSummary,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct KitchenClient {
    sender: mpsc::Sender<KitchenRequest>,
}

impl KitchenClient {
    pub fn new(sender: mpsc::Sender<KitchenRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Responder<T>) -> KitchenRequest,
    ) -> Result<T, DirectoryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| DirectoryError::Closed)?;
        response.await.map_err(|_| DirectoryError::Dropped)?
    }

    /// A directory view scoped to `customer`.
    pub fn customer(&self, customer: CustomerId) -> CustomerClient {
        CustomerClient {
            customer,
            kitchen: self.clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn place_order(
        &self,
        customer: CustomerId,
        deliver_to: Option<String>,
    ) -> Result<OrderId, DirectoryError> {
        debug!("Sending request");
        self.request(|respond_to| KitchenRequest::PlaceOrder {
            customer,
            deliver_to,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<(), DirectoryError> {
        debug!("Sending request");
        self.request(|respond_to| KitchenRequest::UpdateStatus {
            id,
            status,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn admin_queue(&self) -> Result<Vec<Order>, DirectoryError> {
        self.request(|respond_to| KitchenRequest::AdminQueue { respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn orders_for(&self, customer: CustomerId) -> Result<Vec<Order>, DirectoryError> {
        self.request(|respond_to| KitchenRequest::ClientOrders {
            customer,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn queue_position(&self, id: OrderId) -> Result<QueuePosition, DirectoryError> {
        self.request(|respond_to| KitchenRequest::QueuePosition { id, respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn queue_summary(&self) -> Result<QueueSummary, DirectoryError> {
        self.request(|respond_to| KitchenRequest::QueueSummary { respond_to })
            .await
    }
}

/// The kitchen as seen by one customer.
#[derive(Clone)]
pub struct CustomerClient {
    customer: CustomerId,
    kitchen: KitchenClient,
}

impl CustomerClient {
    pub fn customer(&self) -> &CustomerId {
        &self.customer
    }
}

#[async_trait]
impl OrderDirectory for CustomerClient {
    async fn fetch_client_orders(&self) -> Result<Vec<Order>, DirectoryError> {
        self.kitchen.orders_for(self.customer.clone()).await
    }

    async fn fetch_queue_position(&self, id: OrderId) -> Result<QueuePosition, DirectoryError> {
        self.kitchen.queue_position(id).await
    }

    async fn fetch_queue_summary(&self) -> Result<QueueSummary, DirectoryError> {
        self.kitchen.queue_summary().await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), DirectoryError> {
        self.kitchen.update_status(id, status).await
    }

    async fn create_order(&self, deliver_to: Option<String>) -> Result<OrderId, DirectoryError> {
        self.kitchen
            .place_order(self.customer.clone(), deliver_to)
            .await
    }

    async fn fetch_admin_queue(&self) -> Result<Vec<Order>, DirectoryError> {
        self.kitchen.admin_queue().await
    }
}
