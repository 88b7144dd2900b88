//! # Kitchen Actor
//!
//! An in-memory Remote Order Directory. The actor owns the [`Kitchen`] order
//! book and processes one [`KitchenRequest`] at a time, so the book needs no
//! locks. Clients talk to it through [`KitchenClient`](crate::clients::KitchenClient).
//!
//! ## Message Flow
//!
//! ```text
//! CustomerClient ──┐
//! CustomerClient ──┼── mpsc ──► KitchenActor ──► Kitchen
//! KitchenClient  ──┘              │
//!        ▲                        │
//!        └──── oneshot reply ─────┘
//! ```
//!
//! The actor stops once every client has been dropped.

mod queue;

pub use queue::Kitchen;

use crate::clients::KitchenClient;
use crate::config::KitchenConfig;
use order_tracker::{
    Clock, CustomerId, DirectoryError, Order, OrderId, OrderStatus, QueuePosition, QueueSummary,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

pub type Responder<T> = oneshot::Sender<Result<T, DirectoryError>>;

/// Requests understood by the kitchen.
#[derive(Debug)]
pub enum KitchenRequest {
    PlaceOrder {
        customer: CustomerId,
        deliver_to: Option<String>,
        respond_to: Responder<OrderId>,
    },
    ClientOrders {
        customer: CustomerId,
        respond_to: Responder<Vec<Order>>,
    },
    QueuePosition {
        id: OrderId,
        respond_to: Responder<QueuePosition>,
    },
    QueueSummary {
        respond_to: Responder<QueueSummary>,
    },
    UpdateStatus {
        id: OrderId,
        status: OrderStatus,
        respond_to: Responder<()>,
    },
    AdminQueue {
        respond_to: Responder<Vec<Order>>,
    },
}

/// Server half of the kitchen.
pub struct KitchenActor {
    receiver: mpsc::Receiver<KitchenRequest>,
    kitchen: Kitchen,
}

impl KitchenActor {
    /// Creates the actor and its client. Run the actor with [`KitchenActor::run`].
    pub fn new(config: &KitchenConfig, clock: Arc<dyn Clock>) -> (Self, KitchenClient) {
        let (sender, receiver) = mpsc::channel(config.channel_capacity);
        let actor = Self {
            receiver,
            kitchen: Kitchen::new(config.prep_time_per_order(), clock),
        };
        (actor, KitchenClient::new(sender))
    }

    pub async fn run(mut self) {
        info!("Kitchen open");

        while let Some(request) = self.receiver.recv().await {
            match request {
                KitchenRequest::PlaceOrder {
                    customer,
                    deliver_to,
                    respond_to,
                } => {
                    let id = self.kitchen.place(customer.clone(), deliver_to);
                    info!(%id, %customer, size = self.kitchen.order_count(), "Order placed");
                    let _ = respond_to.send(Ok(id));
                }
                KitchenRequest::ClientOrders {
                    customer,
                    respond_to,
                } => {
                    let orders = self.kitchen.orders_for(&customer);
                    debug!(%customer, count = orders.len(), "Client orders");
                    let _ = respond_to.send(Ok(orders));
                }
                KitchenRequest::QueuePosition { id, respond_to } => {
                    let result = self.kitchen.queue_position(id);
                    if let Err(e) = &result {
                        debug!(%id, error = %e, "Queue position unavailable");
                    }
                    let _ = respond_to.send(result);
                }
                KitchenRequest::QueueSummary { respond_to } => {
                    let _ = respond_to.send(Ok(self.kitchen.summary()));
                }
                KitchenRequest::UpdateStatus {
                    id,
                    status,
                    respond_to,
                } => {
                    let result = self.kitchen.update_status(id, status);
                    match &result {
                        Ok(()) => info!(%id, %status, "Status updated"),
                        Err(e) => warn!(%id, %status, error = %e, "Status update rejected"),
                    }
                    let _ = respond_to.send(result);
                }
                KitchenRequest::AdminQueue { respond_to } => {
                    let _ = respond_to.send(Ok(self.kitchen.all()));
                }
            }
        }

        info!(orders = self.kitchen.order_count(), "Kitchen closed");
    }
}
