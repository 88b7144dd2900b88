//! # Mock Directory & Testing Guide
//!
//! [`MockDirectory`] implements [`OrderDirectory`] entirely in memory. Script the
//! responses you want with the fluent `expect_*` builders, hand the mock to a
//! tracker, then assert on call counts and [`MockDirectory::verify`].
//!
//! ## Scripting Rules
//!
//! - Each fetch kind has its own queue of scripted responses, consumed in order.
//! - When a queue runs dry, the **last** response is repeated. Polling loops call
//!   the same fetch forever, and this keeps them fed without scripting every tick.
//! - A fetch with nothing ever scripted answers `DirectoryError::Unavailable`.
//!
//! ```rust
//! use order_tracker::mock::MockDirectory;
//! use order_tracker::{DirectoryError, OrderDirectory};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockDirectory::new();
//!     mock.expect_client_orders()
//!         .return_err(DirectoryError::Unavailable("offline".into()));
//!     mock.expect_client_orders().return_ok(vec![]);
//!
//!     assert!(mock.fetch_client_orders().await.is_err());
//!     assert_eq!(mock.fetch_client_orders().await, Ok(vec![]));
//!     assert_eq!(mock.fetch_client_orders().await, Ok(vec![])); // repeated
//!
//!     assert_eq!(mock.client_orders_calls(), 3);
//!     mock.verify();
//! }
//! ```
//!
//! ## Simulating Slow Backends
//!
//! [`MockDirectory::with_latency`] delays every response with `tokio::time::sleep`.
//! Combined with `#[tokio::test(start_paused = true)]` this lets a test hold a
//! fetch in flight across several poll ticks without real waiting.

use crate::directory::OrderDirectory;
use crate::error::DirectoryError;
use crate::model::{Order, OrderId, QueuePosition, QueueSummary};
use crate::status::OrderStatus;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

// =============================================================================
// SCRIPTED RESPONSES
// =============================================================================

/// Ordered responses for one fetch kind.
struct Script<T> {
    label: &'static str,
    queue: Mutex<VecDeque<Result<T, DirectoryError>>>,
    last: Mutex<Option<Result<T, DirectoryError>>>,
    calls: AtomicUsize,
}

impl<T: Clone> Script<T> {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            queue: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    fn push(&self, response: Result<T, DirectoryError>) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    fn next(&self) -> Result<T, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let popped = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(response) = popped {
            *last = Some(response);
        }
        last.clone().unwrap_or_else(|| {
            Err(DirectoryError::Unavailable(format!(
                "no expectation set for {}",
                self.label
            )))
        })
    }

    fn remaining(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<T> {
    script: Arc<Script<T>>,
}

impl<T: Clone> ExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.script.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: DirectoryError) {
        self.script.push(Err(error));
    }
}

/// A scripted, in-memory [`OrderDirectory`].
pub struct MockDirectory {
    client_orders: Arc<Script<Vec<Order>>>,
    positions: Mutex<HashMap<OrderId, Arc<Script<QueuePosition>>>>,
    summary: Arc<Script<QueueSummary>>,
    updates: Arc<Script<()>>,
    creates: Arc<Script<OrderId>>,
    admin_queue: Arc<Script<Vec<Order>>>,
    status_updates: Mutex<Vec<(OrderId, OrderStatus)>>,
    position_calls: AtomicUsize,
    latency: Option<Duration>,
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDirectory {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self {
            client_orders: Arc::new(Script::new("fetch_client_orders")),
            positions: Mutex::new(HashMap::new()),
            summary: Arc::new(Script::new("fetch_queue_summary")),
            updates: Arc::new(Script::new("update_order_status")),
            creates: Arc::new(Script::new("create_order")),
            admin_queue: Arc::new(Script::new("fetch_admin_queue")),
            status_updates: Mutex::new(Vec::new()),
            position_calls: AtomicUsize::new(0),
            latency: None,
        }
    }

    /// Delays every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn expect_client_orders(&self) -> ExpectationBuilder<Vec<Order>> {
        ExpectationBuilder {
            script: self.client_orders.clone(),
        }
    }

    pub fn expect_queue_position(&self, id: OrderId) -> ExpectationBuilder<QueuePosition> {
        ExpectationBuilder {
            script: self.position_script(id),
        }
    }

    pub fn expect_queue_summary(&self) -> ExpectationBuilder<QueueSummary> {
        ExpectationBuilder {
            script: self.summary.clone(),
        }
    }

    pub fn expect_update_order_status(&self) -> ExpectationBuilder<()> {
        ExpectationBuilder {
            script: self.updates.clone(),
        }
    }

    pub fn expect_create_order(&self) -> ExpectationBuilder<OrderId> {
        ExpectationBuilder {
            script: self.creates.clone(),
        }
    }

    pub fn expect_admin_queue(&self) -> ExpectationBuilder<Vec<Order>> {
        ExpectationBuilder {
            script: self.admin_queue.clone(),
        }
    }

    pub fn client_orders_calls(&self) -> usize {
        self.client_orders.calls()
    }

    /// Queue-position calls across every order id.
    pub fn queue_position_calls(&self) -> usize {
        self.position_calls.load(Ordering::SeqCst)
    }

    pub fn queue_summary_calls(&self) -> usize {
        self.summary.calls()
    }

    /// Status updates received, in call order.
    pub fn status_updates(&self) -> Vec<(OrderId, OrderStatus)> {
        self.status_updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Verifies that every scripted response was consumed.
    pub fn verify(&self) {
        let positions: usize = self
            .positions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|script| script.remaining())
            .sum();
        let remaining = self.client_orders.remaining()
            + positions
            + self.summary.remaining()
            + self.updates.remaining()
            + self.creates.remaining()
            + self.admin_queue.remaining();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }

    fn position_script(&self, id: OrderId) -> Arc<Script<QueuePosition>> {
        self.positions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert_with(|| Arc::new(Script::new("fetch_queue_position")))
            .clone()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl OrderDirectory for MockDirectory {
    async fn fetch_client_orders(&self) -> Result<Vec<Order>, DirectoryError> {
        let response = self.client_orders.next();
        self.delay().await;
        response
    }

    async fn fetch_queue_position(&self, id: OrderId) -> Result<QueuePosition, DirectoryError> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        let response = self.position_script(id).next();
        self.delay().await;
        response
    }

    async fn fetch_queue_summary(&self) -> Result<QueueSummary, DirectoryError> {
        let response = self.summary.next();
        self.delay().await;
        response
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), DirectoryError> {
        self.status_updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, status));
        let response = self.updates.next();
        self.delay().await;
        response
    }

    async fn create_order(&self, _deliver_to: Option<String>) -> Result<OrderId, DirectoryError> {
        let response = self.creates.next();
        self.delay().await;
        response
    }

    async fn fetch_admin_queue(&self) -> Result<Vec<Order>, DirectoryError> {
        let response = self.admin_queue.next();
        self.delay().await;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Timestamp;

    #[tokio::test]
    async fn scripted_responses_are_consumed_in_order_then_repeated() {
        let mock = MockDirectory::new();
        let summary = QueueSummary {
            total_orders: 2,
            estimated_wait_time: Timestamp::from_secs(10),
        };
        mock.expect_queue_summary()
            .return_err(DirectoryError::Unavailable("boot".into()));
        mock.expect_queue_summary().return_ok(summary);

        assert!(mock.fetch_queue_summary().await.is_err());
        assert_eq!(mock.fetch_queue_summary().await, Ok(summary));
        assert_eq!(mock.fetch_queue_summary().await, Ok(summary));
        assert_eq!(mock.queue_summary_calls(), 3);
        mock.verify();
    }

    #[tokio::test]
    async fn unscripted_fetch_reports_unavailable() {
        let mock = MockDirectory::new();
        let result = mock.fetch_queue_position(OrderId(4)).await;
        assert!(matches!(result, Err(DirectoryError::Unavailable(_))));
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn verify_flags_unused_expectations() {
        let mock = MockDirectory::new();
        mock.expect_create_order().return_ok(OrderId(1));
        mock.verify();
    }

    #[tokio::test]
    async fn records_status_updates() {
        let mock = MockDirectory::new();
        mock.expect_update_order_status().return_ok(());
        mock.update_order_status(OrderId(2), OrderStatus::Ready)
            .await
            .unwrap();
        assert_eq!(mock.status_updates(), vec![(OrderId(2), OrderStatus::Ready)]);
    }
}
