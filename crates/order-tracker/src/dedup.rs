//! # In-flight Request De-duplication
//!
//! [`DedupDirectory`] wraps any [`OrderDirectory`] so that concurrent reads for
//! the same key share one underlying call. The first caller starts the fetch;
//! everyone who arrives before it resolves awaits the same shared future and
//! receives a clone of its result. Once it resolves the key is free again, so
//! the next caller triggers a fresh fetch.
//!
//! Keys are the fetch kind plus, for queue positions, the order id. Mutations
//! are never shared.

use crate::directory::OrderDirectory;
use crate::error::DirectoryError;
use crate::model::{Order, OrderId, QueuePosition, QueueSummary};
use crate::status::OrderStatus;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

type BoxedFetch<T> = BoxFuture<'static, Result<T, DirectoryError>>;
type SharedFetch<T> = Shared<BoxedFetch<T>>;

/// Calls currently in flight for one fetch kind.
///
/// Entries are weak: when every waiter on a call has been dropped, the call is
/// dropped with them and its entry stops upgrading. A finished call is never
/// joined either, so a late caller always gets a fresh response.
struct InFlight<K, T> {
    calls: Mutex<HashMap<K, WeakShared<BoxedFetch<T>>>>,
}

impl<K, T> InFlight<K, T>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    T: Clone + Send + Sync + 'static,
{
    fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// The call behind `entry`, if it still has waiters and has not resolved.
    fn live(entry: &WeakShared<BoxedFetch<T>>) -> Option<SharedFetch<T>> {
        entry.upgrade().filter(|fetch| fetch.peek().is_none())
    }

    fn len(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|entry| Self::live(entry).is_some())
            .count()
    }

    async fn join_or_start<F>(&self, key: K, start: F) -> Result<T, DirectoryError>
    where
        F: FnOnce() -> BoxedFetch<T>,
    {
        let fetch = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            calls.retain(|_, entry| entry.upgrade().is_some());
            match calls.get(&key).and_then(Self::live) {
                Some(existing) => {
                    debug!(?key, "Joining in-flight fetch");
                    existing
                }
                None => {
                    let fetch = start().shared();
                    if let Some(entry) = fetch.downgrade() {
                        calls.insert(key.clone(), entry);
                    }
                    fetch
                }
            }
        };

        let result = fetch.clone().await;

        {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            if calls
                .get(&key)
                .and_then(WeakShared::upgrade)
                .is_some_and(|current| current.ptr_eq(&fetch))
            {
                calls.remove(&key);
            }
        }

        result
    }
}

/// Request-coalescing decorator around an [`OrderDirectory`].
pub struct DedupDirectory<D: ?Sized> {
    inner: Arc<D>,
    client_orders: InFlight<(), Vec<Order>>,
    positions: InFlight<OrderId, QueuePosition>,
    summary: InFlight<(), QueueSummary>,
}

impl<D: OrderDirectory + ?Sized> DedupDirectory<D> {
    pub fn new(inner: Arc<D>) -> Self {
        Self {
            inner,
            client_orders: InFlight::new(),
            positions: InFlight::new(),
            summary: InFlight::new(),
        }
    }

    /// Number of distinct fetches currently awaiting a response.
    pub fn in_flight(&self) -> usize {
        self.client_orders.len() + self.positions.len() + self.summary.len()
    }
}

#[async_trait]
impl<D: OrderDirectory + ?Sized> OrderDirectory for DedupDirectory<D> {
    async fn fetch_client_orders(&self) -> Result<Vec<Order>, DirectoryError> {
        let inner = self.inner.clone();
        self.client_orders
            .join_or_start((), move || {
                async move { inner.fetch_client_orders().await }.boxed()
            })
            .await
    }

    async fn fetch_queue_position(&self, id: OrderId) -> Result<QueuePosition, DirectoryError> {
        let inner = self.inner.clone();
        self.positions
            .join_or_start(id, move || {
                async move { inner.fetch_queue_position(id).await }.boxed()
            })
            .await
    }

    async fn fetch_queue_summary(&self) -> Result<QueueSummary, DirectoryError> {
        let inner = self.inner.clone();
        self.summary
            .join_or_start((), move || {
                async move { inner.fetch_queue_summary().await }.boxed()
            })
            .await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), DirectoryError> {
        self.inner.update_order_status(id, status).await
    }

    async fn create_order(&self, deliver_to: Option<String>) -> Result<OrderId, DirectoryError> {
        self.inner.create_order(deliver_to).await
    }

    async fn fetch_admin_queue(&self) -> Result<Vec<Order>, DirectoryError> {
        self.inner.fetch_admin_queue().await
    }
}
