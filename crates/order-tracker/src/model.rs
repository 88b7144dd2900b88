//! # Order Data Model
//!
//! Plain data owned by the Remote Order Directory. The tracker only ever holds a
//! read-only copy of these values for the duration of one polling cycle.

use crate::status::OrderStatus;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl OrderId {
    /// Queue positions are only ever requested for positive ids.
    pub fn is_trackable(self) -> bool {
        self.0 > 0
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Opaque identity of the customer that placed an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An absolute instant in nanoseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(Self::NANOS_PER_SECOND))
    }

    pub fn as_nanos(self) -> u64 {
        self.0
    }

    /// Time left until `self`, clamped to zero once `now` has passed it.
    pub fn remaining_from(self, now: Timestamp) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(now.0))
    }

    pub fn saturating_add(self, delta: Duration) -> Self {
        let nanos = u64::try_from(delta.as_nanos()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(nanos))
    }
}

/// A customer order as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub customer: CustomerId,
    /// Creation instant.
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliver_to: Option<String>,
}

impl Order {
    pub fn new(id: OrderId, customer: CustomerId, timestamp: Timestamp) -> Self {
        Self {
            id,
            status: OrderStatus::Paid,
            customer,
            timestamp,
            deliver_to: None,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_deliver_to(mut self, zone: impl Into<String>) -> Self {
        self.deliver_to = Some(zone.into());
        self
    }

    /// The delivery zone, treating an empty label as absent.
    pub fn delivery_zone(&self) -> Option<&str> {
        self.deliver_to.as_deref().filter(|zone| !zone.trim().is_empty())
    }
}

/// Rank of one pending order in the kitchen queue.
///
/// `position` is 1-based and lies in `[1, total_orders]` while the order is
/// pending. `estimated_wait_time` is the predicted ready *instant*, not a
/// duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuePosition {
    pub position: u64,
    pub total_orders: u64,
    pub estimated_wait_time: Timestamp,
}

/// Aggregate view of the whole kitchen queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    pub total_orders: u64,
    pub estimated_wait_time: Timestamp,
}
