//! # Directory Errors
//!
//! Everything that can go wrong talking to the Remote Order Directory. The type
//! is `Clone` so a single in-flight fetch can hand the same outcome to every
//! caller waiting on it.

use crate::model::OrderId;
use crate::status::OrderStatus;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DirectoryError {
    /// Network or backend trouble. Worth retrying on the next tick.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Queue positions only exist for positive ids.
    #[error("Invalid order id: {0}")]
    InvalidOrderId(OrderId),

    #[error("Illegal status transition for {id}: {from} -> {to}")]
    IllegalTransition {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Directory closed")]
    Closed,

    #[error("Directory dropped response channel")]
    Dropped,
}

impl DirectoryError {
    /// Transient failures keep the last good data on screen and retry. Anything
    /// else means retrying the same request cannot succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirectoryError::Unavailable(_) | DirectoryError::Closed | DirectoryError::Dropped
        )
    }
}
