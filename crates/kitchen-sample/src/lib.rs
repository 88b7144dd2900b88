//! # Kitchen Sample
//!
//! An in-memory kitchen that plays the Remote Order Directory for
//! [`order_tracker`], plus the wiring to run the two together.
//!
//! - **[kitchen_actor]**: the actor that owns the order book and scheduler.
//! - **[clients]**: [`KitchenClient`](clients::KitchenClient) for staff and
//!   [`CustomerClient`](clients::CustomerClient), which implements
//!   [`OrderDirectory`](order_tracker::OrderDirectory).
//! - **[lifecycle]**: [`KitchenSystem`](lifecycle::KitchenSystem) start-up and shutdown.
//! - **[config]**: the combined TOML configuration.

pub mod clients;
pub mod config;
pub mod error;
pub mod kitchen_actor;
pub mod lifecycle;

pub use error::SampleError;
