//! # Order Tracker
//!
//! Live status tracking for a single kitchen order, as seen from the customer's
//! side of the counter. The crate keeps a view of one order fresh by polling a
//! remote [`OrderDirectory`], counts down to the estimated ready time, and raises
//! a one-time notification (with an optional haptic buzz) when the order becomes
//! ready for pickup or goes out for delivery.
//!
//! ## Architecture Overview
//!
//! ```text
//!                   ┌────────────────────────────┐
//!   OrderDirectory ◄┤  OrderTracker task         │
//!   (remote, async) │   ├─ order list poller     │  watch   ┌───────────────┐
//!                   │   ├─ queue position poller ├─────────►│ TrackerHandle │
//!                   │   ├─ countdown             │          └───────────────┘
//!                   │   └─ transition notifier   │◄── Dismiss / Stop
//!                   └────────────────────────────┘
//! ```
//!
//! 1. **Model Layer** ([`model`], [`status`]) - orders, queue positions and the
//!    status lifecycle.
//! 2. **Logic Layer** ([`fetch`], [`countdown`], [`notifier`], [`display`]) -
//!    plain synchronous state machines, unit tested without a runtime.
//! 3. **Runtime Layer** ([`tracker`], [`summary`], [`dedup`]) - tokio tasks that
//!    drive the logic from timers and fetch results.
//!
//! All mutable state for a tracked order lives inside its task. Observers only
//! ever see immutable [`TrackerSnapshot`]s.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use order_tracker::{OrderId, OrderTracker, TrackerConfig};
//! use order_tracker::mock::MockDirectory;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), order_tracker::ConfigError> {
//! let directory = Arc::new(MockDirectory::new());
//! let mut handle = OrderTracker::new(OrderId(42), directory)
//!     .with_config(TrackerConfig::default())?
//!     .spawn();
//!
//! if let Some(snapshot) = handle.wait_until(|s| s.notification.is_some()).await {
//!     println!("{}", snapshot.notification.map(|n| n.message).unwrap_or_default());
//! }
//! handle.detach().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Observability
//!
//! Every task logs through `tracing`. Call [`setup_tracing`] once at startup and
//! steer verbosity with `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=info cargo run      # lifecycle events
//! RUST_LOG=debug cargo run     # every fetch, skip and stale result
//! ```
//!
//! ## Testing
//!
//! See [`mock`] for a scriptable in-memory directory and
//! [`ManualClock`](countdown::ManualClock) for driving the countdown by hand.

pub mod config;
pub mod countdown;
pub mod dedup;
pub mod directory;
pub mod display;
pub mod error;
pub mod fetch;
pub mod mock;
pub mod model;
pub mod notifier;
pub mod status;
pub mod summary;
pub mod telemetry;
pub mod tracker;

pub use config::{ConfigError, TrackerConfig};
pub use countdown::{Clock, Countdown, ManualClock, SystemClock};
pub use dedup::DedupDirectory;
pub use directory::OrderDirectory;
pub use display::{status_label, timeline, StepState, TimelineStep};
pub use error::DirectoryError;
pub use model::{CustomerId, Order, OrderId, QueuePosition, QueueSummary, Timestamp};
pub use notifier::{Haptic, HapticError, NoHaptic, Notification, NotificationKind};
pub use status::{OrderStatus, Transition};
pub use summary::{SummaryHandle, SummaryView, SummaryWatcher};
pub use telemetry::setup_tracing;
pub use tracker::{OrderTracker, Phase, TrackerHandle, TrackerSnapshot};
