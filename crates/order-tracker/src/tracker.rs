//! # Order Tracker
//!
//! One tokio task per tracked order. The task is the sole owner of everything
//! the customer sees about that order: the last fetched order and queue
//! position, the "previous status" marker, the countdown and the active
//! notification. Nothing outside the task mutates that state; the rest of the
//! application reads [`TrackerSnapshot`]s from a `watch` channel and talks to the
//! task through a [`TrackerHandle`].
//!
//! ## Timers
//!
//! Three independent timers run inside the task's `select!` loop:
//!
//! | Timer | Period | Effect |
//! |-------|--------|--------|
//! | order list | `poll_interval` (5 s) | fetch the caller's orders, pick out ours |
//! | queue position | `poll_interval` (5 s) | fetch our queue position (ids > 0 only) |
//! | countdown | `countdown_tick` (1 s) | re-render the countdown from the wall clock |
//!
//! The countdown timer never fetches anything. A poll tick that arrives while
//! the previous fetch of the same kind is still outstanding is skipped, so a
//! slow backend sees at most one request per kind from each tracker.
//!
//! ## Teardown
//!
//! Fetches run in a `JoinSet` owned by the task. Ending the task, whether via
//! [`TrackerHandle::detach`], dropping the handle, or the order turning out not
//! to exist, drops every timer and aborts every outstanding fetch with it.

use crate::config::{ConfigError, TrackerConfig};
use crate::countdown::{Clock, Countdown, SystemClock};
use crate::directory::OrderDirectory;
use crate::display::{timeline, TimelineStep};
use crate::error::DirectoryError;
use crate::fetch::{Completion, FetchSlot, Ticket};
use crate::model::{Order, OrderId, QueuePosition};
use crate::notifier::{Haptic, NoHaptic, Notification, TransitionNotifier};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

// =============================================================================
// 1. WHAT THE DISPLAY LAYER SEES
// =============================================================================

/// Coarse state of a tracked order view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing fetched yet.
    Loading,
    /// The order is known. Data may be stale if an error is also present.
    Live,
    /// The caller's order list does not contain this id. Polling has stopped.
    NotFound,
    /// Every fetch so far has failed. Polling continues.
    Failed,
}

/// Everything a status screen needs, as of the last change.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSnapshot {
    pub order_id: OrderId,
    pub phase: Phase,
    pub order: Option<Order>,
    pub queue_position: Option<QueuePosition>,
    /// `m:ss` until the estimated ready time, or `None` without an estimate.
    pub countdown: Option<String>,
    pub notification: Option<Notification>,
    /// Set when the latest order-list fetch failed.
    pub orders_error: Option<DirectoryError>,
    /// Set when the latest queue-position fetch failed.
    pub position_error: Option<DirectoryError>,
}

impl TrackerSnapshot {
    fn loading(order_id: OrderId) -> Self {
        Self {
            order_id,
            phase: Phase::Loading,
            order: None,
            queue_position: None,
            countdown: None,
            notification: None,
            orders_error: None,
            position_error: None,
        }
    }

    /// True when the displayed data is older than the latest attempt.
    pub fn is_stale(&self) -> bool {
        self.orders_error.is_some() || self.position_error.is_some()
    }

    pub fn timeline(&self) -> Vec<TimelineStep> {
        self.order.as_ref().map(timeline).unwrap_or_default()
    }
}

// =============================================================================
// 2. MESSAGES
// =============================================================================

#[derive(Debug)]
enum TrackerCommand {
    Dismiss { respond_to: oneshot::Sender<()> },
    Stop,
}

/// Result of one fetch, tagged with the ticket it was issued under.
#[derive(Debug)]
enum FetchOutcome {
    Orders(Ticket, Result<Option<Order>, DirectoryError>),
    Position(Ticket, Result<QueuePosition, DirectoryError>),
}

#[derive(Default)]
struct Timers {
    orders: Option<Interval>,
    position: Option<Interval>,
    countdown: Option<Interval>,
}

impl Timers {
    fn clear(&mut self) {
        self.orders = None;
        self.position = None;
        self.countdown = None;
    }
}

fn periodic(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Resolves on the next tick, or never if the timer is off.
async fn tick(timer: &mut Option<Interval>) -> Instant {
    match timer {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}

// =============================================================================
// 3. THE TRACKER TASK
// =============================================================================

/// Server half of a tracked order. Build it, then call [`OrderTracker::spawn`].
pub struct OrderTracker {
    order_id: OrderId,
    directory: Arc<dyn OrderDirectory>,
    clock: Arc<dyn Clock>,
    config: TrackerConfig,
    orders: FetchSlot<Option<Order>>,
    position: FetchSlot<QueuePosition>,
    countdown: Countdown,
    notifier: TransitionNotifier,
    not_found: bool,
}

impl OrderTracker {
    pub fn new(order_id: OrderId, directory: Arc<dyn OrderDirectory>) -> Self {
        let config = TrackerConfig::default();
        let notifier = Self::notifier_for(&config, Arc::new(NoHaptic));
        Self {
            order_id,
            directory,
            clock: Arc::new(SystemClock),
            config,
            orders: FetchSlot::new(),
            position: FetchSlot::new(),
            countdown: Countdown::new(),
            notifier,
            not_found: false,
        }
    }

    /// Applies `config` after validating it.
    pub fn with_config(mut self, config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.notifier = self
            .notifier
            .with_vibration_pattern(config.vibration_pattern_ms.clone())
            .with_fallback_destination(config.fallback_destination.clone());
        self.config = config;
        Ok(self)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_haptic(mut self, haptic: Arc<dyn Haptic>) -> Self {
        self.notifier = Self::notifier_for(&self.config, haptic);
        self
    }

    fn notifier_for(config: &TrackerConfig, haptic: Arc<dyn Haptic>) -> TransitionNotifier {
        TransitionNotifier::new(haptic)
            .with_vibration_pattern(config.vibration_pattern_ms.clone())
            .with_fallback_destination(config.fallback_destination.clone())
    }

    /// Starts the task and returns the handle that owns it.
    pub fn spawn(self) -> TrackerHandle {
        let order_id = self.order_id;
        let (command_tx, command_rx) = mpsc::channel(8);
        let (snapshot_tx, snapshot_rx) = watch::channel(TrackerSnapshot::loading(order_id));
        let task = tokio::spawn(self.run(command_rx, snapshot_tx));
        TrackerHandle {
            order_id,
            commands: command_tx,
            snapshots: snapshot_rx,
            task: Some(task),
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<TrackerCommand>,
        snapshots: watch::Sender<TrackerSnapshot>,
    ) {
        let order_id = self.order_id;
        info!(%order_id, "Tracking started");

        let mut timers = Timers {
            orders: Some(periodic(self.config.poll_interval())),
            position: None,
            countdown: None,
        };
        if order_id.is_trackable() {
            timers.position = Some(periodic(self.config.poll_interval()));
        } else {
            debug!(%order_id, "Queue position polling disabled for non-positive id");
        }
        let mut fetches: JoinSet<FetchOutcome> = JoinSet::new();

        loop {
            tokio::select! {
                _ = tick(&mut timers.orders) => self.begin_orders_fetch(&mut fetches),
                _ = tick(&mut timers.position) => self.begin_position_fetch(&mut fetches),
                _ = tick(&mut timers.countdown) => {}
                Some(joined) = fetches.join_next(), if !fetches.is_empty() => match joined {
                    Ok(outcome) => self.apply(outcome, &mut timers),
                    Err(e) => warn!(%order_id, error = %e, "Fetch task ended abnormally"),
                },
                command = commands.recv() => match command {
                    Some(TrackerCommand::Dismiss { respond_to }) => {
                        self.notifier.dismiss();
                        self.publish(&snapshots);
                        let _ = respond_to.send(());
                    }
                    Some(TrackerCommand::Stop) | None => break,
                },
            }
            self.publish(&snapshots);
        }

        timers.clear();
        fetches.shutdown().await;
        info!(%order_id, "Tracking stopped");
    }

    fn begin_orders_fetch(&mut self, fetches: &mut JoinSet<FetchOutcome>) {
        let Some(ticket) = self.orders.try_begin() else {
            debug!(order_id = %self.order_id, "Order fetch still in flight; skipping tick");
            return;
        };
        debug!(order_id = %self.order_id, ?ticket, "Fetching client orders");
        let directory = self.directory.clone();
        let order_id = self.order_id;
        fetches.spawn(async move {
            let result = AssertUnwindSafe(directory.fetch_client_orders())
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(DirectoryError::Unavailable("fetch panicked".into())))
                .map(|orders| orders.into_iter().find(|order| order.id == order_id));
            FetchOutcome::Orders(ticket, result)
        });
    }

    fn begin_position_fetch(&mut self, fetches: &mut JoinSet<FetchOutcome>) {
        let Some(ticket) = self.position.try_begin() else {
            debug!(order_id = %self.order_id, "Queue position fetch still in flight; skipping tick");
            return;
        };
        debug!(order_id = %self.order_id, ?ticket, "Fetching queue position");
        let directory = self.directory.clone();
        let order_id = self.order_id;
        fetches.spawn(async move {
            let result = AssertUnwindSafe(directory.fetch_queue_position(order_id))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(DirectoryError::Unavailable("fetch panicked".into())));
            FetchOutcome::Position(ticket, result)
        });
    }

    fn apply(&mut self, outcome: FetchOutcome, timers: &mut Timers) {
        let order_id = self.order_id;
        match outcome {
            FetchOutcome::Orders(ticket, result) => {
                match &result {
                    Err(e) if e.is_transient() => {
                        warn!(%order_id, error = %e, "Order fetch failed; keeping last known data")
                    }
                    Err(e) => warn!(%order_id, error = %e, "Order fetch rejected"),
                    Ok(_) => {}
                }
                let missing = matches!(result, Ok(None) | Err(DirectoryError::OrderNotFound(_)));
                let fetched = result.as_ref().ok().cloned().flatten();
                if self.orders.complete(ticket, result) == Completion::Stale {
                    debug!(%order_id, ?ticket, "Discarding stale order fetch");
                    return;
                }
                if missing {
                    self.on_not_found(timers);
                } else if let Some(order) = fetched {
                    self.on_order(&order, timers);
                }
            }
            FetchOutcome::Position(ticket, result) => {
                let permanent = match &result {
                    Err(e) if e.is_transient() => {
                        warn!(%order_id, error = %e, "Queue position fetch failed; keeping last known data");
                        false
                    }
                    Err(e) => {
                        warn!(%order_id, error = %e, "Queue position rejected; stopping queue tracking");
                        true
                    }
                    Ok(_) => false,
                };
                let estimate = result.as_ref().ok().map(|p| p.estimated_wait_time);
                if self.position.complete(ticket, result) == Completion::Stale {
                    debug!(%order_id, ?ticket, "Discarding stale queue position");
                    return;
                }
                if permanent {
                    timers.position = None;
                    timers.countdown = None;
                    self.countdown.clear();
                } else if let Some(estimate) = estimate {
                    if self.countdown.set_estimate(estimate) || timers.countdown.is_none() {
                        debug!(%order_id, "Restarting countdown");
                        timers.countdown = Some(periodic(self.config.countdown_tick()));
                    }
                }
            }
        }
    }

    fn on_order(&mut self, order: &Order, timers: &mut Timers) {
        self.notifier.observe(order);

        if order.status.is_terminal() && timers.position.is_some() {
            info!(order_id = %order.id, status = %order.status, "Order finished; stopping queue tracking");
            timers.position = None;
            timers.countdown = None;
            self.position.reset();
            self.countdown.clear();
        }
    }

    fn on_not_found(&mut self, timers: &mut Timers) {
        warn!(order_id = %self.order_id, "Order not found; stopping polling");
        self.not_found = true;
        timers.clear();
        self.position.reset();
        self.countdown.clear();
    }

    fn snapshot(&self) -> TrackerSnapshot {
        let order = if self.not_found {
            None
        } else {
            self.orders.value().cloned().flatten()
        };
        let phase = if self.not_found {
            Phase::NotFound
        } else if order.is_some() {
            Phase::Live
        } else if self.orders.error().is_some() {
            Phase::Failed
        } else {
            Phase::Loading
        };
        TrackerSnapshot {
            order_id: self.order_id,
            phase,
            order,
            queue_position: self.position.value().copied(),
            countdown: self.countdown.render(self.clock.now()),
            notification: self.notifier.active().cloned(),
            orders_error: self.orders.error().cloned(),
            position_error: self.position.error().cloned(),
        }
    }

    fn publish(&self, snapshots: &watch::Sender<TrackerSnapshot>) {
        let next = self.snapshot();
        snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

// =============================================================================
// 4. THE HANDLE
// =============================================================================

/// Client half of a tracked order.
///
/// Owns the tracker task: dropping the handle aborts it, and with it every timer
/// and in-flight fetch. Use [`TrackerHandle::detach`] for an orderly stop.
pub struct TrackerHandle {
    order_id: OrderId,
    commands: mpsc::Sender<TrackerCommand>,
    snapshots: watch::Receiver<TrackerSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl TrackerHandle {
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver for additional observers of the same order.
    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.snapshots.clone()
    }

    /// Waits until a snapshot satisfies `ready`, checking the current one first.
    ///
    /// Returns `None` if the tracker stops first.
    pub async fn wait_until(
        &mut self,
        mut ready: impl FnMut(&TrackerSnapshot) -> bool,
    ) -> Option<TrackerSnapshot> {
        loop {
            {
                let current = self.snapshots.borrow_and_update();
                if ready(&current) {
                    return Some(current.clone());
                }
            }
            if self.snapshots.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Clears the active notification. Succeeds even if the tracker is gone.
    pub async fn dismiss_notification(&self) {
        let (respond_to, response) = oneshot::channel();
        if self
            .commands
            .send(TrackerCommand::Dismiss { respond_to })
            .await
            .is_ok()
        {
            let _ = response.await;
        }
    }

    /// Stops tracking and waits for the task to wind down.
    pub async fn detach(mut self) {
        let _ = self.commands.send(TrackerCommand::Stop).await;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
