//! # Transition Notifier
//!
//! Watches one order's status and raises a customer-facing [`Notification`]
//! for each qualifying transition. There is a single slot: a new notification
//! replaces an undismissed one instead of queueing behind it.
//!
//! Each raise also asks the device for a vibration through [`Haptic`]. That
//! call is advisory; whatever it does (including panicking) never prevents the
//! notification from being shown.

use crate::model::{Order, OrderId};
use crate::status::{OrderStatus, StatusObserver, Transition};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_VIBRATION_PATTERN_MS: [u64; 3] = [200, 100, 200];
pub const DEFAULT_FALLBACK_DESTINATION: &str = "your location";

/// Why a vibration request did not happen.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HapticError {
    #[error("Vibration not supported on this device")]
    Unsupported,
    #[error("Vibration failed: {0}")]
    Failed(String),
}

/// Device vibration capability.
pub trait Haptic: Send + Sync {
    /// Vibrate with alternating on/off durations in milliseconds.
    fn vibrate(&self, pattern_ms: &[u64]) -> Result<(), HapticError>;
}

/// For devices with no vibration motor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptic;

impl Haptic for NoHaptic {
    fn vibrate(&self, _pattern_ms: &[u64]) -> Result<(), HapticError> {
        Err(HapticError::Unsupported)
    }
}

/// Which qualifying transition produced a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    ReadyForPickup,
    OnTheWay { destination: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub order_id: OrderId,
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    /// Builds the notification for `transition`, or `None` if it does not qualify.
    pub fn for_transition(
        order: &Order,
        transition: Transition,
        fallback_destination: &str,
    ) -> Option<Self> {
        if !transition.is_qualifying() {
            return None;
        }
        let kind = if transition.to == OrderStatus::Delivering {
            NotificationKind::OnTheWay {
                destination: order
                    .delivery_zone()
                    .unwrap_or(fallback_destination)
                    .to_string(),
            }
        } else {
            NotificationKind::ReadyForPickup
        };
        let message = match &kind {
            NotificationKind::ReadyForPickup => "Your order is ready for pickup!".to_string(),
            NotificationKind::OnTheWay { destination } => {
                format!("Your order is on the way to {destination}!")
            }
        };
        Some(Self {
            order_id: order.id,
            kind,
            message,
        })
    }
}

/// Per-order notification state: the status observer plus one active slot.
pub struct TransitionNotifier {
    observer: StatusObserver,
    active: Option<Notification>,
    haptic: Arc<dyn Haptic>,
    vibration_pattern: Vec<u64>,
    fallback_destination: String,
}

impl TransitionNotifier {
    pub fn new(haptic: Arc<dyn Haptic>) -> Self {
        Self {
            observer: StatusObserver::new(),
            active: None,
            haptic,
            vibration_pattern: DEFAULT_VIBRATION_PATTERN_MS.to_vec(),
            fallback_destination: DEFAULT_FALLBACK_DESTINATION.to_string(),
        }
    }

    pub fn with_vibration_pattern(mut self, pattern_ms: Vec<u64>) -> Self {
        self.vibration_pattern = pattern_ms;
        self
    }

    pub fn with_fallback_destination(mut self, destination: impl Into<String>) -> Self {
        self.fallback_destination = destination.into();
        self
    }

    /// The notification currently on screen, if any.
    pub fn active(&self) -> Option<&Notification> {
        self.active.as_ref()
    }

    /// Clears the active notification. Always succeeds.
    pub fn dismiss(&mut self) {
        if let Some(dismissed) = self.active.take() {
            debug!(order_id = %dismissed.order_id, "Notification dismissed");
        }
    }

    /// Feeds the latest fetched copy of the order through the state machine.
    ///
    /// Returns the notification raised by this observation, if one was.
    pub fn observe(&mut self, order: &Order) -> Option<Notification> {
        let transition = self.observer.observe(order.status)?;
        debug!(order_id = %order.id, %transition, "Status transition");

        let notification =
            Notification::for_transition(order, transition, &self.fallback_destination)?;
        info!(order_id = %order.id, message = %notification.message, "Raising notification");
        self.active = Some(notification.clone());
        self.buzz();
        Some(notification)
    }

    fn buzz(&self) {
        let haptic = &self.haptic;
        let pattern = &self.vibration_pattern;
        match catch_unwind(AssertUnwindSafe(|| haptic.vibrate(pattern))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "Vibration skipped"),
            Err(_) => debug!("Vibration panicked"),
        }
    }
}
