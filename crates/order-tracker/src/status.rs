//! # Order Status State Machine
//!
//! The finite set of order states, the administrative transitions the kitchen
//! may apply between them, and the observer that turns a stream of polled
//! statuses into transition events.
//!
//! The client never writes a status. It only sees changes by re-fetching the
//! order, so the interesting piece here is [`StatusObserver`]: it reports a
//! [`Transition`] only when it already holds a *previous* observation and the
//! new one differs. The first status seen after tracking starts is never a
//! transition, even if the order is already `Ready`.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Lifecycle stage of an order.
///
/// `Default` is the fallback for anything the backend sends that we do not
/// recognise. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum OrderStatus {
    Default,
    Reserved,
    Confirmed,
    Paid,
    Preparing,
    Ready,
    Delivering,
    Completed,
    Cancelled,
}

/// Canonical lifecycle order, used for every "is this further along" question.
///
/// `Cancelled` is absent: it leaves the happy path rather than
/// advancing along it.
const LIFECYCLE: [OrderStatus; 8] = [
    OrderStatus::Default,
    OrderStatus::Reserved,
    OrderStatus::Confirmed,
    OrderStatus::Paid,
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::Delivering,
    OrderStatus::Completed,
];

impl OrderStatus {
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::Default,
        OrderStatus::Reserved,
        OrderStatus::Confirmed,
        OrderStatus::Paid,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivering,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Default => "Default",
            OrderStatus::Reserved => "Reserved",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Paid => "Paid",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Delivering => "Delivering",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Position on the lifecycle track, or `None` for `Cancelled`.
    pub fn rank(self) -> Option<usize> {
        LIFECYCLE.iter().position(|s| *s == self)
    }

    /// Statuses that still occupy a slot in the kitchen queue.
    pub fn is_queued(self) -> bool {
        matches!(
            self,
            OrderStatus::Reserved
                | OrderStatus::Confirmed
                | OrderStatus::Paid
                | OrderStatus::Preparing
        )
    }

    /// Whether an administrator may move an order from `self` to `next`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        !self.is_terminal() && next != OrderStatus::Default && next != self
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    /// Never fails: unknown names map to [`OrderStatus::Default`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .unwrap_or(OrderStatus::Default))
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

/// An observed change `from -> to` for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl Transition {
    /// Only entering `Ready` or `Delivering` is worth telling the customer about.
    pub fn is_qualifying(&self) -> bool {
        matches!(self.to, OrderStatus::Ready | OrderStatus::Delivering)
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Remembers the last status seen for a single order.
#[derive(Debug, Clone, Default)]
pub struct StatusObserver {
    previous: Option<OrderStatus>,
}

impl StatusObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<OrderStatus> {
        self.previous
    }

    /// Records `current` and returns the transition it represents, if any.
    pub fn observe(&mut self, current: OrderStatus) -> Option<Transition> {
        let transition = match self.previous {
            Some(from) if from != current => Some(Transition { from, to: current }),
            _ => None,
        };
        self.previous = Some(current);
        transition
    }
}
