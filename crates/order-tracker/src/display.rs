//! Customer-facing labels and the progress timeline.
//!
//! Progress is decided by [`OrderStatus::rank`], never by declaration order, so
//! `Cancelled` marks no step as done and the pre-payment statuses never count as
//! progress.

use crate::model::Order;
use crate::status::OrderStatus;

pub fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Paid => "Payment Confirmed",
        OrderStatus::Preparing => "Preparing Your Order",
        OrderStatus::Ready => "Ready for Pickup",
        OrderStatus::Delivering => "On the Way",
        OrderStatus::Completed => "Completed",
        OrderStatus::Cancelled => "Cancelled",
        OrderStatus::Confirmed => "Confirmed",
        OrderStatus::Reserved => "Reserved",
        OrderStatus::Default => "Processing",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Done,
    Active,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineStep {
    pub status: OrderStatus,
    pub label: &'static str,
    pub state: StepState,
}

/// Steps shown for `order`: `Delivering` only appears for delivery orders.
pub fn timeline(order: &Order) -> Vec<TimelineStep> {
    let delivers = order.delivery_zone().is_some();
    [
        OrderStatus::Paid,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivering,
        OrderStatus::Completed,
    ]
    .into_iter()
    .filter(|step| *step != OrderStatus::Delivering || delivers)
    .map(|step| TimelineStep {
        status: step,
        label: status_label(step),
        state: step_state(order.status, step),
    })
    .collect()
}

fn step_state(current: OrderStatus, step: OrderStatus) -> StepState {
    if current == step {
        return StepState::Active;
    }
    match (current.rank(), step.rank()) {
        (Some(current), Some(step)) if current > step => StepState::Done,
        _ => StepState::Upcoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomerId, OrderId, Timestamp};

    fn order(status: OrderStatus) -> Order {
        Order::new(OrderId(1), CustomerId::new("c"), Timestamp(0)).with_status(status)
    }

    fn states(steps: &[TimelineStep]) -> Vec<(OrderStatus, StepState)> {
        steps.iter().map(|s| (s.status, s.state)).collect()
    }

    #[test]
    fn pickup_order_skips_delivery_step() {
        let steps = timeline(&order(OrderStatus::Ready));
        assert_eq!(
            states(&steps),
            vec![
                (OrderStatus::Paid, StepState::Done),
                (OrderStatus::Preparing, StepState::Done),
                (OrderStatus::Ready, StepState::Active),
                (OrderStatus::Completed, StepState::Upcoming),
            ]
        );
    }

    #[test]
    fn delivery_order_shows_delivering() {
        let steps = timeline(&order(OrderStatus::Delivering).with_deliver_to("Garden Zone"));
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[3].status, OrderStatus::Delivering);
        assert_eq!(steps[3].state, StepState::Active);
        assert_eq!(steps[3].label, "On the Way");
        assert_eq!(steps[2].state, StepState::Done);
    }

    #[test]
    fn cancelled_order_marks_nothing_done() {
        let steps = timeline(&order(OrderStatus::Cancelled));
        assert!(steps.iter().all(|s| s.state == StepState::Upcoming));
    }

    #[test]
    fn pre_payment_status_is_not_progress() {
        let steps = timeline(&order(OrderStatus::Reserved));
        assert!(steps.iter().all(|s| s.state == StepState::Upcoming));
    }

    #[test]
    fn unknown_status_reads_processing() {
        assert_eq!(status_label(OrderStatus::Default), "Processing");
        assert_eq!(status_label(OrderStatus::Ready), "Ready for Pickup");
    }
}
