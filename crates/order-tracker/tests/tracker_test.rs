use order_tracker::mock::MockDirectory;
use order_tracker::{
    ConfigError, CustomerId, DedupDirectory, DirectoryError, Haptic, HapticError, ManualClock,
    NotificationKind, Order, OrderId, OrderStatus, OrderTracker, Phase, QueuePosition, Timestamp,
    TrackerConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const ID: OrderId = OrderId(7);

fn order(status: OrderStatus) -> Order {
    Order::new(ID, CustomerId::new("alice"), Timestamp::from_secs(1)).with_status(status)
}

fn position(position: u64, ready_at_secs: u64) -> QueuePosition {
    QueuePosition {
        position,
        total_orders: 3,
        estimated_wait_time: Timestamp::from_secs(ready_at_secs),
    }
}

#[derive(Default)]
struct CountingHaptic {
    buzzes: AtomicUsize,
}

impl Haptic for CountingHaptic {
    fn vibrate(&self, pattern_ms: &[u64]) -> Result<(), HapticError> {
        assert_eq!(pattern_ms, &[200, 100, 200]);
        self.buzzes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn status_is(status: OrderStatus) -> impl FnMut(&order_tracker::TrackerSnapshot) -> bool {
    move |s| s.order.as_ref().map(|o| o.status) == Some(status)
}

#[tokio::test(start_paused = true)]
async fn test_ready_transition_notifies_once() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Paid)]);
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Preparing)]);
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Ready)]);
    mock.expect_queue_position(ID).return_ok(position(1, 100));
    let haptic = Arc::new(CountingHaptic::default());

    let mut handle = OrderTracker::new(ID, mock.clone())
        .with_haptic(haptic.clone())
        .spawn();

    let first = handle.wait_until(|s| s.phase == Phase::Live).await.unwrap();
    assert_eq!(first.notification, None);

    let ready = handle
        .wait_until(status_is(OrderStatus::Ready))
        .await
        .unwrap();
    let notification = ready.notification.unwrap();
    assert_eq!(notification.kind, NotificationKind::ReadyForPickup);
    assert_eq!(notification.message, "Your order is ready for pickup!");

    // Ready keeps being returned; no further notifications.
    sleep(Duration::from_secs(20)).await;
    assert_eq!(haptic.buzzes.load(Ordering::SeqCst), 1);
    assert!(handle.snapshot().notification.is_some());
    mock.verify();

    handle.detach().await;
}

#[tokio::test(start_paused = true)]
async fn test_first_observation_of_ready_is_silent() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Ready)]);

    let mut handle = OrderTracker::new(ID, mock.clone()).spawn();
    let snapshot = handle.wait_until(|s| s.phase == Phase::Live).await.unwrap();
    assert_eq!(snapshot.notification, None);

    sleep(Duration::from_secs(12)).await;
    assert_eq!(handle.snapshot().notification, None);
}

#[tokio::test(start_paused = true)]
async fn test_delivery_notification_names_zone() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Preparing)]);
    mock.expect_client_orders().return_ok(vec![
        order(OrderStatus::Delivering).with_deliver_to("Garden Zone")
    ]);

    let mut handle = OrderTracker::new(ID, mock.clone()).spawn();
    let snapshot = handle
        .wait_until(status_is(OrderStatus::Delivering))
        .await
        .unwrap();
    assert_eq!(
        snapshot.notification.unwrap().message,
        "Your order is on the way to Garden Zone!"
    );
}

#[tokio::test(start_paused = true)]
async fn test_configured_fallback_destination() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Ready)]);
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Delivering)]);
    let config = TrackerConfig {
        fallback_destination: "the front desk".into(),
        ..TrackerConfig::default()
    };

    let mut handle = OrderTracker::new(ID, mock.clone())
        .with_config(config)
        .unwrap()
        .spawn();
    let snapshot = handle
        .wait_until(status_is(OrderStatus::Delivering))
        .await
        .unwrap();
    assert_eq!(
        snapshot.notification.unwrap().message,
        "Your order is on the way to the front desk!"
    );
}

#[tokio::test(start_paused = true)]
async fn test_dismissal_survives_repolls() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Preparing)]);
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Ready)]);

    let mut handle = OrderTracker::new(ID, mock.clone()).spawn();
    handle.wait_until(|s| s.notification.is_some()).await.unwrap();

    handle.dismiss_notification().await;
    assert_eq!(handle.snapshot().notification, None);

    sleep(Duration::from_secs(15)).await;
    assert_eq!(handle.snapshot().notification, None);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_renders_from_estimate() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Preparing)]);
    mock.expect_queue_position(ID).return_ok(position(2, 1_125));
    let clock = ManualClock::new(Timestamp::from_secs(1_000));

    let mut handle = OrderTracker::new(ID, mock.clone())
        .with_clock(Arc::new(clock.clone()))
        .spawn();

    let snapshot = handle.wait_until(|s| s.countdown.is_some()).await.unwrap();
    assert_eq!(snapshot.countdown.as_deref(), Some("2:05"));
    assert_eq!(snapshot.queue_position.map(|p| p.position), Some(2));

    clock.advance(Duration::from_secs(1));
    let snapshot = handle
        .wait_until(|s| s.countdown.as_deref() == Some("2:04"))
        .await
        .unwrap();
    assert_eq!(snapshot.phase, Phase::Live);

    // Past the estimate the countdown holds at zero.
    clock.advance(Duration::from_secs(600));
    let snapshot = handle
        .wait_until(|s| s.countdown.as_deref() == Some("0:00"))
        .await;
    assert!(snapshot.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetch_is_not_duplicated() {
    let mock = Arc::new(MockDirectory::new().with_latency(Duration::from_secs(12)));
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Paid)]);
    mock.expect_queue_position(ID).return_ok(position(1, 100));

    let _handle = OrderTracker::new(ID, mock.clone()).spawn();

    // Ticks at 5s and 10s land while the first fetch is still outstanding.
    sleep(Duration::from_secs(11)).await;
    assert_eq!(mock.client_orders_calls(), 1);
    assert_eq!(mock.queue_position_calls(), 1);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(mock.client_orders_calls(), 1);

    // The 15s tick finds the slot free again.
    sleep(Duration::from_secs(2)).await;
    assert_eq!(mock.client_orders_calls(), 2);
    assert_eq!(mock.queue_position_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_error_keeps_last_known_order() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Preparing)]);
    mock.expect_client_orders()
        .return_err(DirectoryError::Unavailable("backend down".into()));

    let mut handle = OrderTracker::new(ID, mock.clone()).spawn();
    let snapshot = handle
        .wait_until(|s| s.orders_error.is_some())
        .await
        .unwrap();

    assert_eq!(snapshot.phase, Phase::Live);
    assert!(snapshot.is_stale());
    assert_eq!(snapshot.order, Some(order(OrderStatus::Preparing)));
}

#[tokio::test(start_paused = true)]
async fn test_error_without_data_is_failed_and_retries() {
    let mock = Arc::new(MockDirectory::new());

    let mut handle = OrderTracker::new(ID, mock.clone()).spawn();
    let snapshot = handle.wait_until(|s| s.phase == Phase::Failed).await.unwrap();
    assert_eq!(snapshot.order, None);

    sleep(Duration::from_secs(11)).await;
    assert!(mock.client_orders_calls() >= 3);
}

#[tokio::test(start_paused = true)]
async fn test_missing_order_stops_polling() {
    let mock = Arc::new(MockDirectory::new());
    let other = Order::new(OrderId(99), CustomerId::new("alice"), Timestamp::from_secs(1));
    mock.expect_client_orders().return_ok(vec![other]);
    mock.expect_queue_position(ID).return_ok(position(1, 100));

    let mut handle = OrderTracker::new(ID, mock.clone()).spawn();
    let snapshot = handle.wait_until(|s| s.phase == Phase::NotFound).await.unwrap();
    assert_eq!(snapshot.order, None);
    assert_eq!(snapshot.queue_position, None);
    assert_eq!(snapshot.countdown, None);

    sleep(Duration::from_secs(1)).await;
    let orders = mock.client_orders_calls();
    let positions = mock.queue_position_calls();
    sleep(Duration::from_secs(30)).await;
    assert_eq!(mock.client_orders_calls(), orders);
    assert_eq!(mock.queue_position_calls(), positions);
}

#[tokio::test(start_paused = true)]
async fn test_terminal_status_stops_queue_tracking() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Preparing)]);
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Completed)]);
    mock.expect_queue_position(ID).return_ok(position(1, 100));

    let mut handle = OrderTracker::new(ID, mock.clone()).spawn();
    let snapshot = handle
        .wait_until(status_is(OrderStatus::Completed))
        .await
        .unwrap();
    assert_eq!(snapshot.queue_position, None);
    assert_eq!(snapshot.countdown, None);

    sleep(Duration::from_secs(1)).await;
    let positions = mock.queue_position_calls();
    let orders = mock.client_orders_calls();
    sleep(Duration::from_secs(20)).await;
    assert_eq!(mock.queue_position_calls(), positions);
    assert!(mock.client_orders_calls() > orders);
}

#[tokio::test(start_paused = true)]
async fn test_non_positive_id_skips_queue_position() {
    let mock = Arc::new(MockDirectory::new());
    let zero = Order::new(OrderId(0), CustomerId::new("alice"), Timestamp::from_secs(1));
    mock.expect_client_orders().return_ok(vec![zero.clone()]);

    let mut handle = OrderTracker::new(OrderId(0), mock.clone()).spawn();
    let snapshot = handle.wait_until(|s| s.phase == Phase::Live).await.unwrap();
    assert_eq!(snapshot.order, Some(zero));

    sleep(Duration::from_secs(12)).await;
    assert_eq!(mock.queue_position_calls(), 0);
    assert_eq!(handle.snapshot().queue_position, None);
    assert_eq!(handle.snapshot().position_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_detach_stops_all_fetches() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Paid)]);
    mock.expect_queue_position(ID).return_ok(position(1, 100));

    let handle = OrderTracker::new(ID, mock.clone()).spawn();
    sleep(Duration::from_secs(6)).await;
    handle.detach().await;

    let orders = mock.client_orders_calls();
    let positions = mock.queue_position_calls();
    sleep(Duration::from_secs(30)).await;
    assert_eq!(mock.client_orders_calls(), orders);
    assert_eq!(mock.queue_position_calls(), positions);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_cancels_tracking() {
    let mock = Arc::new(MockDirectory::new().with_latency(Duration::from_secs(3)));
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Paid)]);

    let handle = OrderTracker::new(ID, mock.clone()).spawn();
    let observer = handle.subscribe();
    sleep(Duration::from_secs(1)).await;
    drop(handle);

    sleep(Duration::from_secs(1)).await;
    let orders = mock.client_orders_calls();
    sleep(Duration::from_secs(30)).await;
    assert_eq!(mock.client_orders_calls(), orders);
    // The in-flight fetch never landed.
    assert_eq!(observer.borrow().phase, Phase::Loading);
}

#[tokio::test(start_paused = true)]
async fn test_timeline_follows_order() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Preparing)]);

    let mut handle = OrderTracker::new(ID, mock.clone()).spawn();
    let snapshot = handle.wait_until(|s| s.phase == Phase::Live).await.unwrap();
    let active: Vec<_> = snapshot
        .timeline()
        .into_iter()
        .filter(|step| step.state == order_tracker::StepState::Active)
        .map(|step| step.label)
        .collect();
    assert_eq!(active, vec!["Preparing Your Order"]);
}

#[tokio::test]
async fn test_zero_poll_interval_is_rejected() {
    let mock = Arc::new(MockDirectory::new());
    let config = TrackerConfig {
        poll_interval_ms: 0,
        ..TrackerConfig::default()
    };
    let result = OrderTracker::new(ID, mock.clone()).with_config(config);
    assert!(matches!(result, Err(ConfigError::Validation(_))));
    assert_eq!(mock.client_orders_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_not_found_error_ends_tracking() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders()
        .return_err(DirectoryError::OrderNotFound(ID));

    let mut handle = OrderTracker::new(ID, mock.clone()).spawn();
    let snapshot = handle.wait_until(|s| s.phase == Phase::NotFound).await.unwrap();
    assert_eq!(snapshot.order, None);

    sleep(Duration::from_secs(1)).await;
    let orders = mock.client_orders_calls();
    sleep(Duration::from_secs(20)).await;
    assert_eq!(mock.client_orders_calls(), orders);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_queue_position_stops_position_polling() {
    let mock = Arc::new(MockDirectory::new());
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Paid)]);
    mock.expect_queue_position(ID)
        .return_err(DirectoryError::InvalidOrderId(ID));

    let mut handle = OrderTracker::new(ID, mock.clone()).spawn();
    let snapshot = handle
        .wait_until(|s| s.position_error.is_some())
        .await
        .unwrap();
    assert_eq!(snapshot.countdown, None);

    sleep(Duration::from_secs(20)).await;
    assert_eq!(mock.queue_position_calls(), 1);
    // Transient order-list polling carries on.
    assert!(mock.client_orders_calls() > 1);
    assert_eq!(handle.snapshot().phase, Phase::Live);
}

#[tokio::test(start_paused = true)]
async fn test_new_tracker_ignores_fetch_abandoned_by_previous_one() {
    let mock = Arc::new(MockDirectory::new().with_latency(Duration::from_secs(3)));
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Preparing)]);
    mock.expect_client_orders().return_ok(vec![order(OrderStatus::Ready)]);
    mock.expect_queue_position(ID).return_ok(position(1, 100));
    let directory = Arc::new(DedupDirectory::new(mock.clone()));

    let first = OrderTracker::new(ID, directory.clone()).spawn();
    sleep(Duration::from_secs(1)).await;
    drop(first);
    sleep(Duration::from_secs(60)).await;
    assert_eq!(directory.in_flight(), 0);

    let mut second = OrderTracker::new(ID, directory.clone()).spawn();
    let snapshot = second.wait_until(|s| s.phase == Phase::Live).await.unwrap();
    assert_eq!(snapshot.order, Some(order(OrderStatus::Ready)));
    assert_eq!(mock.client_orders_calls(), 2);

    // Ready keeps coming back; it was the first thing this tracker saw.
    sleep(Duration::from_secs(12)).await;
    assert_eq!(second.snapshot().notification, None);
}
