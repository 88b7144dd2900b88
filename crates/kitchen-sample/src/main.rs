//! # Kitchen Demo
//!
//! Places two orders with the in-memory kitchen, tracks the second one, and
//! walks it through the lifecycle from the staff side while the tracker reports
//! what the customer would see.
//!
//! ```bash
//! RUST_LOG=info cargo run -p kitchen-sample
//! RUST_LOG=debug cargo run -p kitchen-sample -- sample.toml
//! ```

use kitchen_sample::config::SampleConfig;
use kitchen_sample::lifecycle::KitchenSystem;
use kitchen_sample::SampleError;
use order_tracker::{
    setup_tracing, status_label, CustomerId, DedupDirectory, OrderDirectory, OrderStatus,
    OrderTracker, SummaryWatcher,
};
use std::sync::Arc;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), SampleError> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => SampleConfig::from_file(path)?,
        None => SampleConfig::default(),
    };
    info!(?config, "Starting kitchen demo");

    let system = KitchenSystem::new(&config.kitchen)?;

    // Someone is already ahead in the queue.
    system
        .kitchen
        .place_order(CustomerId::new("bob"), None)
        .await?;

    let alice = system.kitchen.customer(CustomerId::new("alice"));
    let order_id = alice.create_order(Some("Garden Zone".into())).await?;
    info!(%order_id, customer = %alice.customer(), "Order placed");

    let directory: Arc<dyn OrderDirectory> = Arc::new(DedupDirectory::new(Arc::new(alice)));
    let mut tracker = OrderTracker::new(order_id, directory.clone())
        .with_config(config.tracker.clone())?
        .spawn();
    let summary = SummaryWatcher::new(directory.clone(), &config.tracker)?.spawn();
    info!(order_id = %tracker.order_id(), "Tracking order");

    for status in [
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivering,
        OrderStatus::Completed,
    ] {
        let span = tracing::info_span!("advance", %status);
        async {
            system.kitchen.update_status(order_id, status).await?;

            let snapshot = tracker
                .wait_until(|s| s.order.as_ref().map(|o| o.status) == Some(status))
                .await
                .ok_or(SampleError::TrackerStopped(status))?;

            info!(
                label = status_label(status),
                position = ?snapshot.queue_position.map(|p| p.position),
                countdown = ?snapshot.countdown,
                "Customer view"
            );
            if let Some(notification) = &snapshot.notification {
                info!(message = %notification.message, "Notification");
                tracker.dismiss_notification().await;
            }
            Ok::<_, SampleError>(())
        }
        .instrument(span)
        .await?;
    }

    if let Some(kitchen) = summary.view().summary {
        info!(pending = kitchen.total_orders, "Kitchen queue");
    }

    tracker.detach().await;
    summary.stop().await;
    drop(directory);

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
