//! Kitchen-wide queue summary, polled on its own timer.
//!
//! Same fetch policy as the per-order tracker: one fetch in flight at a time,
//! last good summary kept through errors, and the task (with any outstanding
//! fetch) torn down when the handle goes away.

use crate::config::{ConfigError, TrackerConfig};
use crate::directory::OrderDirectory;
use crate::error::DirectoryError;
use crate::fetch::{Completion, FetchSlot, Ticket};
use crate::model::QueueSummary;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryView {
    pub summary: Option<QueueSummary>,
    pub error: Option<DirectoryError>,
}

pub struct SummaryWatcher {
    directory: Arc<dyn OrderDirectory>,
    interval: Duration,
    slot: FetchSlot<QueueSummary>,
}

impl SummaryWatcher {
    pub fn new(
        directory: Arc<dyn OrderDirectory>,
        config: &TrackerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            directory,
            interval: config.summary_interval(),
            slot: FetchSlot::new(),
        })
    }

    pub fn spawn(self) -> SummaryHandle {
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let (view_tx, view_rx) = watch::channel(SummaryView::default());
        let task = tokio::spawn(self.run(stop_rx, view_tx));
        SummaryHandle {
            stop: stop_tx,
            views: view_rx,
            task: Some(task),
        }
    }

    async fn run(mut self, mut stop: mpsc::Receiver<()>, views: watch::Sender<SummaryView>) {
        info!("Queue summary polling started");
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut fetches: JoinSet<(Ticket, Result<QueueSummary, DirectoryError>)> = JoinSet::new();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let Some(ticket) = self.slot.try_begin() else {
                        debug!("Queue summary fetch still in flight; skipping tick");
                        continue;
                    };
                    let directory = self.directory.clone();
                    fetches.spawn(async move { (ticket, directory.fetch_queue_summary().await) });
                }
                Some(joined) = fetches.join_next(), if !fetches.is_empty() => {
                    let (ticket, result) = match joined {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!(error = %e, "Queue summary task ended abnormally");
                            self.slot.reset();
                            continue;
                        }
                    };
                    if let Err(e) = &result {
                        warn!(error = %e, "Queue summary fetch failed; keeping last known data");
                    }
                    if self.slot.complete(ticket, result) == Completion::Stale {
                        continue;
                    }
                    let next = SummaryView {
                        summary: self.slot.value().copied(),
                        error: self.slot.error().cloned(),
                    };
                    views.send_if_modified(|current| {
                        if *current == next {
                            false
                        } else {
                            *current = next;
                            true
                        }
                    });
                }
                _ = stop.recv() => break,
            }
        }

        fetches.shutdown().await;
        info!("Queue summary polling stopped");
    }
}

/// Owns the summary task; dropping it stops polling.
pub struct SummaryHandle {
    stop: mpsc::Sender<()>,
    views: watch::Receiver<SummaryView>,
    task: Option<JoinHandle<()>>,
}

impl SummaryHandle {
    pub fn view(&self) -> SummaryView {
        self.views.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SummaryView> {
        self.views.clone()
    }

    /// Waits for the next published change. `None` once polling has stopped.
    pub async fn changed(&mut self) -> Option<SummaryView> {
        self.views.changed().await.ok()?;
        Some(self.views.borrow_and_update().clone())
    }

    pub async fn stop(mut self) {
        let _ = self.stop.send(()).await;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SummaryHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
