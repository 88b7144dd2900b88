//! # Kitchen Lifecycle
//!
//! [`KitchenSystem`] starts the kitchen actor and hands out clients. Shutdown
//! follows the usual channel-closure pattern: once the system's own client *and*
//! every clone handed out (customer clients, trackers polling them) are gone,
//! the actor's receiver yields `None` and the task finishes.

use crate::clients::KitchenClient;
use crate::config::KitchenConfig;
use crate::error::SampleError;
use crate::kitchen_actor::KitchenActor;
use order_tracker::{Clock, SystemClock};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub struct KitchenSystem {
    /// Staff-side client for the kitchen actor.
    pub kitchen: KitchenClient,
    handle: JoinHandle<()>,
}

impl KitchenSystem {
    pub fn new(config: &KitchenConfig) -> Result<Self, SampleError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Starts the kitchen against a specific clock. Rejects an invalid config
    /// before anything is spawned.
    pub fn with_clock(
        config: &KitchenConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SampleError> {
        config.validate()?;
        let (actor, kitchen) = KitchenActor::new(config, clock);
        let handle = tokio::spawn(actor.run());
        Ok(Self { kitchen, handle })
    }

    /// Drops the system's client and waits for the actor to finish.
    ///
    /// Outstanding clones keep the actor alive; drop them first.
    pub async fn shutdown(self) -> Result<(), SampleError> {
        info!("Shutting down kitchen...");
        drop(self.kitchen);

        if let Err(e) = self.handle.await {
            error!(error = %e, "Kitchen task failed");
            return Err(SampleError::Task(e.to_string()));
        }

        info!("Kitchen shutdown complete.");
        Ok(())
    }
}
