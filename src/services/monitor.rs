//! Periodic status recompute
//!
//! Maintenance windows open and close with no user action, so the engine is
//! re-run on a fixed period in a background task until the monitor is shut
//! down or dropped.

use std::time::Duration;

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::status::StatusService;

pub struct StatusMonitor {
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl StatusMonitor {
    /// Start recomputing every `period`. The first run happens immediately.
    pub fn spawn(status: StatusService, period: Duration) -> Self {
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!("Status monitor started (every {:?})", period);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        status.recompute().await;
                    }
                }
            }
            tracing::info!("Status monitor stopped");
        });

        Self {
            cancel_token,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Cancel the timer and wait for an in-flight recompute to finish
    pub async fn shutdown(mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Status monitor task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
