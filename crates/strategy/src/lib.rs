//! Execution strategies over the exchange order-entry client.
//!
//! The two supervisors (`grid`, `oco`) share one design: an order
//! reconciliation loop that polls the exchange on a fixed interval, detects
//! fills without push notifications, and reacts by placing replacement
//! orders or cancelling siblings. `twap` is a simpler timed slicer with no
//! resting orders to supervise.

pub mod grid;
pub mod oco;
pub mod tracker;
pub mod twap;

pub use grid::{GridPlan, GridSupervisor};
pub use oco::{OcoConfig, OcoState, OcoSupervisor};
pub use tracker::OrderTracker;
pub use twap::{TwapConfig, TwapExecutor};

use futures_bot_core::ExchangeError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Creates the shutdown channel a supervisor instance listens on.
///
/// Send `true` (or drop the sender) to stop the loop at the next suspension
/// point — awaiting the poll tick or an in-flight exchange call.
#[must_use]
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Applies the configured per-call deadline to one exchange round-trip.
///
/// Expiry surfaces as `ExchangeError::Timeout`, which the supervisors treat
/// like any other transient failure.
pub(crate) async fn with_call_timeout<T>(
    limit: Option<Duration>,
    fut: impl Future<Output = Result<T, ExchangeError>>,
) -> Result<T, ExchangeError> {
    match limit {
        Some(deadline) => tokio::time::timeout(deadline, fut)
            .await
            .map_err(|_| ExchangeError::Timeout)?,
        None => fut.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn expired_call_surfaces_as_transient_timeout() {
        let result: Result<(), ExchangeError> =
            with_call_timeout(Some(Duration::from_secs(2)), async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, ExchangeError::Timeout));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn missing_deadline_passes_the_call_through() {
        let result = with_call_timeout(None, async { Ok::<_, ExchangeError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
