pub mod grid;
pub mod limit;
pub mod market;
pub mod oco;
pub mod stop_limit;
pub mod twap;

use futures_bot_strategy::shutdown_channel;
use tokio::sync::watch;
use tracing::info;

/// Creates a supervisor shutdown channel wired to Ctrl-C.
pub fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = shutdown_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping strategy");
            let _ = tx.send(true);
        }
    });
    rx
}
